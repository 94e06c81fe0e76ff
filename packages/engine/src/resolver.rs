//! Utility resolution and rule generation.
//!
//! `resolve_candidate` turns one raw candidate string into zero or more
//! generated rules. Resolution never fails hard: unknown names, unknown
//! theme keys, and malformed values all produce an empty result, because
//! scanned text is allowed to contain false-positive candidate shapes.
//!
//! Theme-backed values are emitted as `var(--token, <literal>)` so a later
//! theme override changes only the fallback text, leaving every other byte
//! of the rule untouched.

use crate::theme::ThemeStore;
use crate::utilities::{self, FunctionalUtility, ValueType};
use crate::variants::{AppliedVariant, VariantRegistry};
use tracing::debug;
use zephyr_common::Diagnostic;
use zephyr_parser::{parse_candidate, CandidateKind, VariantApplication};

/// One generated CSS rule, owned by the resolver and consumed read-only by
/// the assembler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedRule {
    pub selector: String,

    /// Ordered `(property, value)` pairs
    pub body: Vec<(String, String)>,

    /// Wrapping at-rule preludes, outermost first
    pub conditions: Vec<String>,

    /// The candidate text this rule came from
    pub candidate: String,
}

/// Read-only snapshot threaded through every resolution call; no ambient
/// state, so per-candidate resolution can run in any order.
pub struct ResolveContext<'a> {
    pub theme: &'a ThemeStore,
    pub variants: &'a VariantRegistry,
    /// Config-wide `important: true`
    pub important: bool,
}

/// Outcome of resolving one candidate
#[derive(Debug, Default)]
pub struct Resolution {
    pub rules: Vec<GeneratedRule>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    fn empty() -> Self {
        Self::default()
    }

    fn diagnostic(diagnostic: Diagnostic) -> Self {
        Self {
            rules: Vec::new(),
            diagnostics: vec![diagnostic],
        }
    }
}

/// Resolve one candidate against the theme and variant registry.
pub fn resolve_candidate(raw: &str, ctx: &ResolveContext) -> Resolution {
    let Some(parsed) = parse_candidate(raw, ctx.variants) else {
        // Not a candidate shape at all; silently dropped
        return Resolution::empty();
    };

    let body = match build_body(&parsed.kind, ctx) {
        BodyResult::Body(body) => body,
        BodyResult::Unknown => {
            debug!(candidate = raw, "No utility matched candidate");
            return Resolution::empty();
        }
        BodyResult::TypeMismatch(message) => {
            return Resolution::diagnostic(Diagnostic::info(message).with_candidate(raw));
        }
    };

    let important = parsed.important || ctx.important;
    let body: Vec<(String, String)> = body
        .into_iter()
        .map(|(property, value)| {
            if important {
                (property, format!("{} !important", value))
            } else {
                (property, value)
            }
        })
        .collect();

    let mut rules = vec![GeneratedRule {
        selector: format!(".{}", escape_class(raw)),
        body,
        conditions: Vec::new(),
        candidate: raw.to_string(),
    }];

    // Variant stack applies right-to-left: the variant closest to the base
    // utility wraps innermost.
    for variant in parsed.variants.iter().rev() {
        let applied = match variant {
            VariantApplication::Named { name, parameter } => {
                let Some(definition) = ctx.variants.get(name) else {
                    return Resolution::empty();
                };
                match ctx.variants.apply(definition, parameter.as_deref()) {
                    Some(applied) => applied,
                    None => return Resolution::empty(),
                }
            }
            VariantApplication::Arbitrary { payload } => {
                if payload.starts_with('@') {
                    AppliedVariant::Condition(payload.clone())
                } else if payload.contains('&') {
                    AppliedVariant::Selectors(vec![payload.clone()])
                } else {
                    return Resolution::empty();
                }
            }
        };

        match applied {
            AppliedVariant::Condition(condition) => {
                // Applied later means wrapped further out
                for rule in &mut rules {
                    rule.conditions.insert(0, condition.clone());
                }
            }
            AppliedVariant::Selectors(selectors) => {
                rules = rules
                    .into_iter()
                    .flat_map(|rule| {
                        selectors
                            .iter()
                            .map(|template| GeneratedRule {
                                selector: template.replace('&', &rule.selector),
                                ..rule.clone()
                            })
                            .collect::<Vec<_>>()
                    })
                    .collect();
            }
        }
    }

    Resolution {
        rules,
        diagnostics: Vec::new(),
    }
}

enum BodyResult {
    Body(Vec<(String, String)>),
    Unknown,
    TypeMismatch(String),
}

fn build_body(kind: &CandidateKind, ctx: &ResolveContext) -> BodyResult {
    match kind {
        CandidateKind::ArbitraryProperty { property, value } => {
            BodyResult::Body(vec![(property.clone(), value.clone())])
        }

        CandidateKind::Utility {
            name,
            arbitrary: Some(value),
            negative,
        } => {
            let Some(utility) = utilities::lookup_functional(name) else {
                return BodyResult::Unknown;
            };
            if !matches_value_type(value, utility.value_type) {
                return BodyResult::TypeMismatch(format!(
                    "arbitrary value '{}' is not a valid {} for '{}'",
                    value,
                    value_type_name(utility.value_type),
                    name
                ));
            }
            if *negative && !utility.negatable {
                return BodyResult::Unknown;
            }
            let value = if *negative {
                format!("calc({} * -1)", value)
            } else {
                value.clone()
            };
            BodyResult::Body(spread(utility.properties, value))
        }

        CandidateKind::Utility {
            name,
            arbitrary: None,
            negative,
        } => {
            if !negative {
                if let Some(declarations) = utilities::lookup_static(name) {
                    return BodyResult::Body(
                        declarations
                            .iter()
                            .map(|(p, v)| ((*p).to_string(), (*v).to_string()))
                            .collect(),
                    );
                }
            }

            // Longest functional prefix followed by a keyword value
            let mut split = None;
            for (idx, _) in name.match_indices('-') {
                if let Some(utility) = utilities::lookup_functional(&name[..idx]) {
                    split = Some((utility, &name[idx + 1..]));
                }
            }
            let Some((utility, keyword)) = split else {
                return BodyResult::Unknown;
            };
            if *negative && !utility.negatable {
                return BodyResult::Unknown;
            }

            match keyword_value(utility, keyword, *negative, ctx.theme) {
                Some(value) => BodyResult::Body(spread(utility.properties, value)),
                None => BodyResult::Unknown,
            }
        }
    }
}

/// Resolve a keyword value for a functional utility. Sign inversion is
/// applied before the theme lookup: the positive token key is looked up,
/// and the emitted reference is negated.
fn keyword_value(
    utility: &FunctionalUtility,
    keyword: &str,
    negative: bool,
    theme: &ThemeStore,
) -> Option<String> {
    if utility.namespace == "spacing" {
        if let Some(value) = spacing_keyword(keyword, negative, theme) {
            return Some(value);
        }
    }

    let token = format!("--{}-{}", utility.namespace, keyword);
    let literal = theme.get(&token)?;
    let reference = format!("var({}, {})", token, literal);
    Some(if negative {
        format!("calc({} * -1)", reference)
    } else {
        reference
    })
}

fn spacing_keyword(keyword: &str, negative: bool, theme: &ThemeStore) -> Option<String> {
    match keyword {
        "auto" if !negative => return Some("auto".to_string()),
        "full" if !negative => return Some("100%".to_string()),
        "px" => {
            return Some(if negative { "-1px" } else { "1px" }.to_string());
        }
        _ => {}
    }

    // Fractions: `w-1/2` -> a percentage
    if let Some((numerator, denominator)) = keyword.split_once('/') {
        let n: u32 = numerator.parse().ok()?;
        let d: u32 = denominator.parse().ok()?;
        if d == 0 {
            return None;
        }
        let sign = if negative { "-1 * " } else { "" };
        return Some(format!("calc({}{} / {} * 100%)", sign, n, d));
    }

    // Bare numbers scale the `--spacing` token
    if keyword.parse::<f64>().is_ok() {
        let base = theme.get("--spacing")?;
        let sign = if negative { "-" } else { "" };
        return Some(format!("calc(var(--spacing, {}) * {}{})", base, sign, keyword));
    }

    None
}

fn spread(properties: &[&str], value: String) -> Vec<(String, String)> {
    properties
        .iter()
        .map(|p| ((*p).to_string(), value.clone()))
        .collect()
}

fn matches_value_type(value: &str, value_type: ValueType) -> bool {
    match value_type {
        ValueType::Any => true,
        ValueType::Color => looks_like_color(value),
        ValueType::Length => looks_like_length(value),
    }
}

fn value_type_name(value_type: ValueType) -> &'static str {
    match value_type {
        ValueType::Color => "color",
        ValueType::Length => "length",
        ValueType::Any => "value",
    }
}

fn looks_like_color(value: &str) -> bool {
    const FUNCTIONS: &[&str] = &[
        "rgb(", "rgba(", "hsl(", "hsla(", "oklch(", "oklab(", "lab(", "lch(", "color(",
        "color-mix(", "var(",
    ];
    value.starts_with('#')
        || FUNCTIONS.iter().any(|f| value.starts_with(f))
        || value == "transparent"
        || value == "currentColor"
        || value == "inherit"
        // Named colors: a bare identifier
        || value.chars().all(|c| c.is_ascii_alphabetic())
}

fn looks_like_length(value: &str) -> bool {
    const FUNCTIONS: &[&str] = &["calc(", "var(", "min(", "max(", "clamp("];
    let numeric_start = value
        .trim_start_matches('-')
        .chars()
        .next()
        .map(|c| c.is_ascii_digit() || c == '.')
        .unwrap_or(false);
    numeric_start || FUNCTIONS.iter().any(|f| value.starts_with(f)) || value == "auto"
}

/// Escape a raw candidate for use as a CSS class selector
fn escape_class(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (i, ch) in raw.chars().enumerate() {
        if i == 0 && ch.is_ascii_digit() {
            // Leading digits need a code-point escape
            out.push_str(&format!("\\3{} ", ch));
        } else if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::PluginRegistrar;

    fn context<'a>(theme: &'a ThemeStore, variants: &'a VariantRegistry) -> ResolveContext<'a> {
        ResolveContext {
            theme,
            variants,
            important: false,
        }
    }

    fn resolve(raw: &str, theme: &ThemeStore, variants: &VariantRegistry) -> Vec<GeneratedRule> {
        resolve_candidate(raw, &context(theme, variants)).rules
    }

    #[test]
    fn test_static_utility() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("underline", &theme, &variants);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, ".underline");
        assert_eq!(
            rules[0].body,
            vec![(
                "text-decoration-line".to_string(),
                "underline".to_string()
            )]
        );
        assert!(rules[0].conditions.is_empty());
    }

    #[test]
    fn test_theme_backed_color_emits_var_with_fallback() {
        let mut theme = ThemeStore::with_defaults();
        theme.insert("--color-primary", "black");
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("bg-primary", &theme, &variants);
        assert_eq!(
            rules[0].body,
            vec![(
                "background-color".to_string(),
                "var(--color-primary, black)".to_string()
            )]
        );

        // Redefining the token changes only the fallback
        theme.insert("--color-primary", "red");
        let rules = resolve("bg-primary", &theme, &variants);
        assert_eq!(
            rules[0].body[0].1,
            "var(--color-primary, red)".to_string()
        );
    }

    #[test]
    fn test_spacing_scale() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("p-4", &theme, &variants);
        assert_eq!(
            rules[0].body,
            vec![(
                "padding".to_string(),
                "calc(var(--spacing, 0.25rem) * 4)".to_string()
            )]
        );

        let rules = resolve("px-2", &theme, &variants);
        assert_eq!(rules[0].body.len(), 2);
        assert_eq!(rules[0].body[0].0, "padding-left");
        assert_eq!(rules[0].body[1].0, "padding-right");
    }

    #[test]
    fn test_negative_margin() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("-m-4", &theme, &variants);
        assert_eq!(
            rules[0].body,
            vec![(
                "margin".to_string(),
                "calc(var(--spacing, 0.25rem) * -4)".to_string()
            )]
        );
        assert_eq!(rules[0].selector, ".-m-4");

        // Padding is not negatable
        assert!(resolve("-p-4", &theme, &variants).is_empty());
    }

    #[test]
    fn test_fraction_value() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("w-1/2", &theme, &variants);
        assert_eq!(
            rules[0].body,
            vec![("width".to_string(), "calc(1 / 2 * 100%)".to_string())]
        );
    }

    #[test]
    fn test_arbitrary_value_passthrough() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("content-['x/y.js']", &theme, &variants);
        assert_eq!(
            rules[0].body,
            vec![("content".to_string(), "'x/y.js'".to_string())]
        );

        let rules = resolve("bg-[#0f0]", &theme, &variants);
        assert_eq!(
            rules[0].body,
            vec![("background-color".to_string(), "#0f0".to_string())]
        );
    }

    #[test]
    fn test_arbitrary_value_type_mismatch() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let resolution = resolve_candidate("bg-[2px]", &context(&theme, &variants));
        assert!(resolution.rules.is_empty());
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(
            resolution.diagnostics[0].candidate.as_deref(),
            Some("bg-[2px]")
        );
    }

    #[test]
    fn test_arbitrary_property() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("[tab-size:4]", &theme, &variants);
        assert_eq!(
            rules[0].body,
            vec![("tab-size".to_string(), "4".to_string())]
        );
        assert_eq!(rules[0].selector, ".\\[tab-size\\:4\\]");
    }

    #[test]
    fn test_unknown_utility_is_silent() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let resolution = resolve_candidate(
            "not-a-real-utility-123",
            &context(&theme, &variants),
        );
        assert!(resolution.rules.is_empty());
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_important_flag_on_every_declaration() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("text-sm!", &theme, &variants);
        assert!(rules[0].body.iter().all(|(_, v)| v.ends_with("!important")));

        let rules = resolve("!text-sm", &theme, &variants);
        assert!(rules[0].body.iter().all(|(_, v)| v.ends_with("!important")));
    }

    #[test]
    fn test_media_variant_wraps() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("md:flex", &theme, &variants);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, ".md\\:flex");
        assert_eq!(rules[0].conditions, vec!["@media (min-width: 768px)"]);
    }

    #[test]
    fn test_selector_variant_wraps() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("hover:underline", &theme, &variants);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].selector, ".hover\\:underline:hover");
    }

    #[test]
    fn test_selector_list_variant_fans_out() {
        let theme = ThemeStore::with_defaults();
        let mut variants = VariantRegistry::with_builtins();
        let mut registrar = PluginRegistrar::new();
        registrar.add_selector_variant(
            "hocus",
            vec!["&:focus".to_string(), "&:hover".to_string()],
        );
        variants.apply_plugin(registrar);

        let rules = resolve("hocus:underline", &theme, &variants);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, ".hocus\\:underline:focus");
        assert_eq!(rules[1].selector, ".hocus\\:underline:hover");
        // Both copies share the same body
        assert_eq!(rules[0].body, rules[1].body);
    }

    #[test]
    fn test_stacked_variants_nest_outermost_first() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("dark:md:hover:flex", &theme, &variants);
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].conditions,
            vec![
                "@media (prefers-color-scheme: dark)",
                "@media (min-width: 768px)"
            ]
        );
        assert!(rules[0].selector.ends_with(":hover"));
    }

    #[test]
    fn test_arbitrary_variant_selector_and_condition() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("[.changed_&]:flex", &theme, &variants);
        assert_eq!(rules.len(), 1);
        assert!(rules[0].selector.starts_with(".changed ."));

        let rules = resolve("[@media_print]:flex", &theme, &variants);
        assert_eq!(rules[0].conditions, vec!["@media print"]);
    }

    #[test]
    fn test_leading_digit_class_escape() {
        let theme = ThemeStore::with_defaults();
        let variants = VariantRegistry::with_builtins();

        let rules = resolve("2xl:font-bold", &theme, &variants);
        assert!(rules[0].selector.starts_with(".\\32 xl"));
    }
}
