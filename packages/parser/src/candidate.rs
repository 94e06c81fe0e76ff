//! Candidate grammar.
//!
//! A candidate is a raw utility-class-shaped string pulled out of scanned
//! source text, e.g. `hover:underline`, `md:-m-4`, `[.changed_&]:content-['x']`.
//!
//! Grammar (informal):
//!
//! ```text
//! candidate  := (variant ':')* base
//! base       := '!'? utility '!'?
//! utility    := '-'? name ('-[' arbitrary ']')?
//!             | '[' property ':' value ']'
//! variant    := registered-name
//!             | registered-name '-[' parameter ']'
//!             | '[' selector-or-condition ']'
//! ```
//!
//! Variant prefixes are split on top-level `:` (colons inside brackets are
//! literal) and matched greedily against the registered variant names.
//! Inside bracket content `_` decodes to a space and `\_` to a literal
//! underscore; outside brackets underscores are never touched.
//!
//! Parsing never fails hard: a string that does not fit the grammar returns
//! `None` and is dropped from rule generation. Unknown *base utility* names
//! are not a parse failure; they resolve to nothing later.

/// Lookup surface the parser needs from the variant registry.
///
/// Kept as a trait so the parser does not depend on the engine crate.
pub trait VariantLookup {
    /// Is this exact name registered?
    fn contains(&self, name: &str) -> bool;

    /// Does this variant accept a `name-[parameter]` form?
    fn takes_parameter(&self, name: &str) -> bool;
}

/// One variant prefix application, in source order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariantApplication {
    /// A registered variant, optionally parameterized (`min-[600px]`)
    Named {
        name: String,
        parameter: Option<String>,
    },

    /// A bracket-literal variant (`[.changed_&]`); payload is decoded.
    /// Payloads starting with `@` are media/container/supports conditions,
    /// everything else is a selector template containing `&`.
    Arbitrary { payload: String },
}

/// The base form of a candidate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// A named utility, possibly with an arbitrary value (`bg-[#fff]`)
    Utility {
        /// Utility name text, minus any arbitrary value (`bg`, `font-bold`).
        /// Splitting a keyword suffix off the name (`p-4` -> `p` + `4`) is a
        /// resolution-time concern since it needs the utility table.
        name: String,
        /// Decoded arbitrary value, if present
        arbitrary: Option<String>,
        /// Leading `-` for sign-inverted utilities (`-m-4`)
        negative: bool,
    },

    /// The `[property:value]` arbitrary property form
    ArbitraryProperty { property: String, value: String },
}

/// Structured form of one candidate string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedCandidate {
    pub kind: CandidateKind,
    /// Variant stack in left-to-right source order; the first entry becomes
    /// the outermost wrapper when the rule is generated.
    pub variants: Vec<VariantApplication>,
    pub important: bool,
    pub raw: String,
}

/// Parse one candidate string. Returns `None` for anything that does not
/// fit the grammar (never an error).
pub fn parse_candidate(text: &str, variants: &dyn VariantLookup) -> Option<ParsedCandidate> {
    if text.is_empty() {
        return None;
    }

    let segments = split_top_level(text, ':')?;
    let (base_segment, variant_segments) = segments.split_last()?;

    let mut stack = Vec::with_capacity(variant_segments.len());
    for segment in variant_segments {
        stack.push(parse_variant(segment, variants)?);
    }

    let (kind, important) = parse_base(base_segment)?;

    Some(ParsedCandidate {
        kind,
        variants: stack,
        important,
        raw: text.to_string(),
    })
}

/// Split on a separator at bracket depth zero. Returns `None` for
/// unbalanced brackets or empty segments.
fn split_top_level(text: &str, separator: char) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (idx, ch) in text.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1)?,
            c if c == separator && depth == 0 => {
                segments.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }

    segments.push(&text[start..]);

    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    Some(segments)
}

fn parse_variant(segment: &str, variants: &dyn VariantLookup) -> Option<VariantApplication> {
    // Bracket-literal form: `[.changed_&]` / `[@media print]`
    if let Some(interior) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        if interior.is_empty() || interior.contains('[') {
            return None;
        }
        return Some(VariantApplication::Arbitrary {
            payload: decode_bracket(interior),
        });
    }

    // Exact registered name wins over any parameterized decomposition,
    // so `group-hover` never parses as `group` + garbage.
    if variants.contains(segment) {
        return Some(VariantApplication::Named {
            name: segment.to_string(),
            parameter: None,
        });
    }

    // Parameterized form: `min-[600px]`
    if segment.ends_with(']') {
        let idx = segment.find("-[")?;
        let name = &segment[..idx];
        let param = &segment[idx + 2..segment.len() - 1];
        if param.is_empty() || !variants.contains(name) || !variants.takes_parameter(name) {
            return None;
        }
        return Some(VariantApplication::Named {
            name: name.to_string(),
            parameter: Some(decode_bracket(param)),
        });
    }

    None
}

fn parse_base(segment: &str) -> Option<(CandidateKind, bool)> {
    // `!` may sit immediately before the base or at the very end;
    // both positions are equivalent.
    let (rest, important) = if let Some(stripped) = segment.strip_prefix('!') {
        (stripped, true)
    } else if let Some(stripped) = segment.strip_suffix('!') {
        (stripped, true)
    } else {
        (segment, false)
    };

    if rest.is_empty() {
        return None;
    }

    // Arbitrary property form: `[color:red]`
    if rest.starts_with('[') {
        let interior = rest.strip_prefix('[')?.strip_suffix(']')?;
        let (property, value) = interior.split_once(':')?;
        let property = property.trim();
        if property.is_empty() || !is_property_name(property) {
            return None;
        }
        let value = decode_bracket(value.trim());
        if value.is_empty() {
            return None;
        }
        return Some((
            CandidateKind::ArbitraryProperty {
                property: property.to_string(),
                value,
            },
            important,
        ));
    }

    let (rest, negative) = match rest.strip_prefix('-') {
        Some(stripped) => (stripped, true),
        None => (rest, false),
    };

    // Arbitrary value form: `bg-[#0f0]`
    if rest.ends_with(']') {
        let idx = rest.find("-[")?;
        let name = &rest[..idx];
        let value = &rest[idx + 2..rest.len() - 1];
        if !is_utility_name(name) || value.is_empty() {
            return None;
        }
        return Some((
            CandidateKind::Utility {
                name: name.to_string(),
                arbitrary: Some(decode_bracket(value)),
                negative,
            },
            important,
        ));
    }

    if !is_utility_name(rest) {
        return None;
    }

    Some((
        CandidateKind::Utility {
            name: rest.to_string(),
            arbitrary: None,
            negative,
        },
        important,
    ))
}

/// Decode bracket content: `_` becomes a space, `\_` a literal underscore.
/// Everything else is taken verbatim.
fn decode_bracket(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'_') => {
                chars.next();
                out.push('_');
            }
            '_' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// Utility names: segments of letters/digits joined by `-`, plus `/` and
/// `.` for fraction and decimal value suffixes (`w-1/2`, `p-2.5`).
fn is_utility_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('-') || name.ends_with('-') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '/' | '%'))
        && name.chars().any(|c| c.is_ascii_alphanumeric())
}

fn is_property_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
        && name.chars().any(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FakeVariants {
        names: HashSet<&'static str>,
        parameterized: HashSet<&'static str>,
    }

    impl FakeVariants {
        fn new() -> Self {
            let names = ["hover", "focus", "dark", "sm", "md", "2xl", "group-hover", "min", "max"]
                .into_iter()
                .collect();
            let parameterized = ["min", "max"].into_iter().collect();
            Self {
                names,
                parameterized,
            }
        }
    }

    impl VariantLookup for FakeVariants {
        fn contains(&self, name: &str) -> bool {
            self.names.contains(name)
        }

        fn takes_parameter(&self, name: &str) -> bool {
            self.parameterized.contains(name)
        }
    }

    fn parse(text: &str) -> Option<ParsedCandidate> {
        parse_candidate(text, &FakeVariants::new())
    }

    #[test]
    fn test_parse_plain_utility() {
        let parsed = parse("underline").unwrap();
        assert_eq!(
            parsed.kind,
            CandidateKind::Utility {
                name: "underline".to_string(),
                arbitrary: None,
                negative: false,
            }
        );
        assert!(parsed.variants.is_empty());
        assert!(!parsed.important);
    }

    #[test]
    fn test_parse_variant_stack_order() {
        let parsed = parse("dark:hover:underline").unwrap();
        assert_eq!(parsed.variants.len(), 2);
        assert_eq!(
            parsed.variants[0],
            VariantApplication::Named {
                name: "dark".to_string(),
                parameter: None
            }
        );
        assert_eq!(
            parsed.variants[1],
            VariantApplication::Named {
                name: "hover".to_string(),
                parameter: None
            }
        );
    }

    #[test]
    fn test_parse_numeric_leading_variant() {
        let parsed = parse("2xl:font-bold").unwrap();
        assert_eq!(parsed.variants.len(), 1);
        assert_eq!(
            parsed.variants[0],
            VariantApplication::Named {
                name: "2xl".to_string(),
                parameter: None
            }
        );
    }

    #[test]
    fn test_longest_variant_name_wins() {
        // `group-hover` must not decompose into `group` + junk
        let parsed = parse("group-hover:flex").unwrap();
        assert_eq!(
            parsed.variants[0],
            VariantApplication::Named {
                name: "group-hover".to_string(),
                parameter: None
            }
        );
    }

    #[test]
    fn test_parameterized_variant() {
        let parsed = parse("min-[600px]:flex").unwrap();
        assert_eq!(
            parsed.variants[0],
            VariantApplication::Named {
                name: "min".to_string(),
                parameter: Some("600px".to_string())
            }
        );
    }

    #[test]
    fn test_arbitrary_variant_decodes_underscores() {
        let parsed = parse("[.changed_&]:content-['x']").unwrap();
        assert_eq!(
            parsed.variants[0],
            VariantApplication::Arbitrary {
                payload: ".changed &".to_string()
            }
        );
        assert_eq!(
            parsed.kind,
            CandidateKind::Utility {
                name: "content".to_string(),
                arbitrary: Some("'x'".to_string()),
                negative: false,
            }
        );
    }

    #[test]
    fn test_arbitrary_value_keeps_colons_and_slashes() {
        let parsed = parse("content-['x/y.js']").unwrap();
        assert_eq!(
            parsed.kind,
            CandidateKind::Utility {
                name: "content".to_string(),
                arbitrary: Some("'x/y.js'".to_string()),
                negative: false,
            }
        );

        let parsed = parse("bg-[url(https://example.com/a_b.png)]").unwrap();
        match parsed.kind {
            CandidateKind::Utility { arbitrary, .. } => {
                // `_` decodes to a space inside brackets
                assert_eq!(arbitrary.unwrap(), "url(https://example.com/a b.png)");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_escaped_underscore_stays_literal() {
        let parsed = parse(r"content-['a\_b']").unwrap();
        match parsed.kind {
            CandidateKind::Utility { arbitrary, .. } => {
                assert_eq!(arbitrary.unwrap(), "'a_b'");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_important_positions_equivalent() {
        let leading = parse("!underline").unwrap();
        let trailing = parse("underline!").unwrap();
        assert!(leading.important);
        assert!(trailing.important);
        assert_eq!(leading.kind, trailing.kind);

        let with_variant = parse("hover:underline!").unwrap();
        assert!(with_variant.important);
        assert_eq!(with_variant.variants.len(), 1);
    }

    #[test]
    fn test_negative_utility() {
        let parsed = parse("-m-4").unwrap();
        assert_eq!(
            parsed.kind,
            CandidateKind::Utility {
                name: "m-4".to_string(),
                arbitrary: None,
                negative: true,
            }
        );
    }

    #[test]
    fn test_arbitrary_property() {
        let parsed = parse("[tab-size:4]").unwrap();
        assert_eq!(
            parsed.kind,
            CandidateKind::ArbitraryProperty {
                property: "tab-size".to_string(),
                value: "4".to_string(),
            }
        );

        let parsed = parse("hover:[color:red]!").unwrap();
        assert!(parsed.important);
        assert_eq!(parsed.variants.len(), 1);
    }

    #[test]
    fn test_unknown_variant_is_invalid() {
        assert!(parse("hocus:underline").is_none());
        assert!(parse("min-[600px:flex").is_none());
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert!(parse("").is_none());
        assert!(parse(":underline").is_none());
        assert!(parse("hover:").is_none());
        assert!(parse("http://example.com").is_none());
        assert!(parse("bg-[").is_none());
        assert!(parse("-").is_none());
        assert!(parse("--foo").is_none());
        assert!(parse("[]").is_none());
        assert!(parse("[color]").is_none());
    }

    #[test]
    fn test_unknown_base_name_still_parses() {
        // Registry membership of the base utility is resolved later
        let parsed = parse("not-a-real-utility-123").unwrap();
        assert_eq!(
            parsed.kind,
            CandidateKind::Utility {
                name: "not-a-real-utility-123".to_string(),
                arbitrary: None,
                negative: false,
            }
        );
    }
}
