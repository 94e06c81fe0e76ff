//! Variant registry.
//!
//! A variant is a named transformation that wraps a generated rule in a
//! selector or an at-rule condition. Built-ins register first; plugin
//! registrations load after, so a name collision favors the plugin
//! definition. The registry lives for one compilation unit and is rebuilt
//! whenever a plugin source file changes.

use std::collections::HashMap;
use zephyr_parser::{PluginPayload, PluginRegistration, VariantLookup};

/// How a variant transforms the rules it wraps
#[derive(Debug, Clone, PartialEq)]
pub enum VariantKind {
    /// Selector templates containing `&`. More than one selector gives OR
    /// semantics: each produces its own copy of the wrapped rule.
    Selectors(Vec<String>),

    /// A fixed at-rule prelude, e.g. `@media (prefers-color-scheme: dark)`
    Media(String),

    /// A parameterized condition filled in from `name-[parameter]`
    Template(ConditionTemplate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionTemplate {
    MinWidth,
    MaxWidth,
    Supports,
    Container,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantDefinition {
    pub name: String,
    pub kind: VariantKind,
}

impl VariantDefinition {
    pub fn selectors(name: impl Into<String>, selectors: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariantKind::Selectors(selectors),
        }
    }

    pub fn media(name: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariantKind::Media(condition.into()),
        }
    }

    fn template(name: impl Into<String>, template: ConditionTemplate) -> Self {
        Self {
            name: name.into(),
            kind: VariantKind::Template(template),
        }
    }
}

/// The resolved effect of applying one variant
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedVariant {
    /// Fan the rule out over these selector templates (`&` = inner selector)
    Selectors(Vec<String>),

    /// Wrap the rule in this at-rule condition
    Condition(String),
}

#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    definitions: HashMap<String, VariantDefinition>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in variants
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        for (name, selector) in PSEUDO_VARIANTS {
            registry.register(VariantDefinition::selectors(
                *name,
                vec![(*selector).to_string()],
            ));
        }

        registry.register(VariantDefinition::selectors(
            "group-hover",
            vec![".group:hover &".to_string()],
        ));

        registry.register(VariantDefinition::media(
            "dark",
            "@media (prefers-color-scheme: dark)",
        ));
        registry.register(VariantDefinition::media(
            "motion-reduce",
            "@media (prefers-reduced-motion: reduce)",
        ));

        for (name, width) in BREAKPOINTS {
            registry.register(VariantDefinition::media(
                *name,
                format!("@media (min-width: {})", width),
            ));
        }

        registry.register(VariantDefinition::template("min", ConditionTemplate::MinWidth));
        registry.register(VariantDefinition::template("max", ConditionTemplate::MaxWidth));
        registry.register(VariantDefinition::template(
            "supports",
            ConditionTemplate::Supports,
        ));
        registry.register(VariantDefinition::template(
            "container",
            ConditionTemplate::Container,
        ));

        registry
    }

    /// Register a definition; a later registration for the same name
    /// replaces the earlier one.
    pub fn register(&mut self, definition: VariantDefinition) {
        self.definitions
            .insert(definition.name.clone(), definition);
    }

    /// Merge a plugin's collected registrations, in declaration order
    pub fn apply_plugin(&mut self, registrar: PluginRegistrar) {
        for definition in registrar.into_definitions() {
            self.register(definition);
        }
    }

    pub fn get(&self, name: &str) -> Option<&VariantDefinition> {
        self.definitions.get(name)
    }

    /// Resolve the effect of one application. `None` means the parameter
    /// shape does not fit the definition.
    pub fn apply(
        &self,
        definition: &VariantDefinition,
        parameter: Option<&str>,
    ) -> Option<AppliedVariant> {
        match (&definition.kind, parameter) {
            (VariantKind::Selectors(selectors), None) => {
                Some(AppliedVariant::Selectors(selectors.clone()))
            }
            (VariantKind::Media(condition), None) => {
                Some(AppliedVariant::Condition(condition.clone()))
            }
            (VariantKind::Template(template), Some(param)) => {
                let condition = match template {
                    ConditionTemplate::MinWidth => format!("@media (min-width: {})", param),
                    ConditionTemplate::MaxWidth => format!("@media (max-width: {})", param),
                    ConditionTemplate::Supports => {
                        if param.starts_with('(') {
                            format!("@supports {}", param)
                        } else {
                            format!("@supports ({})", param)
                        }
                    }
                    ConditionTemplate::Container => format!("@container (min-width: {})", param),
                };
                Some(AppliedVariant::Condition(condition))
            }
            _ => None,
        }
    }
}

impl VariantLookup for VariantRegistry {
    fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    fn takes_parameter(&self, name: &str) -> bool {
        matches!(
            self.definitions.get(name),
            Some(VariantDefinition {
                kind: VariantKind::Template(_),
                ..
            })
        )
    }
}

/// Capability object handed to plugin registrations. Methods append
/// immutable definitions to a list that is merged into the registry after
/// all plugin files load; plugins never mutate a live registry.
#[derive(Debug, Default)]
pub struct PluginRegistrar {
    definitions: Vec<VariantDefinition>,
}

impl PluginRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_selector_variant(&mut self, name: impl Into<String>, selectors: Vec<String>) {
        self.definitions
            .push(VariantDefinition::selectors(name, selectors));
    }

    pub fn add_media_variant(&mut self, name: impl Into<String>, condition: impl Into<String>) {
        self.definitions.push(VariantDefinition::media(name, condition));
    }

    /// Collect a parsed plugin file's registrations
    pub fn add_registrations(&mut self, registrations: Vec<PluginRegistration>) {
        for registration in registrations {
            match registration.payload {
                PluginPayload::Selectors(selectors) => {
                    self.add_selector_variant(registration.name, selectors)
                }
                PluginPayload::Condition(condition) => {
                    self.add_media_variant(registration.name, condition)
                }
            }
        }
    }

    pub fn into_definitions(self) -> Vec<VariantDefinition> {
        self.definitions
    }
}

const PSEUDO_VARIANTS: &[(&str, &str)] = &[
    ("hover", "&:hover"),
    ("focus", "&:focus"),
    ("focus-visible", "&:focus-visible"),
    ("focus-within", "&:focus-within"),
    ("active", "&:active"),
    ("visited", "&:visited"),
    ("disabled", "&:disabled"),
    ("checked", "&:checked"),
    ("required", "&:required"),
    ("first", "&:first-child"),
    ("last", "&:last-child"),
    ("odd", "&:nth-child(odd)"),
    ("even", "&:nth-child(even)"),
];

const BREAKPOINTS: &[(&str, &str)] = &[
    ("sm", "640px"),
    ("md", "768px"),
    ("lg", "1024px"),
    ("xl", "1280px"),
    ("2xl", "1536px"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = VariantRegistry::with_builtins();
        assert!(registry.contains("hover"));
        assert!(registry.contains("2xl"));
        assert!(registry.contains("dark"));
        assert!(!registry.contains("hocus"));
        assert!(registry.takes_parameter("min"));
        assert!(!registry.takes_parameter("hover"));
    }

    #[test]
    fn test_plugin_registration_wins_collision() {
        let mut registry = VariantRegistry::with_builtins();

        let mut registrar = PluginRegistrar::new();
        registrar.add_selector_variant("hover", vec!["&:hover, &:focus".to_string()]);
        registry.apply_plugin(registrar);

        let def = registry.get("hover").unwrap();
        assert_eq!(
            def.kind,
            VariantKind::Selectors(vec!["&:hover, &:focus".to_string()])
        );
    }

    #[test]
    fn test_apply_parameterized() {
        let registry = VariantRegistry::with_builtins();
        let def = registry.get("min").unwrap();

        assert_eq!(
            registry.apply(def, Some("600px")),
            Some(AppliedVariant::Condition(
                "@media (min-width: 600px)".to_string()
            ))
        );
        // Template variants require a parameter
        assert_eq!(registry.apply(def, None), None);

        let hover = registry.get("hover").unwrap();
        assert_eq!(registry.apply(hover, Some("x")), None);
    }

    #[test]
    fn test_registrar_collects_parsed_plugin() {
        let registrations = zephyr_parser::parse_plugin(
            "@variant hocus (&:hover, &:focus);\n@variant print (@media print);",
        )
        .unwrap();

        let mut registrar = PluginRegistrar::new();
        registrar.add_registrations(registrations);
        let definitions = registrar.into_definitions();

        assert_eq!(definitions.len(), 2);
        assert_eq!(
            definitions[0].kind,
            VariantKind::Selectors(vec!["&:hover".to_string(), "&:focus".to_string()])
        );
        assert_eq!(
            definitions[1].kind,
            VariantKind::Media("@media print".to_string())
        );
    }
}
