//! Built-in utility table.
//!
//! Static utilities map one name to a fixed declaration list; functional
//! utilities take a value (keyword resolved through the theme, or an
//! arbitrary bracket literal) and write it into their property list. The
//! table is registry data: representative rather than exhaustive.

/// Expected shape of an arbitrary value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Color,
    Length,
    Any,
}

#[derive(Debug, Clone, Copy)]
pub struct FunctionalUtility {
    pub name: &'static str,
    pub properties: &'static [&'static str],
    /// Theme key namespace: keyword `x` resolves against `--{namespace}-x`
    pub namespace: &'static str,
    pub value_type: ValueType,
    pub negatable: bool,
}

pub fn lookup_static(name: &str) -> Option<&'static [(&'static str, &'static str)]> {
    STATIC_UTILITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, decls)| *decls)
}

pub fn lookup_functional(name: &str) -> Option<&'static FunctionalUtility> {
    FUNCTIONAL_UTILITIES.iter().find(|u| u.name == name)
}

macro_rules! functional {
    ($name:literal, [$($prop:literal),+], $ns:literal, $vt:expr, $neg:expr) => {
        FunctionalUtility {
            name: $name,
            properties: &[$($prop),+],
            namespace: $ns,
            value_type: $vt,
            negatable: $neg,
        }
    };
}

const FUNCTIONAL_UTILITIES: &[FunctionalUtility] = &[
    // Colors
    functional!("bg", ["background-color"], "color", ValueType::Color, false),
    functional!("text", ["color"], "color", ValueType::Color, false),
    functional!("border", ["border-color"], "color", ValueType::Color, false),
    // Spacing
    functional!("p", ["padding"], "spacing", ValueType::Length, false),
    functional!("px", ["padding-left", "padding-right"], "spacing", ValueType::Length, false),
    functional!("py", ["padding-top", "padding-bottom"], "spacing", ValueType::Length, false),
    functional!("pt", ["padding-top"], "spacing", ValueType::Length, false),
    functional!("pr", ["padding-right"], "spacing", ValueType::Length, false),
    functional!("pb", ["padding-bottom"], "spacing", ValueType::Length, false),
    functional!("pl", ["padding-left"], "spacing", ValueType::Length, false),
    functional!("m", ["margin"], "spacing", ValueType::Length, true),
    functional!("mx", ["margin-left", "margin-right"], "spacing", ValueType::Length, true),
    functional!("my", ["margin-top", "margin-bottom"], "spacing", ValueType::Length, true),
    functional!("mt", ["margin-top"], "spacing", ValueType::Length, true),
    functional!("mr", ["margin-right"], "spacing", ValueType::Length, true),
    functional!("mb", ["margin-bottom"], "spacing", ValueType::Length, true),
    functional!("ml", ["margin-left"], "spacing", ValueType::Length, true),
    functional!("gap", ["gap"], "spacing", ValueType::Length, false),
    functional!("gap-x", ["column-gap"], "spacing", ValueType::Length, false),
    functional!("gap-y", ["row-gap"], "spacing", ValueType::Length, false),
    // Sizing
    functional!("w", ["width"], "spacing", ValueType::Length, false),
    functional!("h", ["height"], "spacing", ValueType::Length, false),
    // Typography
    functional!("font", ["font-family"], "font", ValueType::Any, false),
    functional!("content", ["content"], "content", ValueType::Any, false),
    // Borders
    functional!("rounded", ["border-radius"], "radius", ValueType::Length, false),
];

const STATIC_UTILITIES: &[(&str, &[(&str, &str)])] = &[
    // Display
    ("block", &[("display", "block")]),
    ("inline-block", &[("display", "inline-block")]),
    ("inline", &[("display", "inline")]),
    ("flex", &[("display", "flex")]),
    ("inline-flex", &[("display", "inline-flex")]),
    ("grid", &[("display", "grid")]),
    ("inline-grid", &[("display", "inline-grid")]),
    ("contents", &[("display", "contents")]),
    ("hidden", &[("display", "none")]),
    // Position
    ("static", &[("position", "static")]),
    ("fixed", &[("position", "fixed")]),
    ("absolute", &[("position", "absolute")]),
    ("relative", &[("position", "relative")]),
    ("sticky", &[("position", "sticky")]),
    // Text decoration
    ("underline", &[("text-decoration-line", "underline")]),
    ("overline", &[("text-decoration-line", "overline")]),
    ("line-through", &[("text-decoration-line", "line-through")]),
    ("no-underline", &[("text-decoration-line", "none")]),
    // Font style / weight
    ("italic", &[("font-style", "italic")]),
    ("not-italic", &[("font-style", "normal")]),
    ("font-thin", &[("font-weight", "100")]),
    ("font-light", &[("font-weight", "300")]),
    ("font-normal", &[("font-weight", "400")]),
    ("font-medium", &[("font-weight", "500")]),
    ("font-semibold", &[("font-weight", "600")]),
    ("font-bold", &[("font-weight", "700")]),
    ("font-black", &[("font-weight", "900")]),
    // Text transform
    ("uppercase", &[("text-transform", "uppercase")]),
    ("lowercase", &[("text-transform", "lowercase")]),
    ("capitalize", &[("text-transform", "capitalize")]),
    ("normal-case", &[("text-transform", "none")]),
    // Font size
    ("text-xs", &[("font-size", "0.75rem"), ("line-height", "1rem")]),
    ("text-sm", &[("font-size", "0.875rem"), ("line-height", "1.25rem")]),
    ("text-base", &[("font-size", "1rem"), ("line-height", "1.5rem")]),
    ("text-lg", &[("font-size", "1.125rem"), ("line-height", "1.75rem")]),
    ("text-xl", &[("font-size", "1.25rem"), ("line-height", "1.75rem")]),
    ("text-2xl", &[("font-size", "1.5rem"), ("line-height", "2rem")]),
    // Flexbox
    ("flex-row", &[("flex-direction", "row")]),
    ("flex-col", &[("flex-direction", "column")]),
    ("flex-wrap", &[("flex-wrap", "wrap")]),
    ("flex-nowrap", &[("flex-wrap", "nowrap")]),
    ("items-start", &[("align-items", "flex-start")]),
    ("items-center", &[("align-items", "center")]),
    ("items-end", &[("align-items", "flex-end")]),
    ("justify-start", &[("justify-content", "flex-start")]),
    ("justify-center", &[("justify-content", "center")]),
    ("justify-end", &[("justify-content", "flex-end")]),
    ("justify-between", &[("justify-content", "space-between")]),
    // Borders
    ("border", &[("border-width", "1px")]),
    ("rounded", &[("border-radius", "0.25rem")]),
    ("rounded-full", &[("border-radius", "9999px")]),
    // Misc
    (
        "truncate",
        &[
            ("overflow", "hidden"),
            ("text-overflow", "ellipsis"),
            ("white-space", "nowrap"),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_lookup() {
        assert_eq!(
            lookup_static("flex"),
            Some(&[("display", "flex")][..])
        );
        assert_eq!(lookup_static("text-sm").unwrap().len(), 2);
        assert_eq!(lookup_static("not-a-real-utility-123"), None);
    }

    #[test]
    fn test_functional_lookup() {
        let bg = lookup_functional("bg").unwrap();
        assert_eq!(bg.properties, &["background-color"]);
        assert_eq!(bg.value_type, ValueType::Color);
        assert!(!bg.negatable);

        let m = lookup_functional("m").unwrap();
        assert!(m.negatable);

        assert!(lookup_functional("flex").is_none());
    }

    #[test]
    fn test_static_wins_shape_overlap() {
        // `rounded` is both a static default and a functional prefix;
        // the resolver checks the static table first.
        assert!(lookup_static("rounded").is_some());
        assert!(lookup_functional("rounded").is_some());
    }
}
