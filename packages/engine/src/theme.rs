//! Design token store.
//!
//! Theme variables arrive from `@theme` blocks across the entry file and
//! its imports; they all merge into one store before resolution begins.
//! Later declarations for the same key override earlier ones, but the
//! variable keeps its first-declared position so redefining a value never
//! reorders the emitted `:root` block.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeStore {
    variables: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the built-in default tokens. `@theme` blocks merge
    /// on top of these.
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        for (name, value) in DEFAULT_THEME.iter().copied() {
            store.insert(name, value);
        }
        store
    }

    /// Insert or override a variable (last declaration wins)
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.index.get(&name) {
            Some(&pos) => self.variables[pos].1 = value,
            None => {
                self.index.insert(name.clone(), self.variables.len());
                self.variables.push((name, value));
            }
        }
    }

    /// Merge declarations from one `@theme` block, in order
    pub fn merge(&mut self, declarations: &[(String, String)]) {
        for (name, value) in declarations {
            self.insert(name.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&pos| self.variables[pos].1.as_str())
    }

    /// Variables in first-declared order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }
}

/// Built-in design tokens. Deliberately small: the full default palette is
/// registry data, not engine behavior.
const DEFAULT_THEME: &[(&str, &str)] = &[
    ("--spacing", "0.25rem"),
    ("--color-black", "#000"),
    ("--color-white", "#fff"),
    ("--font-sans", "ui-sans-serif, system-ui, sans-serif"),
    ("--font-serif", "ui-serif, Georgia, serif"),
    ("--font-mono", "ui-monospace, monospace"),
];
