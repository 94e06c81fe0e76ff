use serde::{Deserialize, Serialize};

/// Configuration file format referenced by an `@config "..."` directive.
///
/// Legacy JS-style config distilled to JSON: the `content` globs feed the
/// scanner's root set, `important` forces `!important` on every generated
/// declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Content glob patterns, in declaration order
    #[serde(default)]
    pub content: Vec<String>,

    /// Force `!important` on all generated declarations
    #[serde(default)]
    pub important: bool,
}

impl ProjectConfig {
    /// Parse a config file's JSON text
    pub fn parse(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }
}
