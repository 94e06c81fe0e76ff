use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

/// Build-breaking errors: only resource-read failures on required files and
/// structurally invalid directives escalate this far. Everything else
/// degrades to diagnostics and fewer rules.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] zephyr_parser::ParseError),

    #[error("Import not found: {import_path} imported by {source_path}")]
    ImportNotFound {
        import_path: String,
        source_path: String,
    },

    #[error("Invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },
}
