//! Shared types for the Zephyr engine: filesystem abstraction, diagnostics,
//! and project configuration.

pub mod config;
pub mod diagnostics;
pub mod filesystem;

pub use config::ProjectConfig;
pub use diagnostics::{Diagnostic, Severity};
pub use filesystem::{FileSystem, MockFileSystem, RealFileSystem};
