//! Session-level orchestration: structure loading, the dependency graph,
//! the incremental build coordinator, and the filesystem watcher.

pub mod coordinator;
pub mod error;
pub mod graph;
pub mod loader;
pub mod watcher;

pub use coordinator::{BuildCoordinator, CompileOutput, CoordinatorState};
pub use error::{BuildError, BuildResult};
pub use graph::{DependencyGraph, FileRole};
pub use loader::{load_entry, LoadedStructure};
pub use watcher::{FileWatcher, WatcherError, WatcherResult};
