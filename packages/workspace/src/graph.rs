//! Dependency graph for one compilation session.
//!
//! Nodes are files (entry stylesheet, imported partials, config/plugin
//! files, content files); edges record which file's contribution affects
//! which recomputation scope. Built on the first full compilation, mutated
//! incrementally, discarded on process exit.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// What a file contributes to the build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    /// Entry stylesheet or an imported partial: shapes output structure
    Structure,
    /// Config or plugin file: feeds the theme store / variant registry / roots
    Configuration,
    /// Scanned content file: contributes a candidate set
    Content,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    roles: HashMap<PathBuf, FileRole>,

    /// file -> files it depends on
    dependencies: HashMap<PathBuf, Vec<PathBuf>>,

    /// Reverse lookup: file -> files that depend on it
    dependents: HashMap<PathBuf, Vec<PathBuf>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: PathBuf, role: FileRole) {
        self.roles.insert(path, role);
    }

    pub fn role(&self, path: &Path) -> Option<FileRole> {
        self.roles.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.roles.contains_key(path)
    }

    /// Record that `source` depends on `target`
    pub fn add_dependency(&mut self, source: PathBuf, target: PathBuf) {
        self.dependencies
            .entry(source.clone())
            .or_default()
            .push(target.clone());
        self.dependents.entry(target).or_default().push(source);
    }

    pub fn get_dependencies(&self, path: &Path) -> Option<&[PathBuf]> {
        self.dependencies.get(path).map(|v| v.as_slice())
    }

    pub fn get_dependents(&self, path: &Path) -> Option<&[PathBuf]> {
        self.dependents.get(path).map(|v| v.as_slice())
    }

    pub fn all_files(&self) -> HashSet<PathBuf> {
        self.roles.keys().cloned().collect()
    }

    /// Remove a file and every edge touching it
    pub fn remove_file(&mut self, path: &Path) {
        self.roles.remove(path);

        if let Some(deps) = self.dependencies.remove(path) {
            for dep in deps {
                if let Some(dependents) = self.dependents.get_mut(&dep) {
                    dependents.retain(|p| p != path);
                    if dependents.is_empty() {
                        self.dependents.remove(&dep);
                    }
                }
            }
        }

        if let Some(dependents) = self.dependents.remove(path) {
            for dependent in dependents {
                if let Some(deps) = self.dependencies.get_mut(&dependent) {
                    deps.retain(|p| p != path);
                    if deps.is_empty() {
                        self.dependencies.remove(&dependent);
                    }
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.roles.clear();
        self.dependencies.clear();
        self.dependents.clear();
    }
}
