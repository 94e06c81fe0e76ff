//! Entry structure loading.
//!
//! Parses the entry stylesheet and inlines every `@import` depth-first in
//! declaration order, producing one flattened node stream plus the list of
//! structure files it came from. An unresolvable import is fatal: the entry
//! structure is a required resource.

use crate::error::{BuildError, BuildResult};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use zephyr_common::FileSystem;
use zephyr_parser::{parse_stylesheet, Node};

#[derive(Debug, Clone, Default)]
pub struct LoadedStructure {
    /// Flattened nodes with imports expanded in place
    pub nodes: Vec<Node>,

    /// Entry plus imported partials, in visit order
    pub files: Vec<PathBuf>,
}

pub fn load_entry(fs: &dyn FileSystem, entry: &Path) -> BuildResult<LoadedStructure> {
    let mut structure = LoadedStructure::default();
    let mut visited = HashSet::new();

    let entry = fs.canonicalize(entry).unwrap_or_else(|_| entry.to_path_buf());
    visited.insert(entry.clone());
    structure.files.push(entry.clone());
    load_file(fs, &entry, &mut visited, &mut structure)?;

    Ok(structure)
}

fn load_file(
    fs: &dyn FileSystem,
    path: &Path,
    visited: &mut HashSet<PathBuf>,
    structure: &mut LoadedStructure,
) -> BuildResult<()> {
    let source = fs
        .read_to_string(path)
        .map_err(|source| BuildError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    let document = parse_stylesheet(&source)?;

    for node in document.nodes {
        match node {
            Node::Import { path: import_path } => {
                let resolved = resolve_import(fs, &import_path, path)?;
                // Each partial expands once, at its first import site
                if visited.insert(resolved.clone()) {
                    structure.files.push(resolved.clone());
                    load_file(fs, &resolved, visited, structure)?;
                }
            }
            other => structure.nodes.push(other),
        }
    }

    Ok(())
}

fn resolve_import(
    fs: &dyn FileSystem,
    import_path: &str,
    importing_file: &Path,
) -> BuildResult<PathBuf> {
    let base = importing_file.parent().unwrap_or(Path::new("."));
    let mut resolved = base.join(import_path);
    if resolved.extension().is_none() {
        resolved.set_extension("css");
    }

    if !fs.exists(&resolved) {
        return Err(BuildError::ImportNotFound {
            import_path: import_path.to_string(),
            source_path: importing_file.to_string_lossy().to_string(),
        });
    }

    Ok(fs.canonicalize(&resolved).unwrap_or(resolved))
}
