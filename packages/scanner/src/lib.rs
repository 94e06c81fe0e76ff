//! Content-root scanning for the Zephyr engine.
//!
//! Roots come from `@source` globs and config `content` arrays, unioned
//! into one set per compilation unit (inferred from the project tree when
//! neither declares any). Files
//! are enumerated and merged in sorted-path order so the final output never
//! depends on filesystem enumeration order.

pub mod extract;

pub use extract::extract_candidates;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zephyr_common::Diagnostic;

/// Per-file candidate sets plus scan warnings
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// File -> distinct candidates in first-occurrence order.
    /// BTreeMap keeps files in sorted-path order for determinism.
    pub files: BTreeMap<PathBuf, Vec<String>>,

    pub diagnostics: Vec<Diagnostic>,
}

/// Expand content globs into a sorted, deduplicated file list.
///
/// Patterns starting with `!` are exclusions applied to the included set.
/// A pattern without glob metacharacters naming a directory walks the whole
/// tree under it. With no include patterns at all, roots are inferred from
/// the base directory, skipping dot-directories, dependency/build trees,
/// stylesheets, and binary assets.
pub fn expand_roots(base: &Path, globs: &[String]) -> (Vec<PathBuf>, Vec<Diagnostic>) {
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();
    let mut excludes: Vec<glob::Pattern> = Vec::new();
    let mut diagnostics = Vec::new();
    let mut has_include = false;

    for pattern in globs {
        if let Some(excluded) = pattern.strip_prefix('!') {
            let absolute = absolutize(base, excluded);
            match glob::Pattern::new(&absolute.to_string_lossy()) {
                Ok(p) => excludes.push(p),
                Err(err) => diagnostics
                    .push(Diagnostic::warning(format!("invalid exclude glob '{}': {}", pattern, err))),
            }
            continue;
        }
        has_include = true;

        let absolute = absolutize(base, pattern);
        if is_literal_path(pattern) {
            if absolute.is_dir() {
                for entry in walkdir::WalkDir::new(&absolute)
                    .follow_links(true)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    if entry.file_type().is_file() {
                        files.insert(entry.path().to_path_buf());
                    }
                }
            } else if absolute.is_file() {
                files.insert(absolute);
            }
            continue;
        }

        match glob::glob(&absolute.to_string_lossy()) {
            Ok(paths) => {
                for path in paths.filter_map(|p| p.ok()) {
                    if path.is_file() {
                        files.insert(path);
                    }
                }
            }
            Err(err) => {
                diagnostics.push(Diagnostic::warning(format!(
                    "invalid content glob '{}': {}",
                    pattern, err
                )));
            }
        }
    }

    // No explicit roots: infer project files from the base directory
    if !has_include {
        for entry in walkdir::WalkDir::new(base)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_inferred_skip(e.path()))
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() && is_inferred_content(entry.path()) {
                files.insert(entry.path().to_path_buf());
            }
        }
    }

    let files = files
        .into_iter()
        .filter(|f| {
            let text = f.to_string_lossy();
            !excludes.iter().any(|p| p.matches(&text))
        })
        .collect();

    (files, diagnostics)
}

const SKIP_DIRS: &[&str] = &["node_modules", "target", "dist", "build", "vendor"];

fn is_inferred_skip(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.starts_with('.') || SKIP_DIRS.contains(&name),
        None => false,
    }
}

/// Inferred roots take every project file except stylesheets (the entry
/// file and its partials live in the same tree) and obvious binaries.
fn is_inferred_content(path: &Path) -> bool {
    const SKIP_EXTENSIONS: &[&str] = &[
        "css", "map", "lock", "png", "jpg", "jpeg", "gif", "webp", "ico", "woff", "woff2", "ttf",
        "otf", "eot", "zip", "gz", "pdf", "wasm",
    ];
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => !SKIP_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => true,
    }
}

/// Scan all content roots. Unreadable files are skipped with a warning.
pub fn scan(base: &Path, globs: &[String]) -> ScanResult {
    let (files, mut diagnostics) = expand_roots(base, globs);
    let mut result = ScanResult::default();

    for path in files {
        match scan_file(&path) {
            Ok(candidates) => {
                debug!(file = %path.display(), count = candidates.len(), "Scanned content file");
                result.files.insert(path, candidates);
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "Skipping unreadable content file");
                diagnostics.push(
                    Diagnostic::warning(format!("skipping unreadable file: {}", err))
                        .with_file(path),
                );
            }
        }
    }

    result.diagnostics = diagnostics;
    result
}

/// Scan a single content file
pub fn scan_file(path: &Path) -> Result<Vec<String>, std::io::Error> {
    let text = std::fs::read_to_string(path)?;
    Ok(extract_candidates(&text))
}

/// Would this path be picked up by the given content globs? Used to decide
/// whether a newly created file joins the scan set.
pub fn path_matches_roots(base: &Path, globs: &[String], path: &Path) -> bool {
    let text = path.to_string_lossy();
    let mut included = false;
    let mut has_include = false;

    for pattern in globs {
        if let Some(excluded) = pattern.strip_prefix('!') {
            let absolute = absolutize(base, excluded);
            if let Ok(p) = glob::Pattern::new(&absolute.to_string_lossy()) {
                if p.matches(&text) {
                    return false;
                }
            }
            continue;
        }
        has_include = true;

        let absolute = absolutize(base, pattern);
        if is_literal_path(pattern) {
            if path.starts_with(&absolute) {
                included = true;
            }
        } else if let Ok(p) = glob::Pattern::new(&absolute.to_string_lossy()) {
            if p.matches(&text) {
                included = true;
            }
        }
    }

    if !has_include {
        return path.strip_prefix(base).map_or(false, |relative| {
            is_inferred_content(path) && !relative.iter().any(|c| is_inferred_skip(Path::new(c)))
        });
    }

    included
}

fn absolutize(base: &Path, pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(pattern)
    }
}

fn is_literal_path(pattern: &str) -> bool {
    !pattern.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_scan_multiple_roots() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "a/index.html", r#"<p class="underline">a</p>"#);
        write(tmp.path(), "b/app.js", r#"el.className = "flex";"#);

        let result = scan(
            tmp.path(),
            &["a/**/*.html".to_string(), "b/**/*.js".to_string()],
        );

        let all: Vec<&String> = result.files.values().flatten().collect();
        assert!(all.iter().any(|c| c.as_str() == "underline"));
        assert!(all.iter().any(|c| c.as_str() == "flex"));
    }

    #[test]
    fn test_files_are_sorted_by_path() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "z.html", "flex");
        write(tmp.path(), "a.html", "underline");

        let result = scan(tmp.path(), &["*.html".to_string()]);
        let paths: Vec<&PathBuf> = result.files.keys().collect();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.html"));
        assert!(paths[1].ends_with("z.html"));
    }

    #[test]
    fn test_directory_root_walks_tree() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/nested/deep.html", "p-4");

        let result = scan(tmp.path(), &["src".to_string()]);
        assert_eq!(result.files.len(), 1);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_exclude_globs() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "src/app.html", "flex");
        write(tmp.path(), "src/vendor/lib.html", "underline");

        let result = scan(
            tmp.path(),
            &["src/**/*.html".to_string(), "!src/vendor/**".to_string()],
        );
        assert_eq!(result.files.len(), 1);
        let all: Vec<&String> = result.files.values().flatten().collect();
        assert!(all.iter().any(|c| c.as_str() == "flex"));
        assert!(!all.iter().any(|c| c.as_str() == "underline"));
    }

    #[test]
    fn test_path_matches_roots() {
        let base = Path::new("/project");
        let globs = vec!["src/**/*.html".to_string(), "!src/vendor/**".to_string()];

        assert!(path_matches_roots(
            base,
            &globs,
            Path::new("/project/src/pages/index.html")
        ));
        assert!(!path_matches_roots(
            base,
            &globs,
            Path::new("/project/src/vendor/lib.html")
        ));
        assert!(!path_matches_roots(
            base,
            &globs,
            Path::new("/project/other/index.html")
        ));
    }

    #[test]
    fn test_inferred_roots_when_none_declared() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "index.html", r#"<div class="flex"></div>"#);
        write(tmp.path(), "app.css", ".not-scanned { color: red; }");
        write(
            tmp.path(),
            "node_modules/pkg/lib.js",
            r#"el.className = "underline";"#,
        );

        let result = scan(tmp.path(), &[]);
        let all: Vec<&String> = result.files.values().flatten().collect();
        assert!(all.iter().any(|c| c.as_str() == "flex"));
        // Stylesheets and dependency trees are not content
        assert!(!all.iter().any(|c| c.as_str() == "not-scanned"));
        assert!(!all.iter().any(|c| c.as_str() == "underline"));

        assert!(path_matches_roots(tmp.path(), &[], &tmp.path().join("a.html")));
        assert!(!path_matches_roots(
            tmp.path(),
            &[],
            &tmp.path().join("styles/out.css")
        ));
    }

    #[test]
    fn test_missing_root_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let result = scan(tmp.path(), &["missing/**/*.html".to_string()]);
        assert!(result.files.is_empty());
    }
}
