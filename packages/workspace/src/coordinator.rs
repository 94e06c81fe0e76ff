//! Incremental build coordinator.
//!
//! One long-lived state machine per compilation session:
//!
//! - `Idle` -> first build runs every stage, populates the dependency
//!   graph, and moves to `Ready`;
//! - `Ready` -> file-change notifications queue up (coalesced per file) and
//!   `process_pending` recomputes only the affected scope:
//!   - content file: re-scan that file, diff its candidate set, resolve only
//!     what's new, re-assemble;
//!   - config/plugin file: rebuild theme/registry wholesale, re-resolve
//!     every seen candidate (discovery untouched), re-assemble;
//!   - entry structure: full rebuild from scratch.
//!
//! There is no error state: a failed partial update logs a diagnostic and
//! retains the last known-good output. The output after any incremental
//! update is byte-identical to a full recompilation of the same inputs.

use crate::error::{BuildError, BuildResult};
use crate::graph::{DependencyGraph, FileRole};
use crate::loader;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};
use zephyr_common::{Diagnostic, ProjectConfig, RealFileSystem};
use zephyr_engine::{
    assemble, resolve_candidate, PluginRegistrar, ResolveContext, ThemeStore, VariantRegistry,
};
use zephyr_parser::{parse_plugin, Node};

/// What the engine hands back to its adapter: the stylesheet text, the
/// diagnostics list, and the files feeding the build (for a file watcher).
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    pub css: String,
    pub diagnostics: Vec<Diagnostic>,
    pub dependencies: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Ready,
}

struct CachedResolution {
    rules: Vec<zephyr_engine::GeneratedRule>,
    diagnostics: Vec<Diagnostic>,
}

pub struct BuildCoordinator {
    entry: PathBuf,
    base_dir: PathBuf,
    state: CoordinatorState,

    // Session state, owned exclusively here and mutated only inside the
    // serialized update path; resolution sees read-only snapshots.
    graph: DependencyGraph,
    nodes: Vec<Node>,
    structure_files: Vec<PathBuf>,
    config_files: Vec<PathBuf>,
    theme: ThemeStore,
    variants: VariantRegistry,
    important: bool,
    roots: Vec<String>,

    /// Content file -> candidates in first-seen order (sorted-path keys)
    file_candidates: BTreeMap<PathBuf, Vec<String>>,
    scan_diagnostics: Vec<Diagnostic>,

    /// Candidate -> generated rules. Entries for removed candidates are
    /// retained for reuse; the cache is cleared whenever theme/registry
    /// state changes.
    rule_cache: HashMap<String, CachedResolution>,

    last_output: Option<CompileOutput>,

    // Coalescing change queue
    queue: VecDeque<PathBuf>,
    queued: HashSet<PathBuf>,
}

impl BuildCoordinator {
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        let entry: PathBuf = entry.into();
        let entry = std::fs::canonicalize(&entry).unwrap_or(entry);
        let base_dir = entry
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            entry,
            base_dir,
            state: CoordinatorState::Idle,
            graph: DependencyGraph::new(),
            nodes: Vec::new(),
            structure_files: Vec::new(),
            config_files: Vec::new(),
            theme: ThemeStore::with_defaults(),
            variants: VariantRegistry::with_builtins(),
            important: false,
            roots: Vec::new(),
            file_candidates: BTreeMap::new(),
            scan_diagnostics: Vec::new(),
            rule_cache: HashMap::new(),
            last_output: None,
            queue: VecDeque::new(),
            queued: HashSet::new(),
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn entry(&self) -> &PathBuf {
        &self.entry
    }

    /// Full compilation. Fatal errors surface to the caller; no partial
    /// output is written.
    #[instrument(skip(self), fields(entry = %self.entry.display()))]
    pub fn build(&mut self) -> BuildResult<&CompileOutput> {
        info!("Starting full compilation");
        let output = self.full_compile()?;
        info!(
            bytes = output.css.len(),
            diagnostics = output.diagnostics.len(),
            "Full compilation complete"
        );
        self.last_output = Some(output);
        self.state = CoordinatorState::Ready;
        Ok(self.last_output.as_ref().expect("output just stored"))
    }

    /// Queue a file-change notification. Consecutive changes to the same
    /// file coalesce into one pending update.
    pub fn notify_change(&mut self, path: impl Into<PathBuf>) {
        let path: PathBuf = path.into();
        let path = std::fs::canonicalize(&path).unwrap_or(path);
        if self.queued.insert(path.clone()) {
            debug!(file = %path.display(), "Queued file change");
            self.queue.push_back(path);
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Drain the change queue and apply one batched update. The whole batch
    /// resolves against the post-update theme/registry state. A failed
    /// update keeps the last known-good output and reports the failure as a
    /// diagnostic; the coordinator always ends back in `Ready`.
    pub fn process_pending(&mut self) -> BuildResult<&CompileOutput> {
        if self.state == CoordinatorState::Idle || self.last_output.is_none() {
            self.queue.clear();
            self.queued.clear();
            return self.build();
        }

        let batch: Vec<PathBuf> = self.queue.drain(..).collect();
        self.queued.clear();

        if !batch.is_empty() {
            match self.apply_batch(&batch) {
                Ok(Some(output)) => self.last_output = Some(output),
                Ok(None) => {}
                Err(err) => {
                    warn!(error = %err, "Incremental update failed; keeping last known-good output");
                    if let Some(output) = &mut self.last_output {
                        output.diagnostics.push(Diagnostic::error(format!(
                            "incremental update failed, previous output retained: {}",
                            err
                        )));
                    }
                }
            }
        }

        Ok(self
            .last_output
            .as_ref()
            .expect("Ready state implies an output"))
    }

    fn full_compile(&mut self) -> BuildResult<CompileOutput> {
        let loaded = loader::load_entry(&RealFileSystem, &self.entry)?;
        self.nodes = loaded.nodes;
        self.structure_files = loaded.files;

        self.reload_configuration()?;

        let scan = zephyr_scanner::scan(&self.base_dir, &self.roots);
        self.file_candidates = scan.files;
        self.scan_diagnostics = scan.diagnostics;

        // Fresh theme/registry state invalidates every cached rule
        self.rule_cache.clear();

        self.rebuild_graph();
        Ok(self.render())
    }

    /// Rebuild theme store, variant registry, root set, and the important
    /// flag from the current node stream.
    fn reload_configuration(&mut self) -> BuildResult<()> {
        let mut theme = ThemeStore::with_defaults();
        let mut variants = VariantRegistry::with_builtins();
        let mut roots = Vec::new();
        let mut config_files = Vec::new();
        let mut important = false;

        for node in &self.nodes {
            match node {
                Node::Theme { declarations } => theme.merge(declarations),
                Node::Source { glob } => roots.push(glob.clone()),
                Node::Config { path } => {
                    let resolved = self.base_dir.join(path);
                    let text = std::fs::read_to_string(&resolved).map_err(|source| {
                        BuildError::Unreadable {
                            path: resolved.clone(),
                            source,
                        }
                    })?;
                    let config =
                        ProjectConfig::parse(&text).map_err(|err| BuildError::Config {
                            path: resolved.clone(),
                            message: err.to_string(),
                        })?;
                    roots.extend(config.content);
                    important |= config.important;
                    config_files.push(resolved);
                }
                Node::Plugin { path } => {
                    let resolved = self.base_dir.join(path);
                    let text = std::fs::read_to_string(&resolved).map_err(|source| {
                        BuildError::Unreadable {
                            path: resolved.clone(),
                            source,
                        }
                    })?;
                    let registrations = parse_plugin(&text)?;
                    let mut registrar = PluginRegistrar::new();
                    registrar.add_registrations(registrations);
                    variants.apply_plugin(registrar);
                    config_files.push(resolved);
                }
                _ => {}
            }
        }

        self.theme = theme;
        self.variants = variants;
        self.roots = roots;
        self.config_files = config_files;
        self.important = important;
        Ok(())
    }

    fn rebuild_graph(&mut self) {
        self.graph.clear();

        for (index, file) in self.structure_files.iter().enumerate() {
            self.graph.insert(file.clone(), FileRole::Structure);
            if index > 0 {
                self.graph
                    .add_dependency(self.entry.clone(), file.clone());
            }
        }

        for file in &self.config_files {
            self.graph.insert(file.clone(), FileRole::Configuration);
            self.graph.add_dependency(self.entry.clone(), file.clone());
        }

        for file in self.file_candidates.keys() {
            self.graph.insert(file.clone(), FileRole::Content);
        }
    }

    /// Candidates in deterministic order: files in sorted-path order, then
    /// per-file first-occurrence order, first sighting wins globally.
    fn ordered_candidates(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut ordered = Vec::new();
        for candidates in self.file_candidates.values() {
            for candidate in candidates {
                if seen.insert(candidate.as_str()) {
                    ordered.push(candidate.clone());
                }
            }
        }
        ordered
    }

    /// Resolve every live candidate (through the cache) and assemble
    fn render(&mut self) -> CompileOutput {
        let ordered = self.ordered_candidates();

        let ctx = ResolveContext {
            theme: &self.theme,
            variants: &self.variants,
            important: self.important,
        };
        let rule_cache = &mut self.rule_cache;

        let mut rules = Vec::new();
        let mut diagnostics = self.scan_diagnostics.clone();
        for candidate in &ordered {
            let cached = rule_cache.entry(candidate.clone()).or_insert_with(|| {
                let resolution = resolve_candidate(candidate, &ctx);
                CachedResolution {
                    rules: resolution.rules,
                    diagnostics: resolution.diagnostics,
                }
            });
            rules.extend(cached.rules.iter().cloned());
            diagnostics.extend(cached.diagnostics.iter().cloned());
        }

        let css = assemble(&self.nodes, &self.theme, &rules);

        let mut dependencies = self.structure_files.clone();
        dependencies.extend(self.config_files.iter().cloned());
        dependencies.extend(self.file_candidates.keys().cloned());

        CompileOutput {
            css,
            diagnostics,
            dependencies,
        }
    }

    /// Apply one batched update. Returns `Ok(None)` when nothing observable
    /// changed.
    fn apply_batch(&mut self, batch: &[PathBuf]) -> BuildResult<Option<CompileOutput>> {
        let mut structure_changed = false;
        let mut config_changed = false;
        let mut content_paths = Vec::new();

        for path in batch {
            let role = self.graph.role(path);
            match role {
                Some(FileRole::Structure) => structure_changed = true,
                Some(FileRole::Configuration) => {
                    // A vanished required file forces the full path, which
                    // reports the read failure and keeps the old output
                    if !path.exists() {
                        structure_changed = true;
                    } else {
                        config_changed = true;
                    }
                }
                Some(FileRole::Content) => content_paths.push(path.clone()),
                None => {
                    if *path == self.entry {
                        structure_changed = true;
                    } else if path.is_file()
                        && zephyr_scanner::path_matches_roots(&self.base_dir, &self.roots, path)
                    {
                        // Newly created content file
                        content_paths.push(path.clone());
                    } else {
                        debug!(file = %path.display(), "Ignoring change outside the build");
                    }
                }
            }
        }

        if structure_changed {
            debug!("Entry structure changed; rebuilding from scratch");
            return self.full_compile().map(Some);
        }

        if config_changed {
            debug!("Configuration changed; re-resolving all candidates");
            let old_roots = self.roots.clone();
            self.reload_configuration()?;
            self.rule_cache.clear();
            if self.roots != old_roots {
                let scan = zephyr_scanner::scan(&self.base_dir, &self.roots);
                self.file_candidates = scan.files;
                self.scan_diagnostics = scan.diagnostics;
            }
            self.rebuild_graph();
        }

        let mut dirty = config_changed;
        for path in content_paths {
            match zephyr_scanner::scan_file(&path) {
                Ok(candidates) => {
                    if self.file_candidates.get(&path) != Some(&candidates) {
                        debug!(file = %path.display(), count = candidates.len(), "Content file re-scanned");
                        self.file_candidates.insert(path.clone(), candidates);
                        self.graph.insert(path, FileRole::Content);
                        dirty = true;
                    }
                }
                Err(_) if !path.exists() => {
                    // Removed candidates drop out of the assembled output;
                    // their rule-cache entries stay for reuse if re-added
                    if self.file_candidates.remove(&path).is_some() {
                        debug!(file = %path.display(), "Content file removed");
                        self.graph.remove_file(&path);
                        dirty = true;
                    }
                }
                Err(err) => {
                    // Exists but unreadable: graph state no longer matches
                    // the filesystem, so force a full rebuild
                    warn!(file = %path.display(), error = %err, "Content file unreadable; forcing full rebuild");
                    return self.full_compile().map(Some);
                }
            }
        }

        if !dirty {
            return Ok(None);
        }

        Ok(Some(self.render()))
    }
}
