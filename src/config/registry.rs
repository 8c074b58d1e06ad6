//! Path registry: compiled source, output and watch patterns per asset class.
//!
//! Built once from `[paths]` after the project root is known and kept inside
//! [`SiteConfig`](super::SiteConfig). Output directories are absolute.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::ConfigDiagnostics;
use super::section::PathsConfig;
use crate::core::AssetClass;
use crate::utils::glob::GlobSet;

#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub class: AssetClass,
    pub sources: GlobSet,
    pub dest: PathBuf,
    pub watch: GlobSet,
}

impl ClassEntry {
    /// Source files currently on disk.
    pub fn expand(&self, root: &Path) -> Vec<PathBuf> {
        self.sources.expand(root)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PathRegistry {
    root: PathBuf,
    clean: PathBuf,
    entries: FxHashMap<AssetClass, ClassEntry>,
}

impl PathRegistry {
    /// Compile every class; bad patterns are recorded in `diag` and leave the
    /// class with an empty pattern set.
    pub fn build(paths: &PathsConfig, root: &Path, diag: &mut ConfigDiagnostics) -> Self {
        let mut entries = FxHashMap::default();

        for class in AssetClass::ALL {
            let resolved = paths.resolve(class);
            let mut compile = |key: &str, patterns: &[String]| {
                GlobSet::new(patterns).unwrap_or_else(|e| {
                    diag.error(format!("paths.{}.{key}", class.name()), e.to_string());
                    GlobSet::default()
                })
            };
            let sources = compile("src", &resolved.src);
            let watch = compile("watch", &resolved.watch);

            if sources.is_empty() {
                diag.error(
                    format!("paths.{}.src", class.name()),
                    "needs at least one pattern that is not an exclusion",
                );
            }

            entries.insert(
                class,
                ClassEntry {
                    class,
                    sources,
                    dest: root.join(&resolved.dest),
                    watch,
                },
            );
        }

        Self {
            root: root.to_path_buf(),
            clean: root.join(paths.clean_dir()),
            entries,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory removed by the clean task.
    pub fn clean_dir(&self) -> &Path {
        &self.clean
    }

    pub fn get(&self, class: AssetClass) -> Option<&ClassEntry> {
        self.entries.get(&class)
    }

    /// Classes whose watch patterns match `path`, in [`AssetClass::ALL`] order.
    pub fn classes_for(&self, path: &Path) -> Vec<AssetClass> {
        AssetClass::ALL
            .into_iter()
            .filter(|class| {
                self.entries
                    .get(class)
                    .is_some_and(|e| e.watch.matches_path(path, &self.root))
            })
            .collect()
    }

    /// Directories to hand to the filesystem watcher.
    pub fn watch_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .entries
            .values()
            .flat_map(|e| e.watch.watch_roots(&self.root))
            .collect();
        roots.sort();
        roots.dedup();
        // nested roots are covered by their recursive parent
        let mut kept: Vec<PathBuf> = Vec::new();
        for root in roots {
            if !kept.iter().any(|k| root.starts_with(k)) {
                kept.push(root);
            }
        }
        kept
    }
}
