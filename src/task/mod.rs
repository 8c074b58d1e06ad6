//! Tasks: one per asset class plus `clean`.
//!
//! A task expands its source globs, processes the files (in parallel where
//! they are independent), catches per-file failures and returns a
//! [`TaskReport`]. Tasks never abort each other.

mod clean;
mod fonts;
mod images;
mod markup;
mod report;
mod scripts;
mod styles;

pub use report::{FileOutcome, TaskFailure, TaskReport};

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::config::{ClassEntry, SiteConfig};
use crate::core::AssetClass;
use crate::utils::path::mirror_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    Clean,
    Asset(AssetClass),
}

impl Task {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clear",
            Self::Asset(class) => class.name(),
        }
    }

    /// Run the task. A panic inside it becomes a failure of the report.
    pub fn run(self, config: &SiteConfig) -> TaskReport {
        catch_panic(self.name(), || self.run_unguarded(config))
    }

    fn run_unguarded(self, config: &SiteConfig) -> TaskReport {
        match self {
            Self::Clean => clean::run(config),
            Self::Asset(class) => {
                let Some(entry) = config.registry.get(class) else {
                    return TaskReport::new(class.name());
                };
                match class {
                    AssetClass::Markup => markup::run(config, entry),
                    AssetClass::Styles | AssetClass::Scss => styles::run(config, entry),
                    AssetClass::Scripts => scripts::run(config, entry),
                    AssetClass::Images => images::run(config, entry),
                    AssetClass::Fonts => fonts::run(config, entry),
                }
            }
        }
    }
}

/// Run `f`, turning a panic into a report with one failure.
pub fn catch_panic<F>(task: &'static str, f: F) -> TaskReport
where
    F: FnOnce() -> TaskReport,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| panicked(task, &*payload))
}

/// Report for a task whose thread died with `payload`.
pub fn panicked(task: &'static str, payload: &(dyn Any + Send)) -> TaskReport {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    let mut report = TaskReport::new(task);
    report.fail(task, format!("task panicked: {message}"));
    report
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output path of `source`, mirrored from its glob base into the class
/// output directory.
fn output_for(entry: &ClassEntry, source: &Path, root: &Path) -> PathBuf {
    let base = entry
        .sources
        .base_for(source, root)
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| root.to_path_buf());
    mirror_path(source, &base, &entry.dest)
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Project trees for task tests.

    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use crate::config::{SiteConfig, test_config_at};

    pub fn write(root: &Path, rel: &str, contents: impl AsRef<[u8]>) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Empty project with the given `kiln.toml` content.
    pub fn project(toml: &str) -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let config = test_config_at(&root, toml);
        (dir, config)
    }

    pub fn production() -> &'static str {
        "[build]\nproduction = true\n"
    }
}
