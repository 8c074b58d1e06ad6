//! Task results.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::log;
use crate::utils::path::display_rel;
use crate::utils::plural_count;

/// A per-file transformation failure.
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub task: &'static str,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// What happened to one source file.
#[derive(Debug)]
pub enum FileOutcome {
    Written(Vec<PathBuf>),
    /// Every output was fresh.
    Skipped,
    Failed(PathBuf, anyhow::Error),
}

#[derive(Debug, Clone, Default)]
pub struct TaskReport {
    pub task: &'static str,
    pub written: Vec<PathBuf>,
    pub skipped: usize,
    pub failures: Vec<TaskFailure>,
    /// Extra line for the log, e.g. the markup size report.
    pub summary: Option<String>,
}

impl TaskReport {
    pub fn new(task: &'static str) -> Self {
        Self {
            task,
            ..Self::default()
        }
    }

    pub fn from_outcomes(task: &'static str, outcomes: impl IntoIterator<Item = FileOutcome>) -> Self {
        let mut report = Self::new(task);
        for outcome in outcomes {
            report.record(outcome);
        }
        report
    }

    pub fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Written(paths) => self.written.extend(paths),
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Failed(path, error) => self.fail(path, format!("{error:#}")),
        }
    }

    pub fn fail(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.failures.push(TaskFailure {
            task: self.task,
            path: path.into(),
            message: message.into(),
        });
    }

    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// `3 files written, 2 unchanged`
    pub fn headline(&self) -> String {
        let mut line = format!("{} written", plural_count(self.written.len(), "file"));
        if self.skipped > 0 {
            line.push_str(&format!(", {} unchanged", self.skipped));
        }
        if let Some(summary) = &self.summary {
            line.push_str(", ");
            line.push_str(summary);
        }
        line
    }

    /// Failure lines with paths shown relative to `root`.
    pub fn failure_detail(&self, root: &Path) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", display_rel(&f.path, root), f.message))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Print the report of a one-shot run.
    pub fn log(&self, root: &Path) {
        log!(self.task; "{}", self.headline());
        for failure in &self.failures {
            log!("error"; "{}: {}", display_rel(&failure.path, root), failure.message);
        }
    }
}
