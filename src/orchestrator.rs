//! Task composition.
//!
//! ```text
//! build = clear → (html ∥ css|scss ∥ js ∥ img ∥ fonts)
//! dev   = build → (watch ∥ serve)
//! ```
//!
//! A failing task never stops its siblings or the rest of the sequence; its
//! failures are only reported.

use std::thread;

use crate::config::SiteConfig;
use crate::core::AssetClass;
use crate::task::{self, Task, TaskReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Task(Task),
    /// Each step starts after the previous one finished.
    Series(Vec<Step>),
    /// Every step on its own scoped thread.
    Parallel(Vec<Step>),
}

impl Step {
    /// Run the step, calling `on_report` as each task finishes.
    ///
    /// Reports come back in declaration order, not completion order.
    pub fn run<F>(&self, config: &SiteConfig, on_report: &F) -> Vec<TaskReport>
    where
        F: Fn(&TaskReport) + Sync,
    {
        match self {
            Self::Task(task) => {
                let report = task.run(config);
                on_report(&report);
                vec![report]
            }
            Self::Series(steps) => steps
                .iter()
                .flat_map(|step| step.run(config, on_report))
                .collect(),
            Self::Parallel(steps) => thread::scope(|scope| {
                let handles: Vec<_> = steps
                    .iter()
                    .map(|step| (step, scope.spawn(move || step.run(config, on_report))))
                    .collect();
                handles
                    .into_iter()
                    .flat_map(|(step, handle)| joined(step, handle.join(), on_report))
                    .collect()
            }),
        }
    }

    /// Name used when the step as a whole fails.
    fn label(&self) -> &'static str {
        match self {
            Self::Task(task) => task.name(),
            Self::Series(_) | Self::Parallel(_) => "build",
        }
    }

    /// `clear → (html | css | js)`
    pub fn describe(&self) -> String {
        match self {
            Self::Task(task) => task.name().to_string(),
            Self::Series(steps) => join(steps, " → "),
            Self::Parallel(steps) => format!("({})", join(steps, " | ")),
        }
    }
}

/// Reports of a finished branch; a dead thread counts as one failure.
fn joined<F>(step: &Step, result: thread::Result<Vec<TaskReport>>, on_report: &F) -> Vec<TaskReport>
where
    F: Fn(&TaskReport),
{
    result.unwrap_or_else(|payload| {
        let report = task::panicked(step.label(), &*payload);
        on_report(&report);
        vec![report]
    })
}

fn join(steps: &[Step], separator: &str) -> String {
    steps
        .iter()
        .map(Step::describe)
        .collect::<Vec<_>>()
        .join(separator)
}

/// `clear`, then every asset task concurrently.
pub fn build_plan(config: &SiteConfig) -> Step {
    let asset = |class| Step::Task(Task::Asset(class));
    Step::Series(vec![
        Step::Task(Task::Clean),
        Step::Parallel(vec![
            asset(AssetClass::Markup),
            asset(config.build.stylesheet.class()),
            asset(AssetClass::Scripts),
            asset(AssetClass::Images),
            asset(AssetClass::Fonts),
        ]),
    ])
}

/// Run `step`, logging every report. Returns whether all tasks succeeded.
pub fn run_logged(step: &Step, config: &SiteConfig) -> bool {
    let root = config.get_root();
    let reports = step.run(config, &|report: &TaskReport| report.log(root));
    let failures: usize = reports.iter().map(|r| r.failures.len()).sum();
    if failures > 0 {
        crate::log!("error"; "{}", crate::utils::plural_count(failures, "failure"));
    }
    failures == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixture;
    use parking_lot::Mutex;

    #[test]
    fn test_build_plan_shape() {
        let (_dir, config) = fixture::project("");
        assert_eq!(
            build_plan(&config).describe(),
            "clear → (html | css | js | img | fonts)"
        );

        let (_dir, config) = fixture::project("[build]\nstylesheet = \"scss\"\n");
        assert!(build_plan(&config).describe().contains("scss"));
    }

    #[test]
    fn test_clean_precedes_build_tasks() {
        let (_dir, config) = fixture::project("");
        let root = config.get_root();
        fixture::write(root, "dist/stale.txt", "old");
        fixture::write(root, "src/index.html", "<p>hi</p>");
        fixture::write(root, "src/css/style.css", "a{color:red}");

        let order = Mutex::new(Vec::new());
        let reports = build_plan(&config).run(&config, &|r: &TaskReport| order.lock().push(r.task));

        assert_eq!(order.lock()[0], "clear");
        assert_eq!(reports.len(), 6);
        assert!(reports.iter().all(TaskReport::is_ok));
        assert!(!root.join("dist/stale.txt").exists());
        assert!(root.join("dist/index.html").exists());
        assert!(root.join("dist/css/style.min.css").exists());
    }

    #[test]
    fn test_dead_branch_is_a_failure() {
        let step = Step::Task(Task::Asset(AssetClass::Fonts));
        let result = std::panic::catch_unwind(|| -> Vec<TaskReport> { panic!("worker died") });

        let seen = Mutex::new(0);
        let reports = joined(&step, result, &|_: &TaskReport| *seen.lock() += 1);
        assert_eq!(*seen.lock(), 1);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].task, "fonts");
        assert!(!reports[0].is_ok());
        assert!(reports[0].failures[0].message.contains("worker died"));
    }

    #[test]
    fn test_failure_does_not_stop_siblings() {
        let (_dir, config) = fixture::project("");
        let root = config.get_root();
        fixture::write(root, "src/css/style.css", "@import 'gone.css';");
        fixture::write(root, "src/index.html", "<p>hi</p>");

        let ok = run_logged(&build_plan(&config), &config);
        assert!(!ok);
        assert!(root.join("dist/index.html").exists());
    }
}
