//! One-shot commands: `build`, `clear` and the single-task commands.
//!
//! Both return whether every task succeeded so `main` can pick the exit
//! status; per-file failures are already logged by then.

use std::time::Instant;

use crate::{
    config::SiteConfig,
    log,
    orchestrator::{build_plan, run_logged},
    task::Task,
};

/// Clean, then run every task of the selected stylesheet variant.
pub fn build(config: &SiteConfig) -> bool {
    let started = Instant::now();
    let plan = build_plan(config);
    log!("build"; "{} build: {}", config.mode().label(), plan.describe());

    let ok = run_logged(&plan, config);
    if ok {
        log!("build"; "done in {:.2?}", started.elapsed());
    }
    ok
}

/// Run a single task.
pub fn run_task(task: Task, config: &SiteConfig) -> bool {
    if let Task::Asset(class) = task
        && let Some(entry) = config.registry.get(class)
    {
        crate::debug!("build"; "{}: {}", class, entry.sources.patterns().join(" "));
    }
    let report = task.run(config);
    report.log(config.get_root());
    report.is_ok()
}
