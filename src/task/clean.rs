//! `clear`: remove the output root.

use std::fs;

use crate::config::SiteConfig;

use super::TaskReport;

pub fn run(config: &SiteConfig) -> TaskReport {
    let mut report = TaskReport::new("clear");
    let target = config.registry.clean_dir();

    if config.get_root().starts_with(target) {
        report.fail(target, "refusing to remove the project root or one of its parents");
        return report;
    }
    let Ok(meta) = fs::symlink_metadata(target) else {
        return report;
    };
    // a symlinked output root is unlinked, its target is left alone
    let removed = if meta.is_dir() {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    };
    if let Err(e) = removed {
        report.fail(target, e.to_string());
    }
    report
}
