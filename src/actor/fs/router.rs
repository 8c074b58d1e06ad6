use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::config::SiteConfig;
use crate::core::AssetClass;

pub(super) fn log_events(events: &FxHashMap<PathBuf, ChangeKind>) {
    for (path, kind) in events {
        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
    }
}

/// Classes to rebuild for a batch of changed paths, in [`AssetClass::ALL`]
/// order. The stylesheet variant that is not selected never runs.
pub(super) fn classes_for_changes<'a>(
    paths: impl IntoIterator<Item = &'a PathBuf>,
    config: &SiteConfig,
) -> Vec<AssetClass> {
    let selected = config.build.stylesheet.class();
    let mut classes: Vec<AssetClass> = paths
        .into_iter()
        .flat_map(|path| config.registry.classes_for(path))
        .filter(|class| !class.is_stylesheet() || *class == selected)
        .collect();
    classes.sort();
    classes.dedup();
    classes
}
