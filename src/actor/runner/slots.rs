use rustc_hash::FxHashSet;

use crate::core::AssetClass;

/// Run bookkeeping per asset class.
///
/// At most one run per class is in flight. A request that arrives while the
/// class is running marks it dirty; any number of such requests collapse into
/// a single follow-up run.
#[derive(Debug, Default)]
pub(super) struct SlotTable {
    running: FxHashSet<AssetClass>,
    dirty: FxHashSet<AssetClass>,
}

impl SlotTable {
    /// Returns `true` when the caller should start a run now.
    pub(super) fn request(&mut self, class: AssetClass) -> bool {
        if self.running.contains(&class) {
            self.dirty.insert(class);
            false
        } else {
            self.running.insert(class);
            true
        }
    }

    /// Returns `true` when the class must run again; it stays marked running.
    pub(super) fn finish(&mut self, class: AssetClass) -> bool {
        if self.dirty.remove(&class) {
            true
        } else {
            self.running.remove(&class);
            false
        }
    }

    pub(super) fn is_idle(&self) -> bool {
        self.running.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_class_starts_immediately() {
        let mut slots = SlotTable::default();
        assert!(slots.request(AssetClass::Markup));
        assert!(!slots.is_idle());
        assert!(!slots.finish(AssetClass::Markup));
        assert!(slots.is_idle());
    }

    #[test]
    fn test_requests_during_run_coalesce() {
        let mut slots = SlotTable::default();
        assert!(slots.request(AssetClass::Styles));
        assert!(!slots.request(AssetClass::Styles));
        assert!(!slots.request(AssetClass::Styles));
        assert!(!slots.request(AssetClass::Styles));

        // exactly one follow-up
        assert!(slots.finish(AssetClass::Styles));
        assert!(!slots.finish(AssetClass::Styles));
        assert!(slots.is_idle());
    }

    #[test]
    fn test_classes_are_independent() {
        let mut slots = SlotTable::default();
        assert!(slots.request(AssetClass::Scripts));
        assert!(slots.request(AssetClass::Images));
        assert!(!slots.request(AssetClass::Scripts));

        assert!(!slots.finish(AssetClass::Images));
        assert!(slots.finish(AssetClass::Scripts));
        assert!(!slots.is_idle());
    }
}
