use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::debouncer::{DEBOUNCE_MS, Debouncer, IDLE_POLL_MS, is_temp_file};
use super::router::classes_for_changes;
use super::types::ChangeKind;
use super::watch_roots::WatchRoots;
use crate::core::AssetClass;
use crate::task::fixture;

fn make_event(paths: Vec<&str>, kind: notify::EventKind) -> notify::Event {
    notify::Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn modify_kind() -> notify::EventKind {
    notify::EventKind::Modify(notify::event::ModifyKind::Data(
        notify::event::DataChange::Any,
    ))
}

fn create_kind() -> notify::EventKind {
    notify::EventKind::Create(notify::event::CreateKind::File)
}

fn remove_kind() -> notify::EventKind {
    notify::EventKind::Remove(notify::event::RemoveKind::File)
}

fn settled(debouncer: &mut Debouncer) {
    debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS + 10));
}

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_ready());
    assert_eq!(
        debouncer.sleep_duration(),
        Duration::from_millis(IDLE_POLL_MS)
    );
}

#[test]
fn test_event_routing_by_kind() {
    let mut debouncer = Debouncer::new();

    debouncer.add_event(&make_event(vec!["/tmp/a.css"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/b.css"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/c.css"], remove_kind()));

    assert_eq!(debouncer.changes.len(), 3);
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/b.css")],
        ChangeKind::Modified
    );
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/c.css")],
        ChangeKind::Removed
    );
}

#[test]
fn test_metadata_changes_ignored() {
    let mut debouncer = Debouncer::new();
    let kind = notify::EventKind::Modify(notify::event::ModifyKind::Metadata(
        notify::event::MetadataKind::WriteTime,
    ));
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], kind));
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_temp_files_ignored() {
    assert!(is_temp_file(&PathBuf::from("/src/.style.css.swp")));
    assert!(is_temp_file(&PathBuf::from("/src/index.html~")));
    assert!(is_temp_file(&PathBuf::from("/src/#index.html#")));
    assert!(is_temp_file(&PathBuf::from("/src/main.js.tmp")));
    assert!(!is_temp_file(&PathBuf::from("/src/main.js")));

    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/.swp"], modify_kind()));
    assert!(debouncer.last_event.is_none());
}

#[test]
fn test_quiet_period() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], modify_kind()));
    assert!(!debouncer.is_ready());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));

    settled(&mut debouncer);
    let events = debouncer.take_if_ready().unwrap();
    assert_eq!(events.len(), 1);
    assert!(debouncer.changes.is_empty());
    assert!(debouncer.take_if_ready().is_none());
}

#[test]
fn test_remove_then_create_restores() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], remove_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], create_kind()));
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/a.css")],
        ChangeKind::Created
    );
}

#[test]
fn test_create_then_remove_discards() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], create_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], remove_kind()));
    assert!(debouncer.changes.is_empty());
}

#[test]
fn test_modify_then_remove_upgrades() {
    let mut debouncer = Debouncer::new();
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], modify_kind()));
    debouncer.add_event(&make_event(vec!["/tmp/a.css"], remove_kind()));
    assert_eq!(
        debouncer.changes[&PathBuf::from("/tmp/a.css")],
        ChangeKind::Removed
    );
}

#[test]
fn test_changes_map_to_classes() {
    let (_dir, config) = fixture::project("");
    let root = config.get_root();
    let paths = vec![
        root.join("src/js/lib/util.js"),
        root.join("src/_header.html"),
        root.join("src/js/main.js"),
        root.join("README.md"),
    ];
    assert_eq!(
        classes_for_changes(&paths, &config),
        vec![AssetClass::Markup, AssetClass::Scripts]
    );
}

#[test]
fn test_unselected_stylesheet_variant_ignored() {
    let (_dir, config) = fixture::project("[build]\nstylesheet = \"scss\"\n");
    let root = config.get_root();
    let paths = vec![root.join("src/css/style.css"), root.join("src/scss/_vars.scss")];
    assert_eq!(classes_for_changes(&paths, &config), vec![AssetClass::Scss]);

    let (_dir, config) = fixture::project("");
    let root = config.get_root();
    let paths = vec![root.join("src/css/style.css"), root.join("src/scss/_vars.scss")];
    assert_eq!(classes_for_changes(&paths, &config), vec![AssetClass::Styles]);
}

#[test]
fn test_watch_roots_attach_when_present() {
    let (dir, _config) = fixture::project("");
    let present = dir.path().join("src");
    std::fs::create_dir_all(&present).unwrap();
    let later = dir.path().join("assets");

    let mut watcher = notify::recommended_watcher(|_: notify::Result<notify::Event>| {}).unwrap();
    let mut roots = WatchRoots::new(vec![present, later.clone()]);
    roots.attach_existing(&mut watcher).unwrap();
    assert_eq!(roots.attached_count(), 1);

    std::fs::create_dir_all(&later).unwrap();
    roots.maintain(&mut watcher);
    assert_eq!(roots.attached_count(), 2);
}
