//! Behavior of the notify-backed mappings watcher against a real
//! directory.

use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;
use uuid::Uuid;
use wirefleet::watcher::{FsMappingsWatcher, MappingsWatcher, ReloadEvent};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_millis(500);

fn write_mapping(dir: &Path, name: &str) {
    fs::write(dir.join(name), r#"{"request": {"method": "GET"}}"#).unwrap();
}

fn drain(rx: &mpsc::Receiver<ReloadEvent>) {
    while rx.recv_timeout(SILENCE_WINDOW).is_ok() {}
}

#[test]
fn test_delivers_mapping_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let mock_id = Uuid::new_v4();
    let _watcher = FsMappingsWatcher::subscribe(mock_id, dir.path(), tx).unwrap();

    write_mapping(dir.path(), "stub.json");

    let event = rx.recv_timeout(DELIVERY_TIMEOUT).unwrap();
    assert_eq!(event.mock_id, mock_id);
    assert_eq!(event.path.file_name().unwrap(), "stub.json");
}

#[test]
fn test_ignores_non_mapping_files() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let _watcher = FsMappingsWatcher::subscribe(Uuid::new_v4(), dir.path(), tx).unwrap();

    fs::write(dir.path().join("notes.txt"), "not a mapping").unwrap();

    assert!(rx.recv_timeout(SILENCE_WINDOW).is_err());
}

#[test]
fn test_disabled_watcher_is_silent_until_reenabled() {
    let dir = tempfile::tempdir().unwrap();
    let (tx, rx) = mpsc::channel();
    let mut watcher = FsMappingsWatcher::subscribe(Uuid::new_v4(), dir.path(), tx).unwrap();

    watcher.set_notifications_enabled(false);
    write_mapping(dir.path(), "while-disabled.json");
    assert!(rx.recv_timeout(SILENCE_WINDOW).is_err());

    watcher.set_notifications_enabled(true);
    drain(&rx);
    write_mapping(dir.path(), "after-reenable.json");

    let event = rx.recv_timeout(DELIVERY_TIMEOUT).unwrap();
    assert_eq!(event.path.file_name().unwrap(), "after-reenable.json");
}
