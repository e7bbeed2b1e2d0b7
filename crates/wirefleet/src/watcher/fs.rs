//! notify-backed mappings watcher.

use super::{MappingsWatcher, ReloadEvent};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Watches a mock's mappings root recursively and forwards change events
/// for mapping files while notifications are enabled.
pub struct FsMappingsWatcher {
    enabled: Arc<AtomicBool>,
    // Keeps the OS subscription alive for the watcher's lifetime.
    _watcher: RecommendedWatcher,
}

impl FsMappingsWatcher {
    pub fn subscribe(
        mock_id: Uuid,
        root: &Path,
        events: Sender<ReloadEvent>,
    ) -> Result<Self, notify::Error> {
        let enabled = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&enabled);
        let mut watcher = recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if !flag.load(Ordering::SeqCst) {
                    return;
                }
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                for path in event.paths {
                    if is_mapping_file(&path) {
                        let _ = events.send(ReloadEvent { mock_id, path });
                    }
                }
            }
            Err(err) => warn!(?err, "mappings watcher error"),
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self {
            enabled,
            _watcher: watcher,
        })
    }
}

fn is_mapping_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

impl MappingsWatcher for FsMappingsWatcher {
    fn set_notifications_enabled(&mut self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}
