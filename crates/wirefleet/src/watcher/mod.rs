//! Filesystem watcher collaborator contract.
//!
//! The fleet core only tracks watcher lifetimes; what a change event
//! means (typically a mappings reload) is the hosting application's
//! business.

mod fs;

pub use fs::FsMappingsWatcher;

use std::path::PathBuf;
use uuid::Uuid;

/// A mapping-file change observed for a tracked mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadEvent {
    pub mock_id: Uuid,
    pub path: PathBuf,
}

/// Control surface over one filesystem-change subscription.
pub trait MappingsWatcher: Send {
    /// Toggles event delivery without destroying the subscription. The
    /// fleet manager disables a watcher immediately before discarding it
    /// so no callback fires against an identity no longer tracked.
    fn set_notifications_enabled(&mut self, enabled: bool);
}
