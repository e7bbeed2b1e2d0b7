//! wirefleet: fleet management for standalone mock-HTTP servers.
//!
//! Hosts a dynamic collection of independently running mock-server
//! instances, each bound to its own port, each optionally recording
//! from an upstream target, each optionally paired with a filesystem
//! watcher that reports mapping changes for reload.

pub mod config;
pub mod engine;
pub mod fleet;
pub mod watcher;

pub use config::{mappings_root, Mock, Proxy};
pub use engine::{startup_args, EngineFactory, MockEngine, OutputSink, StartError};
pub use fleet::FleetManager;
pub use watcher::{MappingsWatcher, ReloadEvent};
