//! Mock engine collaborator contracts.
//!
//! The fleet core drives the mock engine through the [`MockEngine`]
//! trait so it can be exercised against fakes without binding real
//! listeners. [`StandaloneEngine`] is the production implementation,
//! launching the engine binary as a child process.

mod args;
mod standalone;

pub use args::startup_args;
pub use standalone::{StandaloneEngine, StandaloneEngineFactory};

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;

/// Destination for engine console output. Shared between the hosting
/// application and the output pump threads.
pub type OutputSink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Wraps a writer into a sharable output sink.
pub fn sink_from<W: Write + Send + 'static>(writer: W) -> OutputSink {
    Arc::new(Mutex::new(Box::new(writer)))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("Port {0} is already in use")]
    PortInUse(u16),
    #[error("Invalid root directory: {0}")]
    InvalidRootDir(String),
    #[error("Failed to launch mock engine: {0}")]
    Launch(String),
}

/// Control surface over one running mock server instance.
///
/// A handle is started at most once; the fleet manager discards a handle
/// rather than restarting it.
pub trait MockEngine: Send {
    /// Launches the server with the given argument list.
    fn start(&mut self, args: &[String]) -> Result<(), StartError>;

    /// Signals the server to stop serving. Best-effort; must not fail
    /// once `start` has succeeded.
    fn stop(&mut self);

    /// Releases remaining resources. Called unconditionally after `stop`
    /// during teardown.
    fn shutdown(&mut self);

    /// Current liveness. Safe to call at any point in the handle's life;
    /// reports false before `start` and after `shutdown`.
    fn is_running(&self) -> bool;
}

/// Creates one engine handle per play, wired to the caller's sink.
pub trait EngineFactory: Send + Sync {
    fn create(&self, sink: OutputSink) -> Box<dyn MockEngine>;
}
