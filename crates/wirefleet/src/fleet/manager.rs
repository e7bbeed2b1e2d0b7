//! FleetManager - lifecycle management for mock-server instances.
//!
//! Owns two keyed collections (running servers, active watchers) indexed
//! by mock identity. At most one running server and at most one active
//! watcher exist per identity at any time, and stopping an instance
//! always releases both together.

use crate::config::{Mock, Proxy};
use crate::engine::{startup_args, EngineFactory, MockEngine, OutputSink, StartError};
use crate::watcher::MappingsWatcher;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

pub struct FleetManager {
    factory: Box<dyn EngineFactory>,
    // One lock for both maps: stop must update them together.
    state: Mutex<FleetState>,
}

#[derive(Default)]
struct FleetState {
    servers: HashMap<Uuid, Box<dyn MockEngine>>,
    watchers: HashMap<Uuid, Box<dyn MappingsWatcher>>,
}

impl FleetState {
    /// Tears down the server and watcher registered under `id`, if any.
    fn stop_instance(&mut self, id: &Uuid) {
        if let Some(mut server) = self.servers.remove(id) {
            server.stop();
            server.shutdown();
            info!(mock = %id, "mock server stopped");
        }
        if let Some(mut watcher) = self.watchers.remove(id) {
            watcher.set_notifications_enabled(false);
            debug!(mock = %id, "mappings watcher detached");
        }
    }
}

impl FleetManager {
    pub fn new(factory: Box<dyn EngineFactory>) -> Self {
        Self {
            factory,
            state: Mutex::new(FleetState::default()),
        }
    }

    /// Starts a mock server for `mock`, first fully stopping any
    /// instance already registered under the same identity.
    ///
    /// In record mode the engine proxies all traffic to the proxy's
    /// upstream and persists the observed exchanges as new mappings; in
    /// replay mode it serves the existing mappings only. Engine console
    /// output goes to `sink`. A handle that fails to start is never
    /// registered.
    pub fn play(
        &self,
        proxy: &Proxy,
        mock: &Mock,
        record: bool,
        sink: OutputSink,
    ) -> Result<(), StartError> {
        let mut state = self.state.lock();
        state.stop_instance(&mock.id);

        let args = startup_args(proxy, mock, record);
        let mut server = self.factory.create(sink);
        match server.start(&args) {
            Ok(()) => {
                info!(mock = %mock.id, port = proxy.proxy_port, record, "mock server started");
                state.servers.insert(mock.id, server);
                Ok(())
            }
            Err(err) => {
                server.shutdown();
                Err(err)
            }
        }
    }

    /// Stops the instance registered for `mock`, disabling and removing
    /// any watcher attached to the identity. No-op when absent.
    pub fn stop(&self, mock: &Mock) {
        self.state.lock().stop_instance(&mock.id);
    }

    /// Stops every registered instance and detaches every watcher.
    pub fn stop_all(&self) {
        let mut state = self.state.lock();
        let ids: Vec<Uuid> = state.servers.keys().copied().collect();
        for id in ids {
            state.stop_instance(&id);
        }
        // Watchers attached without a running server.
        for (_, mut watcher) in state.watchers.drain() {
            watcher.set_notifications_enabled(false);
        }
    }

    /// Live running state for `mock`. `None` and unknown identities
    /// report false. A registered handle whose underlying process died
    /// reports false while still occupying its slot.
    pub fn is_running(&self, mock: Option<&Mock>) -> bool {
        let Some(mock) = mock else { return false };
        let state = self.state.lock();
        state.servers.get(&mock.id).is_some_and(|s| s.is_running())
    }

    /// True iff at least one registered handle reports itself running.
    pub fn is_any_running(&self) -> bool {
        self.state.lock().servers.values().any(|s| s.is_running())
    }

    /// Registers `watcher` for `mock`, replacing any existing one. The
    /// replaced watcher's notifications are disabled before it is
    /// discarded so no stale events fire against the identity.
    pub fn add_watcher(&self, mock: &Mock, watcher: Box<dyn MappingsWatcher>) {
        let mut state = self.state.lock();
        if let Some(mut old) = state.watchers.remove(&mock.id) {
            old.set_notifications_enabled(false);
        }
        state.watchers.insert(mock.id, watcher);
        debug!(mock = %mock.id, "mappings watcher attached");
    }

    /// Number of registered server handles (running or not).
    pub fn running_count(&self) -> usize {
        self.state.lock().servers.len()
    }

    /// Number of attached watchers.
    pub fn watched_count(&self) -> usize {
        self.state.lock().watchers.len()
    }
}
