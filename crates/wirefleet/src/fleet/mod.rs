//! Fleet management for mock-server instances.
//!
//! The fleet manager owns the set of currently running mock servers and
//! their associated mappings watchers, keyed by mock identity.

mod manager;

pub use manager::FleetManager;
