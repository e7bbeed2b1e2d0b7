//! Configuration types for the wirefleet host.
//!
//! `model` holds the identity value objects consumed by the fleet core;
//! the types here describe the YAML fleet file the CLI loads.

mod model;

pub use model::{mappings_root, Mock, Proxy};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Top-level fleet configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FleetConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub proxies: Vec<ProxyConfig>,
}

/// Where the standalone mock engine lives and where instance mapping
/// roots are created.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Path to the standalone mock engine binary.
    pub binary: PathBuf,
    /// Directory the per-instance mapping roots live under. The engine
    /// runs with this as its working directory.
    #[serde(default = "default_mappings_dir")]
    pub mappings_dir: PathBuf,
}

fn default_mappings_dir() -> PathBuf {
    PathBuf::from("mocks")
}

/// One upstream target and the mocks defined for it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProxyConfig {
    pub name: String,
    pub original_url: String,
    pub proxy_port: u16,
    #[serde(default)]
    pub mocks: Vec<MockConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MockConfig {
    pub name: String,
}

impl FleetConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: FleetConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let mut ports: HashMap<u16, &str> = HashMap::new();
        for proxy in &self.proxies {
            if proxy.original_url.is_empty() {
                anyhow::bail!("Proxy '{}' has an empty original_url", proxy.name);
            }
            if proxy.mocks.is_empty() {
                anyhow::bail!("Proxy '{}' defines no mocks", proxy.name);
            }
            if let Some(other) = ports.insert(proxy.proxy_port, &proxy.name) {
                anyhow::bail!(
                    "Proxies '{}' and '{}' both declare port {}",
                    other,
                    proxy.name,
                    proxy.proxy_port
                );
            }
        }
        Ok(())
    }
}

impl ProxyConfig {
    /// Mints a fresh identity for this proxy definition.
    pub fn to_proxy(&self) -> Proxy {
        Proxy::new(&self.name, &self.original_url, self.proxy_port)
    }
}
