//! Identity value objects for proxies and mocks.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// An upstream target being mocked or recorded, plus the local port the
/// mock server for it listens on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    pub id: Uuid,
    pub name: String,
    /// Upstream base URL recorded traffic is forwarded to.
    pub original_url: String,
    /// Local TCP port the mock server listens on. Port uniqueness across
    /// running instances is the caller's responsibility.
    pub proxy_port: u16,
}

impl Proxy {
    pub fn new(name: impl Into<String>, original_url: impl Into<String>, proxy_port: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            original_url: original_url.into(),
            proxy_port,
        }
    }

    /// Stable relative path segment namespacing this proxy's mock folders.
    pub fn folder_name(&self) -> String {
        folder_segment(&self.name, "proxy", &self.id)
    }
}

/// One mock definition owned by a proxy. The `id` is the sole identity
/// used for fleet membership and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mock {
    pub id: Uuid,
    pub proxy_id: Uuid,
    pub name: String,
}

impl Mock {
    pub fn new(proxy: &Proxy, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            proxy_id: proxy.id,
            name: name.into(),
        }
    }

    /// Stable relative path segment for this mock under its proxy's folder.
    pub fn folder_name(&self) -> String {
        folder_segment(&self.name, "mock", &self.id)
    }
}

/// Root directory handed to the mock engine for one instance: the proxy
/// folder joined with the mock folder.
pub fn mappings_root(proxy: &Proxy, mock: &Mock) -> PathBuf {
    PathBuf::from(proxy.folder_name()).join(mock.folder_name())
}

/// Derives a filesystem-safe segment from a display name. Names that
/// sanitize to nothing fall back to the identity so the derivation stays
/// total and deterministic.
fn folder_segment(name: &str, kind: &str, id: &Uuid) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        let hex = id.simple().to_string();
        out = format!("{}-{}", kind, &hex[..8]);
    }
    out
}
