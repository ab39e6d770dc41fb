//! Declarative filesystem configuration.
//!
//! A TOML document describes the mount table and an adapter per mount, so
//! an embedding can assemble a composed filesystem without code:
//!
//! ```toml
//! default_plugins = true
//!
//! [[mounts]]
//! path = "/"
//! backend = { kind = "local", root = "/srv/data" }
//!
//! [[mounts]]
//! path = "/snapshots"
//! writable = false
//! backend = { kind = "local", root = "/srv/snapshots", read_only = true }
//!
//! [[mounts]]
//! path = "/scratch"
//! backend = { kind = "temp" }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::adapters::{LocalAdapter, MemoryAdapter, TempAdapter};
use crate::error::{FsError, FsResult};
use crate::filesystem::Filesystem;

/// Top-level filesystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// Mounts, in registration order. Later mounts at more specific paths
    /// shadow earlier ones.
    #[serde(default)]
    pub mounts: Vec<MountConfig>,

    /// Register the built-in plugins (hash, mime, link, disk-space).
    #[serde(default = "default_true")]
    pub default_plugins: bool,
}

/// One mount table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountConfig {
    /// Logical mount point, e.g. `/` or `/snapshots`.
    pub path: String,

    /// Whether write operations may route to this mount.
    #[serde(default = "default_true")]
    pub writable: bool,

    /// Adapter backing this mount.
    pub backend: BackendConfig,
}

/// Adapter selection for a mount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// On-disk storage rooted at a directory.
    Local {
        root: String,
        #[serde(default)]
        read_only: bool,
    },
    /// Ephemeral in-memory storage.
    Memory,
    /// On-disk storage in a self-cleaning temporary directory.
    Temp,
}

fn default_true() -> bool {
    true
}

impl FilesystemConfig {
    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(input: &str) -> FsResult<Self> {
        toml::from_str(input).map_err(|e| FsError::Config(e.to_string()))
    }
}

impl BackendConfig {
    /// Construct the configured adapter.
    pub fn build(&self) -> FsResult<Arc<dyn Adapter>> {
        Ok(match self {
            BackendConfig::Local { root, read_only } => {
                if *read_only {
                    Arc::new(LocalAdapter::read_only(root))
                } else {
                    Arc::new(LocalAdapter::new(root))
                }
            }
            BackendConfig::Memory => Arc::new(MemoryAdapter::new()),
            BackendConfig::Temp => Arc::new(TempAdapter::new()?),
        })
    }
}

impl Filesystem {
    /// Assemble a filesystem from a parsed configuration.
    pub fn from_config(config: &FilesystemConfig) -> FsResult<Self> {
        let fs = Filesystem::empty();
        for mount in &config.mounts {
            let adapter = mount.backend.build()?;
            let writable = mount.writable && adapter.writable();
            fs.mount(&mount.path, adapter, writable)?;
        }
        if config.default_plugins {
            fs.register_default_plugins();
        }
        Ok(fs)
    }

    /// Parse a TOML document and assemble the filesystem it describes.
    pub fn from_toml_str(input: &str) -> FsResult<Self> {
        Self::from_config(&FilesystemConfig::from_toml_str(input)?)
    }
}
