//! Base adapter contract.
//!
//! Adapters are backend-specific implementations of filesystem primitives.
//! All operations take paths relative to the adapter's own root (leading
//! `/`); the mount table handles routing and prefix stripping. Adapters are
//! constructed once at mount time and outlive every [`Pathname`] derived
//! from them.
//!
//! [`Pathname`]: crate::path::Pathname

use std::sync::Arc;

use crate::capability::{DiskSpaceCapability, HashCapability, LinkCapability, MimeCapability};
use crate::error::FsResult;
use crate::types::{DirEntry, FileAttr};

/// Core adapter operations plus capability discovery.
pub trait Adapter: Send + Sync {
    /// Get stat metadata for a path. Fails with `NotFound` if absent.
    fn stat(&self, local: &str) -> FsResult<FileAttr>;

    /// Read entire file contents.
    fn read(&self, local: &str) -> FsResult<Vec<u8>>;

    /// Replace file contents, creating the file (and missing parents) if
    /// needed. Returns the number of bytes written.
    fn write(&self, local: &str, data: &[u8]) -> FsResult<u64>;

    /// List directory entries.
    fn list_dir(&self, local: &str) -> FsResult<Vec<DirEntry>>;

    /// Create a directory (and missing parents).
    fn create_dir(&self, local: &str) -> FsResult<()>;

    /// Remove a file.
    fn delete_file(&self, local: &str) -> FsResult<()>;

    /// Remove an empty directory.
    fn delete_dir(&self, local: &str) -> FsResult<()>;

    /// Whether this adapter accepts mutations.
    fn writable(&self) -> bool {
        true
    }

    /// Check if a path exists. Idempotent probe; never an error.
    fn exists(&self, local: &str) -> bool {
        self.stat(local).is_ok()
    }

    // ------------------------------------------------------------------
    // Capability discovery
    // ------------------------------------------------------------------

    /// Symbolic-link capability, if implemented.
    fn links(&self) -> Option<&dyn LinkCapability> {
        None
    }

    /// Native hashing capability, if implemented.
    fn hashes(&self) -> Option<&dyn HashCapability> {
        None
    }

    /// Native MIME detection capability, if implemented.
    fn mime(&self) -> Option<&dyn MimeCapability> {
        None
    }

    /// Disk-space reporting capability, if implemented.
    fn disk_space(&self) -> Option<&dyn DiskSpaceCapability> {
        None
    }

    // ------------------------------------------------------------------
    // Overlay delegation
    // ------------------------------------------------------------------

    /// For overlay adapters: hand back the backing adapter owning `local`
    /// together with the path relative to it. Plain backends return `None`.
    ///
    /// The resolver chases delegation so that capability checks always see
    /// the real backing adapter, never the overlay wrapper.
    fn delegate(&self, local: &str) -> FsResult<Option<(Arc<dyn Adapter>, String)>> {
        let _ = local;
        Ok(None)
    }
}
