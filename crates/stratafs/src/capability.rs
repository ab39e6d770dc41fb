//! Optional adapter capability contracts.
//!
//! Capabilities are strictly additive over the base [`Adapter`] contract: a
//! backend opts in by implementing a trait and returning itself from the
//! matching accessor (`links()`, `hashes()`, ...). Callers discover support
//! at runtime through those accessors instead of downcasting.
//!
//! [`Adapter`]: crate::adapter::Adapter

use stratafs_digest::HashAlgorithm;

use crate::error::FsResult;

/// Symbolic-link awareness.
pub trait LinkCapability: Send + Sync {
    /// Whether the entry at `local` is a symbolic link. Missing paths report
    /// `false` (idempotent probe, not an error).
    fn is_link(&self, local: &str) -> FsResult<bool>;

    /// Link target, or `None` when the entry is not a link.
    fn link_target(&self, local: &str) -> FsResult<Option<String>>;
}

/// Backend-native content hashing (e.g. server-side digests), used by the
/// hash plugin in preference to reading the whole file through the core.
pub trait HashCapability: Send + Sync {
    /// Raw digest of the file content at `local`.
    fn hash(&self, local: &str, algorithm: HashAlgorithm) -> FsResult<Vec<u8>>;
}

/// Backend-native MIME detection.
pub trait MimeCapability: Send + Sync {
    /// Full MIME name including parameters (e.g. "text/plain; charset=us-ascii").
    fn mime_name(&self, local: &str) -> FsResult<String>;

    /// MIME type (e.g. "image/png").
    fn mime_type(&self, local: &str) -> FsResult<String>;

    /// Content transfer encoding (e.g. "us-ascii", "binary").
    fn mime_encoding(&self, local: &str) -> FsResult<String>;
}

/// Storage-space reporting. `None` means the backend cannot tell, which is
/// not an error.
pub trait DiskSpaceCapability: Send + Sync {
    /// Total space in bytes of the volume holding `local`.
    fn total_space(&self, local: &str) -> FsResult<Option<u64>>;

    /// Free space in bytes of the volume holding `local`.
    fn free_space(&self, local: &str) -> FsResult<Option<u64>>;
}
