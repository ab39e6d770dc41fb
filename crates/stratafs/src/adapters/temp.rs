//! Temporary storage adapter.
//!
//! A [`LocalAdapter`] rooted in a fresh temporary directory. The backing
//! directory (and everything written into it) is removed when the adapter
//! is dropped.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use crate::adapter::Adapter;
use crate::capability::{DiskSpaceCapability, HashCapability, LinkCapability};
use crate::error::{FsError, FsResult};
use crate::types::{DirEntry, FileAttr};

use super::LocalAdapter;

/// Temporary adapter backed by a self-cleaning directory.
#[derive(Debug)]
pub struct TempAdapter {
    // Held for its Drop impl; the inner adapter points into it.
    _dir: TempDir,
    inner: LocalAdapter,
}

impl TempAdapter {
    /// Create a temporary adapter in the system temp location.
    pub fn new() -> FsResult<Self> {
        let dir = tempfile::tempdir()
            .map_err(|e| FsError::adapter_op("tempdir", "/", e))?;
        let inner = LocalAdapter::new(dir.path());
        Ok(Self { _dir: dir, inner })
    }

    /// The on-disk root of the temporary storage.
    pub fn root(&self) -> &Path {
        self.inner.root()
    }
}

impl Adapter for TempAdapter {
    fn stat(&self, local: &str) -> FsResult<FileAttr> {
        self.inner.stat(local)
    }

    fn read(&self, local: &str) -> FsResult<Vec<u8>> {
        self.inner.read(local)
    }

    fn write(&self, local: &str, data: &[u8]) -> FsResult<u64> {
        self.inner.write(local, data)
    }

    fn list_dir(&self, local: &str) -> FsResult<Vec<DirEntry>> {
        self.inner.list_dir(local)
    }

    fn create_dir(&self, local: &str) -> FsResult<()> {
        self.inner.create_dir(local)
    }

    fn delete_file(&self, local: &str) -> FsResult<()> {
        self.inner.delete_file(local)
    }

    fn delete_dir(&self, local: &str) -> FsResult<()> {
        self.inner.delete_dir(local)
    }

    fn writable(&self) -> bool {
        self.inner.writable()
    }

    fn links(&self) -> Option<&dyn LinkCapability> {
        self.inner.links()
    }

    fn hashes(&self) -> Option<&dyn HashCapability> {
        self.inner.hashes()
    }

    fn disk_space(&self) -> Option<&dyn DiskSpaceCapability> {
        self.inner.disk_space()
    }

    fn delegate(&self, _local: &str) -> FsResult<Option<(Arc<dyn Adapter>, String)>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let adapter = TempAdapter::new().unwrap();
        adapter.write("/scratch.txt", b"ephemeral").unwrap();
        assert_eq!(adapter.read("/scratch.txt").unwrap(), b"ephemeral");
    }

    #[test]
    fn test_cleans_up_on_drop() {
        let adapter = TempAdapter::new().unwrap();
        let root = adapter.root().to_path_buf();
        adapter.write("/f", b"x").unwrap();
        assert!(root.exists());
        drop(adapter);
        assert!(!root.exists());
    }

    #[test]
    fn test_carries_local_capabilities() {
        let adapter = TempAdapter::new().unwrap();
        assert!(adapter.links().is_some());
        assert!(adapter.hashes().is_some());
        assert!(adapter.disk_space().is_some());
    }
}
