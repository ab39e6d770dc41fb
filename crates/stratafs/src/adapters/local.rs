//! Local filesystem adapter.
//!
//! All operations are relative to `root`; escape via `..` is rejected by
//! logical normalization, and symlink traversal out of the root is caught
//! by canonicalization.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use stratafs_digest::{HashAlgorithm, Hasher};

use crate::adapter::Adapter;
use crate::capability::{DiskSpaceCapability, HashCapability, LinkCapability};
use crate::error::{FsError, FsResult};
use crate::path;
use crate::types::{DirEntry, FileAttr, FileType};

/// Local filesystem adapter rooted at a directory.
///
/// If `root` is `/srv/project`, then `read("/src/main.rs")` reads
/// `/srv/project/src/main.rs`.
#[derive(Debug, Clone)]
pub struct LocalAdapter {
    root: PathBuf,
    read_only: bool,
}

impl LocalAdapter {
    /// Create a local adapter rooted at the given path.
    ///
    /// The root is canonicalized at construction time to handle symlinks
    /// (e.g. macOS `/tmp` → `/private/tmp`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let root = root.canonicalize().unwrap_or(root);
        Self {
            root,
            read_only: false,
        }
    }

    /// Create a read-only local adapter.
    pub fn read_only(root: impl Into<PathBuf>) -> Self {
        let mut adapter = Self::new(root);
        adapter.read_only = true;
        adapter
    }

    /// Set whether this adapter rejects mutations.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// The adapter's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a normalized local path onto the real filesystem, without
    /// following the leaf.
    fn locate(&self, local: &str) -> FsResult<PathBuf> {
        let local = path::normalize(local)?;
        let rel = local.trim_start_matches('/');
        if rel.is_empty() {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(rel))
    }

    /// Like [`Self::locate`], but additionally verifies that symlink
    /// traversal has not escaped the root.
    fn resolve(&self, local: &str) -> FsResult<PathBuf> {
        let full = self.locate(local)?;
        let checked = if full.exists() {
            full.canonicalize()
                .map_err(|e| FsError::from_io("resolve", local, e))?
        } else {
            match full.parent() {
                Some(parent) if parent.exists() => {
                    let file_name = full
                        .file_name()
                        .ok_or_else(|| FsError::invalid_path(local))?;
                    parent
                        .canonicalize()
                        .map_err(|e| FsError::from_io("resolve", local, e))?
                        .join(file_name)
                }
                // Missing parents fail on the actual operation.
                _ => return Ok(full),
            }
        };
        if !checked.starts_with(&self.root) {
            return Err(FsError::invalid_path(local));
        }
        Ok(checked)
    }

    fn check_writable(&self, local: &str) -> FsResult<()> {
        if self.read_only {
            Err(FsError::read_only(local))
        } else {
            Ok(())
        }
    }

    fn metadata_to_attr(meta: &fs::Metadata) -> FileAttr {
        let kind = if meta.is_dir() {
            FileType::Directory
        } else if meta.file_type().is_symlink() {
            FileType::Symlink
        } else {
            FileType::File
        };

        #[cfg(unix)]
        let (mode, uid, gid) = {
            use std::os::unix::fs::{MetadataExt, PermissionsExt};
            (
                meta.permissions().mode(),
                Some(meta.uid()),
                Some(meta.gid()),
            )
        };
        #[cfg(not(unix))]
        let (mode, uid, gid) = (if meta.permissions().readonly() { 0o444 } else { 0o644 }, None, None);

        FileAttr {
            size: meta.len(),
            kind,
            mode,
            mtime: meta.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH),
            atime: meta.accessed().ok(),
            ctime: meta.created().ok(),
            uid,
            gid,
        }
    }
}

impl Adapter for LocalAdapter {
    fn stat(&self, local: &str) -> FsResult<FileAttr> {
        let full = self.locate(local)?;
        let meta = fs::symlink_metadata(&full).map_err(|e| FsError::from_io("stat", local, e))?;
        Ok(Self::metadata_to_attr(&meta))
    }

    fn read(&self, local: &str) -> FsResult<Vec<u8>> {
        let full = self.resolve(local)?;
        if full.is_dir() {
            return Err(FsError::not_a_file(local));
        }
        fs::read(&full).map_err(|e| FsError::from_io("read", local, e))
    }

    fn write(&self, local: &str, data: &[u8]) -> FsResult<u64> {
        self.check_writable(local)?;
        let full = self.resolve(local)?;
        if full.is_dir() {
            return Err(FsError::not_a_file(local));
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| FsError::from_io("write", local, e))?;
        }
        fs::write(&full, data).map_err(|e| FsError::from_io("write", local, e))?;
        Ok(data.len() as u64)
    }

    fn list_dir(&self, local: &str) -> FsResult<Vec<DirEntry>> {
        let full = self.resolve(local)?;
        let mut entries = Vec::new();
        let dir = fs::read_dir(&full).map_err(|e| FsError::from_io("list_dir", local, e))?;
        for entry in dir {
            let entry = entry.map_err(|e| FsError::from_io("list_dir", local, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| FsError::from_io("list_dir", local, e))?;
            let kind = if file_type.is_dir() {
                FileType::Directory
            } else if file_type.is_symlink() {
                FileType::Symlink
            } else {
                FileType::File
            };
            entries.push(DirEntry::new(entry.file_name().to_string_lossy(), kind));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_dir(&self, local: &str) -> FsResult<()> {
        self.check_writable(local)?;
        let full = self.resolve(local)?;
        fs::create_dir_all(&full).map_err(|e| FsError::from_io("create_dir", local, e))
    }

    fn delete_file(&self, local: &str) -> FsResult<()> {
        self.check_writable(local)?;
        let full = self.locate(local)?;
        let meta = fs::symlink_metadata(&full)
            .map_err(|e| FsError::from_io("delete_file", local, e))?;
        if meta.is_dir() {
            return Err(FsError::not_a_file(local));
        }
        fs::remove_file(&full).map_err(|e| FsError::from_io("delete_file", local, e))
    }

    fn delete_dir(&self, local: &str) -> FsResult<()> {
        self.check_writable(local)?;
        let full = self.resolve(local)?;
        if full == self.root {
            return Err(FsError::adapter_op(
                "delete_dir",
                local,
                "cannot remove adapter root",
            ));
        }
        fs::remove_dir(&full).map_err(|e| FsError::from_io("delete_dir", local, e))
    }

    fn writable(&self) -> bool {
        !self.read_only
    }

    fn links(&self) -> Option<&dyn LinkCapability> {
        Some(self)
    }

    fn hashes(&self) -> Option<&dyn HashCapability> {
        Some(self)
    }

    fn disk_space(&self) -> Option<&dyn DiskSpaceCapability> {
        Some(self)
    }
}

impl LinkCapability for LocalAdapter {
    fn is_link(&self, local: &str) -> FsResult<bool> {
        let full = self.locate(local)?;
        match fs::symlink_metadata(&full) {
            Ok(meta) => Ok(meta.file_type().is_symlink()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FsError::from_io("is_link", local, e)),
        }
    }

    fn link_target(&self, local: &str) -> FsResult<Option<String>> {
        let full = self.locate(local)?;
        match fs::read_link(&full) {
            Ok(target) => Ok(Some(target.to_string_lossy().into_owned())),
            // Not a symlink (or missing): no target, not an error.
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::InvalidInput | io::ErrorKind::NotFound
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(FsError::from_io("link_target", local, e)),
        }
    }
}

impl HashCapability for LocalAdapter {
    /// Streams file content into the digest, so large files never sit in
    /// memory whole.
    fn hash(&self, local: &str, algorithm: HashAlgorithm) -> FsResult<Vec<u8>> {
        let full = self.resolve(local)?;
        if full.is_dir() {
            return Err(FsError::not_a_file(local));
        }
        let mut file = fs::File::open(&full).map_err(|e| FsError::from_io("hash", local, e))?;
        let mut hasher = Hasher::new(algorithm);
        io::copy(&mut file, &mut hasher).map_err(|e| FsError::from_io("hash", local, e))?;
        Ok(hasher.finalize())
    }
}

impl DiskSpaceCapability for LocalAdapter {
    fn total_space(&self, local: &str) -> FsResult<Option<u64>> {
        #[cfg(unix)]
        {
            let full = self.resolve(local)?;
            let anchor = if full.exists() { full } else { self.root.clone() };
            let stat = rustix::fs::statvfs(&anchor)
                .map_err(|e| FsError::adapter_op("total_space", local, e.to_string()))?;
            Ok(Some(stat.f_blocks * stat.f_frsize))
        }
        #[cfg(not(unix))]
        {
            let _ = local;
            Ok(None)
        }
    }

    fn free_space(&self, local: &str) -> FsResult<Option<u64>> {
        #[cfg(unix)]
        {
            let full = self.resolve(local)?;
            let anchor = if full.exists() { full } else { self.root.clone() };
            let stat = rustix::fs::statvfs(&anchor)
                .map_err(|e| FsError::adapter_op("free_space", local, e.to_string()))?;
            Ok(Some(stat.f_bavail * stat.f_frsize))
        }
        #[cfg(not(unix))]
        {
            let _ = local;
            Ok(None)
        }
    }
}
