//! Core metadata types.
//!
//! Serde-friendly, path-based types shared by every adapter.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// File type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        matches!(self, FileType::Symlink)
    }
}

/// File attributes (stat metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttr {
    /// Size in bytes.
    pub size: u64,
    /// File type.
    pub kind: FileType,
    /// Unix permissions (e.g., 0o644).
    pub mode: u32,
    /// Last modification time.
    pub mtime: SystemTime,
    /// Last access time (optional).
    pub atime: Option<SystemTime>,
    /// Creation time (optional).
    pub ctime: Option<SystemTime>,
    /// Owning user ID (optional, local backends).
    pub uid: Option<u32>,
    /// Owning group ID (optional, local backends).
    pub gid: Option<u32>,
}

impl FileAttr {
    /// Attributes for a fresh file.
    pub fn file(size: u64, mode: u32) -> Self {
        let now = SystemTime::now();
        Self {
            size,
            kind: FileType::File,
            mode,
            mtime: now,
            atime: Some(now),
            ctime: Some(now),
            uid: None,
            gid: None,
        }
    }

    /// Attributes for a fresh directory.
    pub fn directory(mode: u32) -> Self {
        let now = SystemTime::now();
        Self {
            size: 0,
            kind: FileType::Directory,
            mode,
            mtime: now,
            atime: Some(now),
            ctime: Some(now),
            uid: None,
            gid: None,
        }
    }

    /// Attributes for a symlink.
    pub fn symlink(target_len: u64) -> Self {
        let now = SystemTime::now();
        Self {
            size: target_len,
            kind: FileType::Symlink,
            mode: 0o777,
            mtime: now,
            atime: Some(now),
            ctime: Some(now),
            uid: None,
            gid: None,
        }
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Returns true if this is a symbolic link.
    pub fn is_symlink(&self) -> bool {
        self.kind.is_symlink()
    }
}

/// Directory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
}

impl DirEntry {
    /// Create a new directory entry.
    pub fn new(name: impl Into<String>, kind: FileType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, FileType::File)
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, FileType::Directory)
    }
}
