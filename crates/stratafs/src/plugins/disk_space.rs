//! Disk space plugin.
//!
//! Capability-gated like the link plugin. Also available filesystem-scoped,
//! reporting the volume behind the logical root.

use std::any::Any;

use crate::error::FsResult;
use crate::file::File;
use crate::filesystem::Filesystem;
use crate::plugin::Plugin;

/// Registry name: `disk-space`.
pub struct DiskSpacePlugin;

impl Plugin for DiskSpacePlugin {
    fn name(&self) -> &str {
        "disk-space"
    }

    fn provides_file_plugin(&self, file: &File) -> bool {
        file.pathname()
            .map(|p| p.adapter().disk_space().is_some())
            .unwrap_or(false)
    }

    fn file_plugin(&self, file: &File) -> FsResult<Box<dyn Any + Send>> {
        Ok(Box::new(DiskSpaceFile { file: file.clone() }))
    }

    fn provides_filesystem_plugin(&self, filesystem: &Filesystem) -> bool {
        filesystem
            .resolve("/")
            .map(|p| p.adapter().disk_space().is_some())
            .unwrap_or(false)
    }

    fn filesystem_plugin(&self, filesystem: &Filesystem) -> FsResult<Box<dyn Any + Send>> {
        Ok(Box::new(DiskSpaceFilesystem {
            fs: filesystem.clone(),
        }))
    }
}

/// File-scoped disk space accessor.
pub struct DiskSpaceFile {
    file: File,
}

impl DiskSpaceFile {
    /// Total space of the volume holding the file.
    pub fn total_space(&self) -> FsResult<Option<u64>> {
        self.file.total_space()
    }

    /// Free space of the volume holding the file.
    pub fn free_space(&self) -> FsResult<Option<u64>> {
        self.file.free_space()
    }
}

/// Filesystem-scoped disk space accessor, bound to the logical root.
pub struct DiskSpaceFilesystem {
    fs: Filesystem,
}

impl DiskSpaceFilesystem {
    /// Total space of the volume behind the logical root.
    pub fn total_space(&self) -> FsResult<Option<u64>> {
        self.fs.root().total_space()
    }

    /// Free space of the volume behind the logical root.
    pub fn free_space(&self) -> FsResult<Option<u64>> {
        self.fs.root().free_space()
    }
}
