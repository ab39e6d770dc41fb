//! Filesystem facade: mount table + plugin registry behind one handle.

use std::any::Any;
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::error::{FsError, FsResult};
use crate::file::File;
use crate::mount::{MountInfo, MountTable};
use crate::path::{self, Pathname};
use crate::plugin::{Plugin, PluginRegistry};
use crate::plugins::{DiskSpacePlugin, HashPlugin, LinkPlugin, MimePlugin};
use crate::types::FileAttr;

struct FsInner {
    table: MountTable,
    plugins: PluginRegistry,
}

/// Cheaply cloneable handle to a composed virtual filesystem.
///
/// Clones share the same mount table and plugin registry; a mount added
/// through one handle is visible through all of them.
#[derive(Clone)]
pub struct Filesystem {
    inner: Arc<FsInner>,
}

impl std::fmt::Debug for Filesystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filesystem")
            .field("mounts", &self.inner.table)
            .field("plugins", &self.inner.plugins)
            .finish()
    }
}

impl Filesystem {
    /// Create a filesystem with a single adapter mounted at `/`.
    ///
    /// The root mount is writable iff the adapter reports itself writable.
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        let fs = Self::empty();
        let writable = adapter.writable();
        // "/" always normalizes, so the mount cannot fail.
        fs.inner
            .table
            .mount("/", adapter, writable)
            .unwrap_or_else(|_| unreachable!("root mount point is always valid"));
        fs
    }

    /// Create a filesystem with no mounts.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(FsInner {
                table: MountTable::new(),
                plugins: PluginRegistry::new(),
            }),
        }
    }

    /// Create a filesystem with the built-in plugins registered.
    pub fn with_default_plugins(adapter: Arc<dyn Adapter>) -> Self {
        let fs = Self::new(adapter);
        fs.register_default_plugins();
        fs
    }

    /// Register the built-in hash, mime, link and disk-space plugins.
    pub fn register_default_plugins(&self) {
        self.register_plugin(Arc::new(HashPlugin));
        self.register_plugin(Arc::new(MimePlugin));
        self.register_plugin(Arc::new(LinkPlugin));
        self.register_plugin(Arc::new(DiskSpacePlugin));
    }

    // ------------------------------------------------------------------
    // Mounts
    // ------------------------------------------------------------------

    /// Mount an adapter at a logical point (see [`MountTable::mount`]).
    pub fn mount(&self, point: &str, adapter: Arc<dyn Adapter>, writable: bool) -> FsResult<()> {
        self.inner.table.mount(point, adapter, writable)
    }

    /// Remove the mount at the given point, returning whether one existed.
    pub fn unmount(&self, point: &str) -> FsResult<bool> {
        self.inner.table.unmount(point)
    }

    /// Describe all current mounts.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.inner.table.mounts()
    }

    /// Resolve a logical path for reading.
    pub fn resolve(&self, logical: &str) -> FsResult<Pathname> {
        self.inner.table.resolve(logical)
    }

    /// Resolve a logical path for writing.
    pub fn resolve_for_write(&self, logical: &str) -> FsResult<Pathname> {
        self.inner.table.resolve_for_write(logical)
    }

    // ------------------------------------------------------------------
    // Handles
    // ------------------------------------------------------------------

    /// Handle to the logical root directory.
    pub fn root(&self) -> File {
        File::new(self.clone(), "/".to_string())
    }

    /// Handle to a logical path. Normalizes eagerly so malformed paths
    /// fail here rather than on first use.
    pub fn file(&self, logical: &str) -> FsResult<File> {
        let full = path::normalize(logical)?;
        Ok(File::new(self.clone(), full))
    }

    pub(crate) fn same_facade(&self, other: &Filesystem) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ------------------------------------------------------------------
    // Path-level operations
    // ------------------------------------------------------------------

    /// Stat metadata of a logical path.
    pub fn stat(&self, logical: &str) -> FsResult<FileAttr> {
        let p = self.resolve(logical)?;
        p.adapter().stat(p.local_path())
    }

    /// Read the full content of a logical path.
    pub fn read(&self, logical: &str) -> FsResult<Vec<u8>> {
        let p = self.resolve(logical)?;
        p.adapter().read(p.local_path())
    }

    /// Write the full content of a logical path, returning bytes written.
    pub fn write(&self, logical: &str, data: &[u8]) -> FsResult<u64> {
        let p = self.resolve_for_write(logical)?;
        p.adapter().write(p.local_path(), data)
    }

    /// Create a directory (and missing parents) at a logical path.
    pub fn create_dir(&self, logical: &str) -> FsResult<()> {
        let p = self.resolve_for_write(logical)?;
        p.adapter().create_dir(p.local_path())
    }

    /// Delete the file at a logical path.
    pub fn delete_file(&self, logical: &str) -> FsResult<()> {
        let p = self.resolve_for_write(logical)?;
        p.adapter().delete_file(p.local_path())
    }

    /// Delete the empty directory at a logical path.
    pub fn delete_dir(&self, logical: &str) -> FsResult<()> {
        let p = self.resolve_for_write(logical)?;
        p.adapter().delete_dir(p.local_path())
    }

    /// Merged listing of a logical directory, as handles.
    pub fn list_dir(&self, logical: &str) -> FsResult<Vec<File>> {
        let full = path::normalize(logical)?;
        let entries = self.inner.table.list_merged(&full)?;
        Ok(entries
            .into_iter()
            .map(|e| File::new(self.clone(), path::join(&full, &e.name)))
            .collect())
    }

    // ------------------------------------------------------------------
    // Plugins
    // ------------------------------------------------------------------

    /// Register a plugin under its own name, replacing any previous plugin
    /// of the same name.
    pub fn register_plugin(&self, plugin: Arc<dyn Plugin>) -> Option<Arc<dyn Plugin>> {
        self.inner.plugins.register(plugin)
    }

    /// Remove a plugin by name.
    pub fn unregister_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.inner.plugins.unregister(name)
    }

    /// Registered plugin names, in registration order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.inner.plugins.names()
    }

    /// Probe-then-construct dispatch of a file-scoped plugin, downcast to
    /// its concrete accessor type.
    pub fn file_plugin<T: Any>(&self, name: &str, file: &File) -> FsResult<Box<T>> {
        let plugin = self
            .inner
            .plugins
            .get(name)
            .ok_or_else(|| FsError::plugin_not_registered(name))?;
        if !plugin.provides_file_plugin(file) {
            return Err(FsError::unsupported_plugin(name, file.path()));
        }
        plugin
            .file_plugin(file)?
            .downcast::<T>()
            .map_err(|_| FsError::unsupported_plugin(name, file.path()))
    }

    /// Probe-then-construct dispatch of a filesystem-scoped plugin.
    pub fn filesystem_plugin<T: Any>(&self, name: &str) -> FsResult<Box<T>> {
        let plugin = self
            .inner
            .plugins
            .get(name)
            .ok_or_else(|| FsError::plugin_not_registered(name))?;
        if !plugin.provides_filesystem_plugin(self) {
            return Err(FsError::unsupported_plugin(name, "/"));
        }
        plugin
            .filesystem_plugin(self)?
            .downcast::<T>()
            .map_err(|_| FsError::unsupported_plugin(name, "/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryAdapter;

    fn mem_fs() -> Filesystem {
        Filesystem::new(Arc::new(MemoryAdapter::new()))
    }

    #[test]
    fn test_facade_crud() {
        let fs = mem_fs();
        fs.write("/docs/readme.md", b"hello").unwrap();
        assert_eq!(fs.read("/docs/readme.md").unwrap(), b"hello");
        assert!(fs.stat("/docs").unwrap().is_dir());

        fs.delete_file("/docs/readme.md").unwrap();
        assert!(matches!(
            fs.read("/docs/readme.md"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_clones_share_state() {
        let fs = mem_fs();
        let other = fs.clone();
        other.mount("/extra", Arc::new(MemoryAdapter::new()), true).unwrap();
        assert_eq!(fs.mounts().len(), 2);
    }

    #[test]
    fn test_root_mount_inherits_writability() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("frozen.txt"), b"x").unwrap();
        let fs = Filesystem::new(Arc::new(crate::adapters::LocalAdapter::read_only(dir.path())));
        assert_eq!(fs.read("/frozen.txt").unwrap(), b"x");
        assert!(matches!(
            fs.write("/frozen.txt", b"y"),
            Err(FsError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_file_handles_survive_mount_changes() {
        let fs = mem_fs();
        let handle = fs.file("/late/file.txt").unwrap();
        assert!(!handle.exists());

        let extra = MemoryAdapter::new();
        extra.write("/file.txt", b"now").unwrap();
        fs.mount("/late", Arc::new(extra), true).unwrap();
        assert_eq!(handle.read().unwrap(), b"now");
    }

    #[test]
    fn test_unregistered_plugin_is_an_error() {
        let fs = mem_fs();
        fs.write("/a.txt", b"x").unwrap();
        let file = fs.file("/a.txt").unwrap();
        assert!(matches!(
            file.plugin::<()>("nope"),
            Err(FsError::PluginNotRegistered { .. })
        ));
    }

    #[test]
    fn test_list_dir_returns_handles() {
        let fs = mem_fs();
        fs.write("/d/one.txt", b"1").unwrap();
        fs.write("/d/two.txt", b"2").unwrap();

        let mut paths: Vec<String> = fs
            .list_dir("/d")
            .unwrap()
            .iter()
            .map(|f| f.path().to_string())
            .collect();
        paths.sort();
        assert_eq!(paths, vec!["/d/one.txt", "/d/two.txt"]);
    }
}
