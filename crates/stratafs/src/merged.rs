//! Merged (overlay) adapter.
//!
//! A [`MergedAdapter`] is an adapter backed by its own mount table, so an
//! overlay can be mounted anywhere another adapter can, including inside
//! another overlay. Single-target operations route through the inner table;
//! listings union the inner mounts with shadowing.
//!
//! The adapter exposes [`Adapter::delegate`], which the resolver chases so
//! capability checks land on the real backing adapter rather than this
//! wrapper.

use std::sync::Arc;

use crate::adapter::Adapter;
use crate::error::FsResult;
use crate::mount::{MountInfo, MountTable};
use crate::types::{DirEntry, FileAttr};

/// An adapter that composes other adapters through an inner mount table.
#[derive(Debug, Default)]
pub struct MergedAdapter {
    table: MountTable,
}

impl MergedAdapter {
    /// Create an empty overlay.
    pub fn new() -> Self {
        Self {
            table: MountTable::new(),
        }
    }

    /// Mount an adapter inside the overlay.
    pub fn mount(
        &self,
        point: &str,
        adapter: Arc<dyn Adapter>,
        writable: bool,
    ) -> FsResult<()> {
        self.table.mount(point, adapter, writable)
    }

    /// Remove an inner mount. Returns `true` if one was removed.
    pub fn unmount(&self, point: &str) -> FsResult<bool> {
        self.table.unmount(point)
    }

    /// Describe the inner mounts.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.table.mounts()
    }
}

impl Adapter for MergedAdapter {
    fn stat(&self, local: &str) -> FsResult<FileAttr> {
        let pathname = self.table.resolve(local)?;
        pathname.adapter().stat(pathname.local_path())
    }

    fn read(&self, local: &str) -> FsResult<Vec<u8>> {
        let pathname = self.table.resolve(local)?;
        pathname.adapter().read(pathname.local_path())
    }

    fn write(&self, local: &str, data: &[u8]) -> FsResult<u64> {
        let pathname = self.table.resolve_for_write(local)?;
        pathname.adapter().write(pathname.local_path(), data)
    }

    fn list_dir(&self, local: &str) -> FsResult<Vec<DirEntry>> {
        let merged = self.table.list_merged(local)?;
        Ok(merged
            .into_iter()
            .map(|e| DirEntry::new(e.name, e.kind))
            .collect())
    }

    fn create_dir(&self, local: &str) -> FsResult<()> {
        let pathname = self.table.resolve_for_write(local)?;
        pathname.adapter().create_dir(pathname.local_path())
    }

    fn delete_file(&self, local: &str) -> FsResult<()> {
        let pathname = self.table.resolve_for_write(local)?;
        pathname.adapter().delete_file(pathname.local_path())
    }

    fn delete_dir(&self, local: &str) -> FsResult<()> {
        let pathname = self.table.resolve_for_write(local)?;
        pathname.adapter().delete_dir(pathname.local_path())
    }

    fn writable(&self) -> bool {
        self.table.any_writable()
    }

    fn delegate(&self, local: &str) -> FsResult<Option<(Arc<dyn Adapter>, String)>> {
        let pathname = self.table.resolve(local)?;
        Ok(Some((
            pathname.adapter().clone(),
            pathname.local_path().to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryAdapter;
    use crate::error::FsError;

    #[test]
    fn test_overlay_routes_reads_and_writes() {
        let overlay = MergedAdapter::new();
        let base = Arc::new(MemoryAdapter::new());
        let upper = Arc::new(MemoryAdapter::new());
        base.write("/base.txt", b"base").unwrap();
        overlay.mount("/", base, false).unwrap();
        overlay.mount("/work", upper.clone(), true).unwrap();

        assert_eq!(overlay.read("/base.txt").unwrap(), b"base");
        overlay.write("/work/out.txt", b"hi").unwrap();
        assert_eq!(upper.read("/out.txt").unwrap(), b"hi");
    }

    #[test]
    fn test_overlay_protects_inner_read_only() {
        let overlay = MergedAdapter::new();
        overlay
            .mount("/", Arc::new(MemoryAdapter::new()), false)
            .unwrap();
        assert!(matches!(
            overlay.write("/x.txt", b"nope"),
            Err(FsError::ReadOnly { .. })
        ));
        assert!(!overlay.writable());
    }

    #[test]
    fn test_delegate_exposes_backing_adapter() {
        let overlay = MergedAdapter::new();
        let backing = Arc::new(MemoryAdapter::new());
        overlay.mount("/inner", backing.clone(), true).unwrap();

        let (adapter, local) = overlay.delegate("/inner/a/b.txt").unwrap().unwrap();
        assert!(Arc::ptr_eq(&adapter, &(backing as Arc<dyn Adapter>)));
        assert_eq!(local, "/a/b.txt");
    }

    #[test]
    fn test_overlay_listing_shadows() {
        let overlay = MergedAdapter::new();
        let base = Arc::new(MemoryAdapter::new());
        let upper = Arc::new(MemoryAdapter::new());
        base.write("/sub/shared.txt", b"base").unwrap();
        upper.write("/shared.txt", b"upper").unwrap();
        overlay.mount("/", base, false).unwrap();
        overlay.mount("/sub", upper, true).unwrap();

        let names: Vec<String> = overlay
            .list_dir("/sub")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["shared.txt"]);
        assert_eq!(overlay.read("/sub/shared.txt").unwrap(), b"upper");
    }
}
