//! File handle bound to a logical path.
//!
//! A [`File`] stores only the normalized logical path plus a facade handle;
//! every operation re-resolves through the mount table, so handles stay
//! valid across mount-table changes and never cache a [`Pathname`].
//!
//! [`Pathname`]: crate::path::Pathname

use std::any::Any;

use crate::error::{FsError, FsResult};
use crate::filesystem::Filesystem;
use crate::path::{self, Pathname};
use crate::types::FileAttr;

/// Handle to a file or directory at a logical path.
#[derive(Clone)]
pub struct File {
    fs: Filesystem,
    full_path: String,
}

impl File {
    pub(crate) fn new(fs: Filesystem, full_path: String) -> Self {
        Self { fs, full_path }
    }

    /// The normalized logical path of this handle.
    pub fn path(&self) -> &str {
        &self.full_path
    }

    /// Final path segment, or `None` for the logical root.
    pub fn name(&self) -> Option<&str> {
        path::file_name(&self.full_path)
    }

    /// The owning filesystem facade.
    pub fn filesystem(&self) -> &Filesystem {
        &self.fs
    }

    /// Parent directory handle, or `None` for the logical root.
    pub fn parent(&self) -> Option<File> {
        path::parent(&self.full_path).map(|p| File::new(self.fs.clone(), p.to_string()))
    }

    /// Navigate to a child (or relative) path beneath this handle.
    pub fn child(&self, name: &str) -> FsResult<File> {
        self.fs.file(&path::join(&self.full_path, name))
    }

    /// Resolve this handle's path for a read-side operation.
    pub fn pathname(&self) -> FsResult<Pathname> {
        self.fs.resolve(&self.full_path)
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    /// Whether the target exists. Idempotent probe; resolution failures
    /// also report `false`.
    pub fn exists(&self) -> bool {
        match self.pathname() {
            Ok(p) => p.adapter().exists(p.local_path()),
            Err(_) => false,
        }
    }

    /// Stat metadata of the target.
    pub fn stat(&self) -> FsResult<FileAttr> {
        self.fs.stat(&self.full_path)
    }

    /// Read the full content of the target file.
    pub fn read(&self) -> FsResult<Vec<u8>> {
        self.fs.read(&self.full_path)
    }

    /// Replace the content of the target file, creating it if missing.
    pub fn write(&self, data: &[u8]) -> FsResult<u64> {
        self.fs.write(&self.full_path, data)
    }

    /// Create the target directory (and missing parents).
    pub fn create_dir(&self) -> FsResult<()> {
        self.fs.create_dir(&self.full_path)
    }

    /// Delete the target file.
    pub fn delete_file(&self) -> FsResult<()> {
        self.fs.delete_file(&self.full_path)
    }

    /// Delete the target (empty) directory.
    pub fn delete_dir(&self) -> FsResult<()> {
        self.fs.delete_dir(&self.full_path)
    }

    /// Delete the target recursively, whatever its type.
    pub fn delete_all(&self) -> FsResult<()> {
        let attr = self.stat()?;
        if attr.is_dir() {
            for child in self.list()? {
                child.delete_all()?;
            }
            self.delete_dir()
        } else {
            self.delete_file()
        }
    }

    /// List this directory as a fresh sequence of handles.
    ///
    /// Every call re-lists, so iteration is restartable and always reflects
    /// the current merged view.
    pub fn list(&self) -> FsResult<Vec<File>> {
        self.fs.list_dir(&self.full_path)
    }

    // ------------------------------------------------------------------
    // Copy / move
    // ------------------------------------------------------------------

    /// Copy this file or directory tree to `dest`, possibly across mounts
    /// and adapters.
    ///
    /// Directories copy recursively into a freshly created destination,
    /// which must not lie inside the source tree. Under the full-shadowing
    /// rule, same-named directories never merge: copying a directory over
    /// an existing directory fails with `DirectoryOverwrite`, and copying
    /// a file over a directory fails with `NotAFile`.
    pub fn copy_to(&self, dest: &File) -> FsResult<()> {
        let attr = self.stat()?;
        if attr.is_dir() {
            if self.contains(dest) {
                return Err(FsError::invalid_path(dest.path()));
            }
            match dest.stat() {
                Ok(existing) if existing.is_dir() => {
                    return Err(FsError::DirectoryOverwrite {
                        from: self.full_path.clone(),
                        to: dest.full_path.clone(),
                    });
                }
                Ok(_) => return Err(FsError::not_a_directory(dest.path())),
                Err(FsError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
            dest.create_dir()?;
            for child in self.list()? {
                let name = child
                    .name()
                    .ok_or_else(|| FsError::invalid_path(child.path()))?;
                child.copy_to(&dest.child(name)?)?;
            }
            Ok(())
        } else {
            if let Ok(existing) = dest.stat() {
                if existing.is_dir() {
                    return Err(FsError::not_a_file(dest.path()));
                }
            }
            let data = self.read()?;
            dest.write(&data)?;
            Ok(())
        }
    }

    /// Move this file or directory tree to `dest` (copy + recursive
    /// delete, which also works across adapter boundaries).
    pub fn move_to(&self, dest: &File) -> FsResult<()> {
        self.copy_to(dest)?;
        self.delete_all()
    }

    /// Whether `other`'s path equals this handle's path or lies beneath it.
    fn contains(&self, other: &File) -> bool {
        other.full_path == self.full_path
            || other
                .full_path
                .strip_prefix(self.full_path.trim_end_matches('/'))
                .is_some_and(|rest| rest.starts_with('/'))
    }

    // ------------------------------------------------------------------
    // Capability conveniences (graceful degradation)
    // ------------------------------------------------------------------

    /// Whether the target is a symbolic link. Adapters without link
    /// support report `false`, not an error.
    pub fn is_link(&self) -> FsResult<bool> {
        let p = self.pathname()?;
        match p.adapter().links() {
            Some(links) => links.is_link(p.local_path()),
            None => Ok(false),
        }
    }

    /// Symlink target, or `None` when the target is not a link or the
    /// adapter has no link support.
    pub fn link_target(&self) -> FsResult<Option<String>> {
        let p = self.pathname()?;
        match p.adapter().links() {
            Some(links) => links.link_target(p.local_path()),
            None => Ok(None),
        }
    }

    /// Total space of the volume holding the target; `None` when the
    /// adapter cannot tell.
    pub fn total_space(&self) -> FsResult<Option<u64>> {
        let p = self.pathname()?;
        match p.adapter().disk_space() {
            Some(space) => space.total_space(p.local_path()),
            None => Ok(None),
        }
    }

    /// Free space of the volume holding the target; `None` when the
    /// adapter cannot tell.
    pub fn free_space(&self) -> FsResult<Option<u64>> {
        let p = self.pathname()?;
        match p.adapter().disk_space() {
            Some(space) => space.free_space(p.local_path()),
            None => Ok(None),
        }
    }

    /// Typed file-scoped plugin dispatch (probe-then-construct).
    pub fn plugin<T: Any>(&self, name: &str) -> FsResult<Box<T>> {
        self.fs.file_plugin(name, self)
    }
}

impl std::fmt::Debug for File {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("File")
            .field("path", &self.full_path)
            .finish_non_exhaustive()
    }
}

impl PartialEq for File {
    /// Handles are interchangeable when they share a facade and a
    /// normalized path, regardless of which lookup produced them.
    fn eq(&self, other: &Self) -> bool {
        self.fs.same_facade(&other.fs) && self.full_path == other.full_path
    }
}

impl Eq for File {}
