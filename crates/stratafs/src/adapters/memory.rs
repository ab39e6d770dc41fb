//! In-memory adapter.
//!
//! Ephemeral storage for scratch mounts and tests. All data is lost when
//! the adapter is dropped.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::SystemTime;

use crate::adapter::Adapter;
use crate::capability::LinkCapability;
use crate::error::{FsError, FsResult};
use crate::path;
use crate::types::{DirEntry, FileAttr, FileType};

#[derive(Debug, Clone)]
enum Entry {
    File { data: Vec<u8>, attr: FileAttr },
    Directory { attr: FileAttr },
    Symlink { target: String, attr: FileAttr },
}

impl Entry {
    fn attr(&self) -> &FileAttr {
        match self {
            Entry::File { attr, .. } => attr,
            Entry::Directory { attr } => attr,
            Entry::Symlink { attr, .. } => attr,
        }
    }

    fn kind(&self) -> FileType {
        self.attr().kind
    }
}

/// In-memory adapter. Thread-safe via an internal lock.
///
/// Writing a file creates missing parent directories, so fixtures can be
/// populated with a handful of `write` calls.
#[derive(Debug)]
pub struct MemoryAdapter {
    entries: RwLock<HashMap<String, Entry>>,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    /// Create an empty in-memory adapter. The root directory always exists.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "/".to_string(),
            Entry::Directory {
                attr: FileAttr::directory(0o755),
            },
        );
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Create a symbolic link at `local` pointing at `target`.
    pub fn symlink(&self, local: &str, target: &str) -> FsResult<()> {
        let local = path::normalize(local)?;
        self.ensure_parents(&local)?;
        let mut entries = self.entries.write();
        if entries.contains_key(&local) {
            return Err(FsError::already_exists(local));
        }
        entries.insert(
            local,
            Entry::Symlink {
                target: target.to_string(),
                attr: FileAttr::symlink(target.len() as u64),
            },
        );
        Ok(())
    }

    /// Create missing ancestor directories. Fails with `NotADirectory` if
    /// an ancestor already exists as something other than a directory.
    fn ensure_parents(&self, local: &str) -> FsResult<()> {
        let mut entries = self.entries.write();
        let mut current = String::new();
        let Some(parent) = path::parent(local) else {
            return Ok(());
        };
        if parent == "/" {
            return Ok(());
        }
        for segment in parent.trim_start_matches('/').split('/') {
            current.push('/');
            current.push_str(segment);
            let entry = entries.entry(current.clone()).or_insert(Entry::Directory {
                attr: FileAttr::directory(0o755),
            });
            if !matches!(entry, Entry::Directory { .. }) {
                return Err(FsError::not_a_directory(current));
            }
        }
        Ok(())
    }
}

impl Adapter for MemoryAdapter {
    fn stat(&self, local: &str) -> FsResult<FileAttr> {
        let local = path::normalize(local)?;
        let entries = self.entries.read();
        entries
            .get(&local)
            .map(|e| e.attr().clone())
            .ok_or_else(|| FsError::not_found(local))
    }

    fn read(&self, local: &str) -> FsResult<Vec<u8>> {
        let local = path::normalize(local)?;
        let entries = self.entries.read();
        match entries.get(&local) {
            Some(Entry::File { data, .. }) => Ok(data.clone()),
            Some(_) => Err(FsError::not_a_file(local)),
            None => Err(FsError::not_found(local)),
        }
    }

    fn write(&self, local: &str, data: &[u8]) -> FsResult<u64> {
        let local = path::normalize(local)?;
        if local == "/" {
            return Err(FsError::not_a_file(local));
        }
        self.ensure_parents(&local)?;
        let mut entries = self.entries.write();
        match entries.get_mut(&local) {
            Some(Entry::File {
                data: file_data,
                attr,
            }) => {
                *file_data = data.to_vec();
                attr.size = data.len() as u64;
                attr.mtime = SystemTime::now();
            }
            Some(_) => return Err(FsError::not_a_file(local)),
            None => {
                entries.insert(
                    local,
                    Entry::File {
                        data: data.to_vec(),
                        attr: FileAttr::file(data.len() as u64, 0o644),
                    },
                );
            }
        }
        Ok(data.len() as u64)
    }

    fn list_dir(&self, local: &str) -> FsResult<Vec<DirEntry>> {
        let local = path::normalize(local)?;
        let entries = self.entries.read();
        match entries.get(&local) {
            Some(Entry::Directory { .. }) => {}
            Some(_) => return Err(FsError::not_a_directory(local)),
            None => return Err(FsError::not_found(local)),
        }

        let mut result: Vec<DirEntry> = entries
            .iter()
            .filter(|(p, _)| path::parent(p) == Some(local.as_str()))
            .filter_map(|(p, e)| path::file_name(p).map(|name| DirEntry::new(name, e.kind())))
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn create_dir(&self, local: &str) -> FsResult<()> {
        let local = path::normalize(local)?;
        self.ensure_parents(&local)?;
        let mut entries = self.entries.write();
        match entries.get(&local) {
            Some(Entry::Directory { .. }) => Ok(()),
            Some(_) => Err(FsError::already_exists(local)),
            None => {
                entries.insert(
                    local,
                    Entry::Directory {
                        attr: FileAttr::directory(0o755),
                    },
                );
                Ok(())
            }
        }
    }

    fn delete_file(&self, local: &str) -> FsResult<()> {
        let local = path::normalize(local)?;
        let mut entries = self.entries.write();
        match entries.get(&local) {
            Some(Entry::Directory { .. }) => Err(FsError::not_a_file(local)),
            Some(_) => {
                entries.remove(&local);
                Ok(())
            }
            None => Err(FsError::not_found(local)),
        }
    }

    fn delete_dir(&self, local: &str) -> FsResult<()> {
        let local = path::normalize(local)?;
        if local == "/" {
            return Err(FsError::adapter_op(
                "delete_dir",
                local,
                "cannot remove adapter root",
            ));
        }
        let mut entries = self.entries.write();
        match entries.get(&local) {
            Some(Entry::Directory { .. }) => {}
            Some(_) => return Err(FsError::not_a_directory(local)),
            None => return Err(FsError::not_found(local)),
        }
        let has_children = entries
            .keys()
            .any(|p| path::parent(p) == Some(local.as_str()));
        if has_children {
            return Err(FsError::directory_not_empty(local));
        }
        entries.remove(&local);
        Ok(())
    }

    fn links(&self) -> Option<&dyn LinkCapability> {
        Some(self)
    }
}

impl LinkCapability for MemoryAdapter {
    fn is_link(&self, local: &str) -> FsResult<bool> {
        let local = path::normalize(local)?;
        let entries = self.entries.read();
        Ok(matches!(entries.get(&local), Some(Entry::Symlink { .. })))
    }

    fn link_target(&self, local: &str) -> FsResult<Option<String>> {
        let local = path::normalize(local)?;
        let entries = self.entries.read();
        match entries.get(&local) {
            Some(Entry::Symlink { target, .. }) => Ok(Some(target.clone())),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read() {
        let fs = MemoryAdapter::new();
        fs.write("/test.txt", b"hello world").unwrap();
        assert_eq!(fs.read("/test.txt").unwrap(), b"hello world");
        assert_eq!(fs.stat("/test.txt").unwrap().size, 11);
    }

    #[test]
    fn test_write_creates_parents() {
        let fs = MemoryAdapter::new();
        fs.write("/a/b/c/file.txt", b"x").unwrap();
        assert!(fs.stat("/a").unwrap().is_dir());
        assert!(fs.stat("/a/b").unwrap().is_dir());
        assert!(fs.stat("/a/b/c").unwrap().is_dir());
    }

    #[test]
    fn test_ancestor_must_be_a_directory() {
        let fs = MemoryAdapter::new();
        fs.write("/a", b"file, not dir").unwrap();
        assert!(matches!(
            fs.write("/a/b/c", b"y"),
            Err(FsError::NotADirectory { .. })
        ));
        assert!(matches!(
            fs.create_dir("/a/d"),
            Err(FsError::NotADirectory { .. })
        ));
        // No orphan entries were left behind under the file.
        assert!(!fs.exists("/a/b"));
    }

    #[test]
    fn test_overwrite_replaces_content() {
        let fs = MemoryAdapter::new();
        fs.write("/f", b"long content").unwrap();
        fs.write("/f", b"short").unwrap();
        assert_eq!(fs.read("/f").unwrap(), b"short");
    }

    #[test]
    fn test_list_dir() {
        let fs = MemoryAdapter::new();
        fs.write("/sub/file.txt", b"x").unwrap();
        fs.write("/root.txt", b"y").unwrap();

        let names: Vec<String> = fs
            .list_dir("/")
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["root.txt", "sub"]);

        let sub = fs.list_dir("/sub").unwrap();
        assert_eq!(sub.len(), 1);
        assert_eq!(sub[0].name, "file.txt");
    }

    #[test]
    fn test_list_dir_type_errors() {
        let fs = MemoryAdapter::new();
        fs.write("/file", b"x").unwrap();
        assert!(matches!(
            fs.list_dir("/file"),
            Err(FsError::NotADirectory { .. })
        ));
        assert!(matches!(fs.list_dir("/nope"), Err(FsError::NotFound { .. })));
    }

    #[test]
    fn test_delete_file() {
        let fs = MemoryAdapter::new();
        fs.write("/f", b"x").unwrap();
        fs.delete_file("/f").unwrap();
        assert!(!fs.exists("/f"));
        assert!(matches!(
            fs.delete_file("/f"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_dir() {
        let fs = MemoryAdapter::new();
        fs.create_dir("/empty").unwrap();
        fs.delete_dir("/empty").unwrap();
        assert!(!fs.exists("/empty"));

        fs.write("/full/f", b"x").unwrap();
        assert!(matches!(
            fs.delete_dir("/full"),
            Err(FsError::DirectoryNotEmpty { .. })
        ));
    }

    #[test]
    fn test_delete_type_mismatch() {
        let fs = MemoryAdapter::new();
        fs.create_dir("/d").unwrap();
        fs.write("/f", b"x").unwrap();
        assert!(matches!(
            fs.delete_file("/d"),
            Err(FsError::NotAFile { .. })
        ));
        assert!(matches!(
            fs.delete_dir("/f"),
            Err(FsError::NotADirectory { .. })
        ));
    }

    #[test]
    fn test_symlink_capability() {
        let fs = MemoryAdapter::new();
        fs.write("/target.txt", b"content").unwrap();
        fs.symlink("/link", "/target.txt").unwrap();

        let links = fs.links().unwrap();
        assert!(links.is_link("/link").unwrap());
        assert_eq!(
            links.link_target("/link").unwrap().as_deref(),
            Some("/target.txt")
        );
        assert!(!links.is_link("/target.txt").unwrap());
        assert!(!links.is_link("/missing").unwrap());
        assert!(fs.stat("/link").unwrap().is_symlink());
    }

    #[test]
    fn test_path_normalization() {
        let fs = MemoryAdapter::new();
        fs.write("/a/b/c.txt", b"x").unwrap();
        assert!(fs.exists("a/b/c.txt"));
        assert!(fs.exists("/a/./b/c.txt"));
        assert!(fs.exists("/a/b/../b/c.txt"));
    }
}
