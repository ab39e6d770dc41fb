//! Overlay mount table with longest-prefix routing.
//!
//! Single-target operations (stat, read, write) go to the most specific
//! mount whose point prefixes the path. Directory listings are a union of
//! every matching mount, with more-specific mounts fully shadowing entries
//! of the same name.
//!
//! The mount list is copy-on-write: mutation builds the next ordered list
//! and swaps one `Arc`, so a resolution or listing in flight iterates an
//! immutable snapshot and never observes a half-updated table.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::error::{FsError, FsResult};
use crate::path::{self, Pathname};
use crate::types::FileType;

/// Bound on overlay delegation chasing; deeper chains indicate a mount
/// cycle through nested merged adapters.
const MAX_DELEGATION_DEPTH: usize = 32;

/// One mount table entry.
#[derive(Clone)]
pub(crate) struct Mount {
    point: String,
    adapter: Arc<dyn Adapter>,
    writable: bool,
}

/// Public description of a mount point.
#[derive(Debug, Clone, Serialize)]
pub struct MountInfo {
    /// Normalized mount point (e.g. `/mnt/project`).
    pub point: String,
    /// Whether write operations may route to this mount.
    pub writable: bool,
}

/// A directory entry produced by a merged listing, bound to the adapter
/// that owns it.
#[derive(Clone)]
pub struct MergedEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type, as reported by the owning mount.
    pub kind: FileType,
    /// Resolved binding for the entry. `None` for mount points synthesized
    /// into the listing when no mount resolves them directly.
    pub origin: Option<Pathname>,
}

/// Ordered mount table.
pub struct MountTable {
    mounts: RwLock<Arc<Vec<Mount>>>,
}

impl std::fmt::Debug for MountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let points: Vec<String> = self.snapshot().iter().map(|m| m.point.clone()).collect();
        f.debug_struct("MountTable").field("points", &points).finish()
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MountTable {
    /// Create an empty mount table.
    pub fn new() -> Self {
        Self {
            mounts: RwLock::new(Arc::new(Vec::new())),
        }
    }

    fn snapshot(&self) -> Arc<Vec<Mount>> {
        self.mounts.read().clone()
    }

    /// Mount an adapter at the given point.
    ///
    /// Mounting at a point that already exists replaces that mount;
    /// mounting a sub-path of an existing mount adds a more specific shadow
    /// entry without removing the parent.
    pub fn mount(
        &self,
        point: &str,
        adapter: Arc<dyn Adapter>,
        writable: bool,
    ) -> FsResult<()> {
        let point = path::normalize(point)?;
        let mut guard = self.mounts.write();
        let mut next: Vec<Mount> = (**guard).clone();
        let mount = Mount {
            point: point.clone(),
            adapter,
            writable,
        };
        match next.iter_mut().find(|m| m.point == point) {
            Some(existing) => *existing = mount,
            None => next.push(mount),
        }
        *guard = Arc::new(next);
        drop(guard);
        tracing::info!(point = %point, writable, "mounted adapter");
        Ok(())
    }

    /// Remove the mount at the given point.
    ///
    /// Returns `true` if a mount was removed.
    pub fn unmount(&self, point: &str) -> FsResult<bool> {
        let point = path::normalize(point)?;
        let mut guard = self.mounts.write();
        let mut next: Vec<Mount> = (**guard).clone();
        let before = next.len();
        next.retain(|m| m.point != point);
        let removed = next.len() < before;
        *guard = Arc::new(next);
        drop(guard);
        if removed {
            tracing::info!(point = %point, "unmounted adapter");
        }
        Ok(removed)
    }

    /// Describe all current mounts, in registration order.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.snapshot()
            .iter()
            .map(|m| MountInfo {
                point: m.point.clone(),
                writable: m.writable,
            })
            .collect()
    }

    /// True when no adapter is mounted.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// True when at least one writable mount exists.
    pub fn any_writable(&self) -> bool {
        self.snapshot().iter().any(|m| m.writable)
    }

    /// Resolve a logical path for read-side, single-target operations.
    ///
    /// Pure string computation plus overlay delegation chasing; no backend
    /// I/O, so non-existence is discovered later by the adapter call.
    pub fn resolve(&self, logical: &str) -> FsResult<Pathname> {
        let full = path::normalize(logical)?;
        let mounts = self.snapshot();
        let (mount, local) =
            Self::best_match(&mounts, &full).ok_or_else(|| FsError::no_such_mount(&full))?;
        tracing::debug!(path = %full, mount = %mount.point, "resolved path");
        let (adapter, local) = chase_delegation(mount.adapter.clone(), local)?;
        Ok(Pathname::new(full, local, adapter))
    }

    /// Resolve a logical path for a mutating operation.
    ///
    /// Routing is identical to read resolution, so data written at a path
    /// is always readable back at that same path. If the most specific
    /// claiming mount is read-only the resolution fails with `ReadOnly`
    /// rather than diverting the write to a less specific mount.
    ///
    /// Delegation is deliberately not chased here: a nested overlay routes
    /// its own writes, so its inner read-only mounts stay protected.
    pub fn resolve_for_write(&self, logical: &str) -> FsResult<Pathname> {
        let full = path::normalize(logical)?;
        let mounts = self.snapshot();
        match Self::best_match(&mounts, &full) {
            Some((mount, local)) => {
                if mount.writable {
                    Ok(Pathname::new(full, local, mount.adapter.clone()))
                } else {
                    Err(FsError::read_only(&full))
                }
            }
            None => Err(FsError::no_such_mount(&full)),
        }
    }

    fn best_match<'m>(mounts: &'m [Mount], full: &str) -> Option<(&'m Mount, String)> {
        let mut best: Option<(&'m Mount, String)> = None;
        for mount in mounts {
            if let Some(local) = local_path_under(&mount.point, full) {
                // Ties on point length cannot happen (equal points replace),
                // so >= just keeps the scan simple.
                let better = match &best {
                    None => true,
                    Some((b, _)) => mount.point.len() >= b.point.len(),
                };
                if better {
                    best = Some((mount, local));
                }
            }
        }
        best
    }

    /// Merged directory listing across every mount claiming the path.
    ///
    /// Mounts are scanned least- to most-specific; name collisions keep the
    /// first-seen position but the most specific mount's entry wins and
    /// fully shadows the others. Mount points directly beneath the listed
    /// directory are synthesized as directory entries.
    ///
    /// Per-mount failures are tolerated and logged as long as at least one
    /// contributing mount succeeds.
    pub fn list_merged(&self, logical: &str) -> FsResult<Vec<MergedEntry>> {
        let full = path::normalize(logical)?;
        let mounts = self.snapshot();

        let mut matching: Vec<(&Mount, String)> = mounts
            .iter()
            .filter_map(|m| local_path_under(&m.point, &full).map(|local| (m, local)))
            .collect();
        matching.sort_by_key(|(m, _)| m.point.len());

        if matching.is_empty() && !has_mounts_below(&mounts, &full) {
            return Err(FsError::no_such_mount(&full));
        }

        let mut merged: IndexMap<String, MergedEntry> = IndexMap::new();
        let mut succeeded = 0usize;

        for (mount, local) in &matching {
            match mount.adapter.list_dir(local) {
                Ok(entries) => {
                    succeeded += 1;
                    for entry in entries {
                        let child_full = path::join(&full, &entry.name);
                        let child_local = path::join(local, &entry.name);
                        // An overlay may list an entry it cannot resolve
                        // itself (a mount point synthesized for a deeper
                        // inner mount); bind the overlay adapter then.
                        let origin = match chase_delegation(mount.adapter.clone(), child_local.clone())
                        {
                            Ok((adapter, chased)) => Pathname::new(child_full, chased, adapter),
                            Err(_) => {
                                Pathname::new(child_full, child_local, mount.adapter.clone())
                            }
                        };
                        merged.insert(
                            entry.name.clone(),
                            MergedEntry {
                                name: entry.name,
                                kind: entry.kind,
                                origin: Some(origin),
                            },
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        mount = %mount.point,
                        path = %full,
                        error = %err,
                        "skipping mount during merged listing"
                    );
                }
            }
        }

        // Mount points one level beneath the listed directory appear as
        // directories even when no parent mount materializes them.
        let mut synthesized = 0usize;
        for mount in mounts.iter() {
            if let Some(name) = first_component_below(&full, &mount.point) {
                if !merged.contains_key(name) {
                    let child_full = path::join(&full, name);
                    let origin = self.resolve(&child_full).ok();
                    merged.insert(
                        name.to_string(),
                        MergedEntry {
                            name: name.to_string(),
                            kind: FileType::Directory,
                            origin,
                        },
                    );
                    synthesized += 1;
                }
            }
        }

        if succeeded == 0 && synthesized == 0 {
            return Err(FsError::not_found(&full));
        }

        Ok(merged.into_values().collect())
    }
}

/// Local path of `full` relative to `point`, when `point` is a prefix of
/// `full` on segment boundaries.
fn local_path_under(point: &str, full: &str) -> Option<String> {
    if point == "/" {
        return Some(full.to_string());
    }
    if full == point {
        return Some("/".to_string());
    }
    full.strip_prefix(point)
        .filter(|rest| rest.starts_with('/'))
        .map(|rest| rest.to_string())
}

/// First segment of `point` strictly below the directory `full`, when
/// `point` is mounted somewhere underneath it.
fn first_component_below<'p>(full: &str, point: &'p str) -> Option<&'p str> {
    if point == "/" || point == full {
        return None;
    }
    let rest = if full == "/" {
        point.strip_prefix('/')?
    } else {
        point.strip_prefix(full)?.strip_prefix('/')?
    };
    rest.split('/').next().filter(|s| !s.is_empty())
}

fn has_mounts_below(mounts: &[Mount], full: &str) -> bool {
    mounts
        .iter()
        .any(|m| first_component_below(full, &m.point).is_some())
}

/// Chase overlay delegation down to the real backing adapter.
pub(crate) fn chase_delegation(
    mut adapter: Arc<dyn Adapter>,
    mut local: String,
) -> FsResult<(Arc<dyn Adapter>, String)> {
    for _ in 0..MAX_DELEGATION_DEPTH {
        match adapter.delegate(&local)? {
            Some((inner, inner_local)) => {
                adapter = inner;
                local = inner_local;
            }
            None => return Ok((adapter, local)),
        }
    }
    Err(FsError::adapter_op(
        "resolve",
        local,
        "mount delegation depth exceeded",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryAdapter;

    fn mem_with(files: &[(&str, &str)]) -> Arc<MemoryAdapter> {
        let fs = MemoryAdapter::new();
        for (path, content) in files {
            fs.write(path, content.as_bytes()).unwrap();
        }
        Arc::new(fs)
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = MountTable::new();
        let a = mem_with(&[]);
        let b = mem_with(&[]);
        table.mount("/a", a.clone(), true).unwrap();
        table.mount("/a/b", b.clone(), true).unwrap();

        let resolved = table.resolve("/a/b/c").unwrap();
        assert!(Arc::ptr_eq(
            resolved.adapter(),
            &(b.clone() as Arc<dyn Adapter>)
        ));
        assert_eq!(resolved.local_path(), "/c");
        assert_eq!(resolved.full_path(), "/a/b/c");
    }

    #[test]
    fn test_root_and_specific_mount() {
        let table = MountTable::new();
        let a = mem_with(&[]);
        let b = mem_with(&[]);
        table.mount("/", a.clone(), true).unwrap();
        table.mount("/tmp", b.clone(), true).unwrap();

        let resolved = table.resolve("/tmp/x.txt").unwrap();
        assert!(Arc::ptr_eq(resolved.adapter(), &(b as Arc<dyn Adapter>)));
        assert_eq!(resolved.local_path(), "/x.txt");

        let resolved = table.resolve("/etc/x.txt").unwrap();
        assert!(Arc::ptr_eq(resolved.adapter(), &(a as Arc<dyn Adapter>)));
        assert_eq!(resolved.local_path(), "/etc/x.txt");
    }

    #[test]
    fn test_resolution_deterministic() {
        let table = MountTable::new();
        table.mount("/", mem_with(&[]), true).unwrap();
        table.mount("/data", mem_with(&[]), true).unwrap();

        let first = table.resolve("/data/a/b").unwrap();
        let second = table.resolve("/data/a/b").unwrap();
        assert_eq!(first.local_path(), second.local_path());
        assert!(Arc::ptr_eq(first.adapter(), second.adapter()));
    }

    #[test]
    fn test_root_resolves_to_top_mount() {
        let table = MountTable::new();
        let root = mem_with(&[]);
        table.mount("/", root.clone(), true).unwrap();

        let resolved = table.resolve("/").unwrap();
        assert_eq!(resolved.local_path(), "/");
        assert!(Arc::ptr_eq(resolved.adapter(), &(root as Arc<dyn Adapter>)));
    }

    #[test]
    fn test_no_such_mount() {
        let table = MountTable::new();
        table.mount("/data", mem_with(&[]), true).unwrap();
        assert!(matches!(
            table.resolve("/elsewhere/x"),
            Err(FsError::NoSuchMount { .. })
        ));
    }

    #[test]
    fn test_escape_fails_before_any_adapter() {
        let table = MountTable::new();
        assert!(matches!(
            table.resolve("/../secret"),
            Err(FsError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_mount_replace_on_equal_point() {
        let table = MountTable::new();
        let first = mem_with(&[("/old.txt", "old")]);
        let second = mem_with(&[("/new.txt", "new")]);
        table.mount("/data", first, true).unwrap();
        table.mount("/data", second, true).unwrap();

        assert_eq!(table.mounts().len(), 1);
        let resolved = table.resolve("/data/new.txt").unwrap();
        assert!(resolved.adapter().exists(resolved.local_path()));
    }

    #[test]
    fn test_unmount() {
        let table = MountTable::new();
        table.mount("/data", mem_with(&[]), true).unwrap();
        assert!(table.unmount("/data").unwrap());
        assert!(!table.unmount("/data").unwrap());
        assert!(table.resolve("/data/x").is_err());
    }

    #[test]
    fn test_write_fails_when_read_only_mount_shadows() {
        let table = MountTable::new();
        let base = mem_with(&[]);
        table.mount("/", base.clone(), true).unwrap();
        table.mount("/snapshots", mem_with(&[]), false).unwrap();

        // The most specific claiming mount is read-only; the write must
        // not divert to "/", or the data would be unreadable at its own
        // path afterwards.
        assert!(matches!(
            table.resolve_for_write("/snapshots/x.txt"),
            Err(FsError::ReadOnly { .. })
        ));
        let resolved = table.resolve_for_write("/elsewhere/x.txt").unwrap();
        assert!(Arc::ptr_eq(resolved.adapter(), &(base as Arc<dyn Adapter>)));
    }

    #[test]
    fn test_write_fails_read_only_when_no_writable_mount() {
        let table = MountTable::new();
        table.mount("/snapshots", mem_with(&[]), false).unwrap();
        assert!(matches!(
            table.resolve_for_write("/snapshots/x.txt"),
            Err(FsError::ReadOnly { .. })
        ));
        assert!(matches!(
            table.resolve_for_write("/other/x.txt"),
            Err(FsError::NoSuchMount { .. })
        ));
    }

    #[test]
    fn test_write_resolution_agrees_with_read_resolution() {
        let table = MountTable::new();
        table.mount("/", mem_with(&[]), true).unwrap();
        table.mount("/cache", mem_with(&[]), true).unwrap();

        // Whatever adapter accepts a write must be the one a subsequent
        // read resolves to.
        for path in ["/a.txt", "/cache/b.txt"] {
            let wrote = table.resolve_for_write(path).unwrap();
            let read = table.resolve(path).unwrap();
            assert!(Arc::ptr_eq(wrote.adapter(), read.adapter()));
            assert_eq!(wrote.local_path(), read.local_path());
        }
    }

    #[test]
    fn test_merged_listing_shadows_by_specificity() {
        let table = MountTable::new();
        let base = mem_with(&[("/sub/foo.txt", "from base"), ("/sub/only-base.txt", "b")]);
        let over = mem_with(&[("/foo.txt", "from over")]);
        table.mount("/", base, true).unwrap();
        table.mount("/sub", over, true).unwrap();

        let entries = table.list_merged("/sub").unwrap();
        let foo = entries.iter().find(|e| e.name == "foo.txt").unwrap();
        let origin = foo.origin.as_ref().unwrap();
        assert_eq!(origin.adapter().read(origin.local_path()).unwrap(), b"from over");
        assert!(entries.iter().any(|e| e.name == "only-base.txt"));
    }

    #[test]
    fn test_merged_listing_idempotent() {
        let table = MountTable::new();
        table
            .mount("/", mem_with(&[("/a.txt", "1"), ("/b.txt", "2")]), true)
            .unwrap();
        table.mount("/sub", mem_with(&[("/c.txt", "3")]), true).unwrap();

        let names = |entries: Vec<MergedEntry>| -> Vec<String> {
            entries.into_iter().map(|e| e.name).collect()
        };
        let first = names(table.list_merged("/").unwrap());
        let second = names(table.list_merged("/").unwrap());
        assert_eq!(first, second);
        assert!(first.contains(&"sub".to_string()));
    }

    #[test]
    fn test_partial_mount_failure_tolerated() {
        let table = MountTable::new();
        // /docs/sub exists only in the base; the more specific mount fails
        // to list it, which must not abort the whole listing.
        let base = mem_with(&[("/docs/sub/file.txt", "x")]);
        let broken = mem_with(&[]);
        table.mount("/", base, true).unwrap();
        table.mount("/docs", broken, true).unwrap();

        let entries = table.list_merged("/docs/sub").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "file.txt");
    }

    #[test]
    fn test_total_listing_failure_propagates() {
        let table = MountTable::new();
        table.mount("/", mem_with(&[]), true).unwrap();
        assert!(matches!(
            table.list_merged("/nope"),
            Err(FsError::NotFound { .. })
        ));
    }

    #[test]
    fn test_listing_synthesizes_mount_points() {
        let table = MountTable::new();
        table.mount("/mnt/a", mem_with(&[]), true).unwrap();
        table.mount("/mnt/b", mem_with(&[]), true).unwrap();

        let entries = table.list_merged("/").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "mnt");
        assert!(entries[0].kind.is_dir());

        let entries = table.list_merged("/mnt").unwrap();
        let mut names: Vec<_> = entries.iter().map(|e| e.name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }
}
