//! Logical path normalization and the resolved [`Pathname`] value.
//!
//! Logical paths are `/`-separated strings relative to the logical root.
//! Normalization is pure string computation; no I/O happens here, so
//! resolution can never fail because a file is missing.

use std::sync::Arc;

use crate::adapter::Adapter;
use crate::error::{FsError, FsResult};

/// Normalize a logical path.
///
/// Collapses `.` segments and duplicate separators, resolves `..` against
/// preceding segments, and anchors the result at the logical root. A path
/// that would climb above the root fails with [`FsError::InvalidPath`].
///
/// The normalized form has a leading `/`, no trailing slash, and `/` for the
/// root itself. Relative input is interpreted as root-relative.
pub fn normalize(path: &str) -> FsResult<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(FsError::invalid_path(path));
                }
            }
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}", segments.join("/")))
    }
}

/// Join a child name onto a normalized path.
pub fn join(base: &str, name: &str) -> String {
    if base == "/" {
        format!("/{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Parent of a normalized path. The root has no parent.
pub fn parent(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rsplit_once('/') {
        Some(("", _)) => Some("/"),
        Some((parent, _)) => Some(parent),
        None => None,
    }
}

/// Final segment of a normalized path. The root has no name.
pub fn file_name(path: &str) -> Option<&str> {
    if path == "/" {
        None
    } else {
        path.rsplit_once('/').map(|(_, name)| name)
    }
}

/// A resolved logical path: the normalized full path plus the adapter that
/// owns it and the path relative to that adapter's root.
///
/// Created by the resolver on every lookup and discarded after the operation
/// completes; two Pathnames with equal `full_path` are interchangeable.
#[derive(Clone)]
pub struct Pathname {
    full_path: String,
    local_path: String,
    adapter: Arc<dyn Adapter>,
}

impl Pathname {
    pub(crate) fn new(full_path: String, local_path: String, adapter: Arc<dyn Adapter>) -> Self {
        Self {
            full_path,
            local_path,
            adapter,
        }
    }

    /// Normalized logical path, relative to the logical root.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Path relative to the bound adapter's root (leading `/`).
    pub fn local_path(&self) -> &str {
        &self.local_path
    }

    /// The adapter that owns this path.
    pub fn adapter(&self) -> &Arc<dyn Adapter> {
        &self.adapter
    }
}

impl std::fmt::Debug for Pathname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pathname")
            .field("full_path", &self.full_path)
            .field("local_path", &self.local_path)
            .finish_non_exhaustive()
    }
}
