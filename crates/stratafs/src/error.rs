//! Error taxonomy for the filesystem core.
//!
//! Every variant carries the offending path (or plugin name) so callers can
//! branch on the kind and still recover the context programmatically.

use std::io;
use thiserror::Error;

/// Boxed backend error cause.
pub type AdapterCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Filesystem error type.
#[derive(Debug, Error)]
pub enum FsError {
    /// Malformed logical path, or one that would escape the logical root.
    #[error("invalid path: {path}")]
    InvalidPath { path: String },

    /// No mount claims the path.
    #[error("no mount claims path: {path}")]
    NoSuchMount { path: String },

    /// Path is well-formed and mounted, but absent in the backend.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Expected a directory at the target.
    #[error("not a directory: {path}")]
    NotADirectory { path: String },

    /// Expected a file at the target.
    #[error("not a file: {path}")]
    NotAFile { path: String },

    /// Target already exists.
    #[error("already exists: {path}")]
    AlreadyExists { path: String },

    /// Directory is not empty.
    #[error("directory not empty: {path}")]
    DirectoryNotEmpty { path: String },

    /// Attempt to replace a directory with another directory (merge/copy
    /// conflict under the full-shadowing rule).
    #[error("cannot overwrite directory {to} with directory {from}")]
    DirectoryOverwrite { from: String, to: String },

    /// The mount or backend claiming the path rejects mutations.
    #[error("not writable: {path}")]
    ReadOnly { path: String },

    /// Plugin name is not present in the registry.
    #[error("plugin not registered: {name}")]
    PluginNotRegistered { name: String },

    /// Plugin is registered but the target does not support it.
    #[error("plugin {name:?} not supported for {path}")]
    UnsupportedPlugin { name: String, path: String },

    /// Invalid declarative configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Backend-specific failure, cause preserved.
    #[error("{op} failed for {path}")]
    AdapterOperation {
        op: &'static str,
        path: String,
        #[source]
        source: AdapterCause,
    },
}

impl FsError {
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    pub fn no_such_mount(path: impl Into<String>) -> Self {
        Self::NoSuchMount { path: path.into() }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory { path: path.into() }
    }

    pub fn not_a_file(path: impl Into<String>) -> Self {
        Self::NotAFile { path: path.into() }
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    pub fn directory_not_empty(path: impl Into<String>) -> Self {
        Self::DirectoryNotEmpty { path: path.into() }
    }

    pub fn read_only(path: impl Into<String>) -> Self {
        Self::ReadOnly { path: path.into() }
    }

    pub fn plugin_not_registered(name: impl Into<String>) -> Self {
        Self::PluginNotRegistered { name: name.into() }
    }

    pub fn unsupported_plugin(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::UnsupportedPlugin {
            name: name.into(),
            path: path.into(),
        }
    }

    pub fn adapter_op(
        op: &'static str,
        path: impl Into<String>,
        source: impl Into<AdapterCause>,
    ) -> Self {
        Self::AdapterOperation {
            op,
            path: path.into(),
            source: source.into(),
        }
    }

    /// Map an `io::Error` to the typed taxonomy where the kind is
    /// unambiguous, otherwise wrap it with the operation context.
    pub fn from_io(op: &'static str, path: impl Into<String>, err: io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            io::ErrorKind::NotADirectory => Self::NotADirectory { path },
            io::ErrorKind::IsADirectory => Self::NotAFile { path },
            io::ErrorKind::DirectoryNotEmpty => Self::DirectoryNotEmpty { path },
            io::ErrorKind::PermissionDenied => Self::ReadOnly { path },
            _ => Self::AdapterOperation {
                op,
                path,
                source: Box::new(err),
            },
        }
    }
}

/// Filesystem result type.
pub type FsResult<T> = Result<T, FsError>;
