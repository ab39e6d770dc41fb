//! # stratafs
//!
//! Adapter-composed virtual filesystem.
//!
//! A [`Filesystem`] routes logical paths through an ordered overlay mount
//! table: single-target operations go to the most specific mount claiming
//! the path, directory listings merge every claiming mount with full
//! shadowing on name collisions. Backends plug in as [`Adapter`]s, which
//! may opt into capability interfaces (links, hashing, MIME, disk space);
//! named plugins expose those capabilities through typed accessors, with
//! software fallbacks where one makes sense.
//!
//! ```no_run
//! use std::sync::Arc;
//! use stratafs::{Filesystem, LocalAdapter, MemoryAdapter};
//!
//! # fn main() -> stratafs::FsResult<()> {
//! let fs = Filesystem::with_default_plugins(Arc::new(LocalAdapter::new("/srv/data")));
//! fs.mount("/scratch", Arc::new(MemoryAdapter::new()), true)?;
//!
//! fs.write("/scratch/notes.txt", b"hello")?;
//! for entry in fs.root().list()? {
//!     println!("{}", entry.path());
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod adapters;
pub mod capability;
pub mod config;
pub mod error;
pub mod file;
pub mod filesystem;
pub mod merged;
pub mod mount;
pub mod path;
pub mod plugin;
pub mod plugins;
pub mod types;

pub use adapter::Adapter;
pub use adapters::{LocalAdapter, MemoryAdapter, TempAdapter};
pub use capability::{DiskSpaceCapability, HashCapability, LinkCapability, MimeCapability};
pub use config::{BackendConfig, FilesystemConfig, MountConfig};
pub use error::{FsError, FsResult};
pub use file::File;
pub use filesystem::Filesystem;
pub use merged::MergedAdapter;
pub use mount::{MergedEntry, MountInfo, MountTable};
pub use path::Pathname;
pub use plugin::{Plugin, PluginRegistry};
pub use plugins::{
    DiskSpaceFile, DiskSpaceFilesystem, DiskSpacePlugin, HashFile, HashPlugin, LinkFile,
    LinkPlugin, MimeFile, MimePlugin,
};
pub use stratafs_digest::HashAlgorithm;
pub use types::{DirEntry, FileAttr, FileType};
