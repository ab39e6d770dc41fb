//! Built-in plugins.
//!
//! Hash and MIME carry a software fallback and probe true for every file;
//! link and disk-space only probe true when the file's resolved backing
//! adapter implements the matching capability interface.

mod disk_space;
mod hash;
mod link;
mod mime;

pub use disk_space::{DiskSpaceFile, DiskSpaceFilesystem, DiskSpacePlugin};
pub use hash::{HashFile, HashPlugin};
pub use link::{LinkFile, LinkPlugin};
pub use mime::{MimeFile, MimePlugin};
