//! Symbolic link plugin.
//!
//! No software fallback exists for links, so the probe only passes when
//! the file's resolved backing adapter implements the link capability.

use std::any::Any;

use crate::error::FsResult;
use crate::file::File;
use crate::plugin::Plugin;

/// Registry name: `link`.
pub struct LinkPlugin;

impl Plugin for LinkPlugin {
    fn name(&self) -> &str {
        "link"
    }

    fn provides_file_plugin(&self, file: &File) -> bool {
        file.pathname()
            .map(|p| p.adapter().links().is_some())
            .unwrap_or(false)
    }

    fn file_plugin(&self, file: &File) -> FsResult<Box<dyn Any + Send>> {
        Ok(Box::new(LinkFile { file: file.clone() }))
    }
}

/// File-scoped link accessor.
pub struct LinkFile {
    file: File,
}

impl LinkFile {
    /// Whether the file is a symbolic link.
    pub fn is_link(&self) -> FsResult<bool> {
        self.file.is_link()
    }

    /// The link target, or `None` when the file is not a link.
    pub fn link_target(&self) -> FsResult<Option<String>> {
        self.file.link_target()
    }
}
