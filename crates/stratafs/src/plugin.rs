//! Capability plugin contract and registry.
//!
//! A plugin extends files or whole filesystems with optional behavior. The
//! contract is probe-then-construct: `provides_*` is a cheap, side-effect-
//! free capability check against the target's *resolved* adapter, and the
//! matching constructor must succeed whenever the probe returned true.
//!
//! Plugins with a software fallback (hash, MIME) probe true for every file;
//! plugins that only make sense with backend support (links, disk space)
//! probe true only when the capability interface is present.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::any::Any;
use std::sync::Arc;

use crate::error::{FsError, FsResult};
use crate::file::File;
use crate::filesystem::Filesystem;

/// A named extension that can produce file- or filesystem-scoped accessors.
///
/// Accessor objects are constructed lazily per call and hold only a handle
/// to the file/filesystem they extend; they are never cached by the core.
pub trait Plugin: Send + Sync {
    /// Unique registry name.
    fn name(&self) -> &str;

    /// Whether this plugin can extend the given file.
    fn provides_file_plugin(&self, file: &File) -> bool {
        let _ = file;
        false
    }

    /// Construct the file-scoped accessor. Must succeed when
    /// [`Plugin::provides_file_plugin`] returned true.
    fn file_plugin(&self, file: &File) -> FsResult<Box<dyn Any + Send>> {
        Err(FsError::unsupported_plugin(self.name(), file.path()))
    }

    /// Whether this plugin can extend the given filesystem.
    fn provides_filesystem_plugin(&self, filesystem: &Filesystem) -> bool {
        let _ = filesystem;
        false
    }

    /// Construct the filesystem-scoped accessor. Must succeed when
    /// [`Plugin::provides_filesystem_plugin`] returned true.
    fn filesystem_plugin(&self, filesystem: &Filesystem) -> FsResult<Box<dyn Any + Send>> {
        let _ = filesystem;
        Err(FsError::unsupported_plugin(self.name(), "/"))
    }
}

/// Name-keyed plugin registry, owned by the filesystem facade.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: RwLock<IndexMap<String, Arc<dyn Plugin>>>,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its own name.
    ///
    /// Returns the previously registered plugin of the same name, if any
    /// (map-insert semantics; names stay unique).
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Option<Arc<dyn Plugin>> {
        let name = plugin.name().to_string();
        self.plugins.write().insert(name, plugin)
    }

    /// Remove a plugin by name, returning it if it was registered.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.write().shift_remove(name)
    }

    /// Look up a plugin by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.read().get(name).cloned()
    }

    /// Registered plugin names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.plugins.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullPlugin {
        name: &'static str,
    }

    impl Plugin for NullPlugin {
        fn name(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn test_register_lookup_unregister() {
        let registry = PluginRegistry::new();
        assert!(registry.register(Arc::new(NullPlugin { name: "a" })).is_none());
        assert!(registry.get("a").is_some());
        assert!(registry.get("b").is_none());
        assert!(registry.unregister("a").is_some());
        assert!(registry.unregister("a").is_none());
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let registry = PluginRegistry::new();
        registry.register(Arc::new(NullPlugin { name: "x" }));
        let previous = registry.register(Arc::new(NullPlugin { name: "x" }));
        assert!(previous.is_some());
        assert_eq!(registry.names(), vec!["x"]);
    }
}
