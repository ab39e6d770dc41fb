//! Content hashing plugin.
//!
//! Uses the adapter's hash capability when present (which may hash without
//! transferring content, e.g. on local disk with a streaming digest) and
//! otherwise falls back to reading the full content and digesting it in
//! memory. The fallback means this plugin extends every file.

use std::any::Any;

use stratafs_digest::HashAlgorithm;

use crate::error::FsResult;
use crate::file::File;
use crate::plugin::Plugin;

/// Registry name: `hash`.
pub struct HashPlugin;

impl Plugin for HashPlugin {
    fn name(&self) -> &str {
        "hash"
    }

    fn provides_file_plugin(&self, _file: &File) -> bool {
        true
    }

    fn file_plugin(&self, file: &File) -> FsResult<Box<dyn Any + Send>> {
        Ok(Box::new(HashFile { file: file.clone() }))
    }
}

/// File-scoped hashing accessor.
pub struct HashFile {
    file: File,
}

impl HashFile {
    /// Raw digest of the file content.
    pub fn hash(&self, algorithm: HashAlgorithm) -> FsResult<Vec<u8>> {
        let p = self.file.pathname()?;
        match p.adapter().hashes() {
            Some(hashes) => hashes.hash(p.local_path(), algorithm),
            None => {
                let data = p.adapter().read(p.local_path())?;
                Ok(stratafs_digest::digest(algorithm, &data))
            }
        }
    }

    /// Lowercase hex digest of the file content.
    pub fn hash_hex(&self, algorithm: HashAlgorithm) -> FsResult<String> {
        Ok(hex::encode(self.hash(algorithm)?))
    }
}
