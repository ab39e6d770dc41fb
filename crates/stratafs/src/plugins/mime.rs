//! MIME detection plugin.
//!
//! Delegates to the adapter's mime capability when present; otherwise
//! guesses the type from the file extension and the encoding from a
//! content sniff. Always available, like the hash plugin.

use std::any::Any;

use crate::error::FsResult;
use crate::file::File;
use crate::plugin::Plugin;

const OCTET_STREAM: &str = "application/octet-stream";

/// Registry name: `mime`.
pub struct MimePlugin;

impl Plugin for MimePlugin {
    fn name(&self) -> &str {
        "mime"
    }

    fn provides_file_plugin(&self, _file: &File) -> bool {
        true
    }

    fn file_plugin(&self, file: &File) -> FsResult<Box<dyn Any + Send>> {
        Ok(Box::new(MimeFile { file: file.clone() }))
    }
}

/// File-scoped MIME accessor.
pub struct MimeFile {
    file: File,
}

impl MimeFile {
    /// Full MIME name, e.g. `text/plain; charset=us-ascii`.
    ///
    /// The charset parameter is only attached to `text/*` types.
    pub fn mime_name(&self) -> FsResult<String> {
        let p = self.file.pathname()?;
        if let Some(mime) = p.adapter().mime() {
            return mime.mime_name(p.local_path());
        }
        let mime_type = self.mime_type()?;
        if mime_type.starts_with("text/") {
            Ok(format!("{}; charset={}", mime_type, self.mime_encoding()?))
        } else {
            Ok(mime_type)
        }
    }

    /// MIME type, e.g. `text/plain`.
    pub fn mime_type(&self) -> FsResult<String> {
        let p = self.file.pathname()?;
        if let Some(mime) = p.adapter().mime() {
            return mime.mime_type(p.local_path());
        }
        Ok(type_from_name(self.file.name().unwrap_or_default()).to_string())
    }

    /// Content encoding: `us-ascii`, `utf-8` or `binary`.
    pub fn mime_encoding(&self) -> FsResult<String> {
        let p = self.file.pathname()?;
        if let Some(mime) = p.adapter().mime() {
            return mime.mime_encoding(p.local_path());
        }
        let data = p.adapter().read(p.local_path())?;
        Ok(sniff_encoding(&data).to_string())
    }
}

/// Extension-based type guess. Unknown extensions map to octet-stream.
fn type_from_name(name: &str) -> &'static str {
    let extension = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => return OCTET_STREAM,
    };
    match extension.to_ascii_lowercase().as_str() {
        "txt" | "log" | "cfg" | "conf" | "ini" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "xml" => "text/xml",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => OCTET_STREAM,
    }
}

fn sniff_encoding(data: &[u8]) -> &'static str {
    if data.iter().all(|b| b.is_ascii() && *b != 0) {
        "us-ascii"
    } else if std::str::from_utf8(data).is_ok() {
        "utf-8"
    } else {
        "binary"
    }
}
