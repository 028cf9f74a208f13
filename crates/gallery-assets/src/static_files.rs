//! In-memory static file table.
//!
//! Files are read once, when the table is built, and served from memory
//! afterwards. Lookups never touch the filesystem, so a request path can only
//! name a file that was loaded.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use gallery_http::Response;

use crate::error::AssetError;

/// A loaded static file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFile {
    /// Content type derived from the file extension.
    pub content_type: &'static str,
    /// File contents.
    pub data: Vec<u8>,
}

/// Table of static files keyed by `dir/relative/path`.
#[derive(Debug, Clone, Default)]
pub struct StaticFiles {
    files: HashMap<String, StaticFile>,
}

impl StaticFiles {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from every file under `dir`, recursively.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let mut files = Self::new();
        files.load_dir(dir)?;
        Ok(files)
    }

    /// Add every file under `dir`, recursively.
    ///
    /// Keys are the directory as given followed by the path inside it, joined
    /// with `/`. Loading `public` yields keys like `public/css/site.css`.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, AssetError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(AssetError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
        let prefix = dir.to_string_lossy().trim_end_matches('/').to_string();
        let before = self.files.len();
        self.walk(dir, &prefix)?;
        let added = self.files.len() - before;
        tracing::debug!(dir = %dir.display(), added, "static files loaded");
        Ok(added)
    }

    fn walk(&mut self, dir: &Path, prefix: &str) -> Result<(), AssetError> {
        let entries = fs::read_dir(dir).map_err(|e| AssetError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| AssetError::io(dir, e))?;
            let path = entry.path();
            let key = format!("{prefix}/{}", entry.file_name().to_string_lossy());
            let file_type = entry.file_type().map_err(|e| AssetError::io(&path, e))?;
            if file_type.is_dir() {
                self.walk(&path, &key)?;
            } else if file_type.is_file() {
                let data = fs::read(&path).map_err(|e| AssetError::io(&path, e))?;
                self.insert(key, data);
            }
        }
        Ok(())
    }

    /// Add a single file under `key`, typed by the key's extension.
    ///
    /// A leading `/` is dropped so keys from absolute directories match
    /// request paths.
    pub fn insert(&mut self, key: impl Into<String>, data: Vec<u8>) -> Option<StaticFile> {
        let mut key = key.into();
        if key.starts_with('/') {
            key = key.trim_start_matches('/').to_string();
        }
        let content_type = content_type_for(&key);
        tracing::trace!(key = %key, content_type, size = data.len(), "static file added");
        self.files.insert(key, StaticFile { content_type, data })
    }

    /// Look up a file by key. A leading `/` is ignored.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&StaticFile> {
        self.files.get(path.trim_start_matches('/'))
    }

    /// Returns true if a file is loaded under `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Build a 200 response for a loaded file.
    #[must_use]
    pub fn serve(&self, path: &str) -> Option<Response> {
        let file = self.get(path)?;
        Some(Response::bytes(file.content_type, file.data.clone()))
    }

    /// Iterate over the loaded keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of loaded files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Content type for a file path, from the text after its last `.`.
#[must_use]
pub fn content_type_for(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map_or("", |(_, ext)| ext);
    match extension.to_ascii_lowercase().as_str() {
        "css" => "text/css",
        "js" => "text/javascript",
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "tiff" => "image/tiff",
        "svg" => "image/svg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_http::StatusCode;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("public/site.css"), "text/css");
        assert_eq!(content_type_for("public/app.js"), "text/javascript");
        assert_eq!(content_type_for("images/fern.jpg"), "image/jpeg");
        assert_eq!(content_type_for("images/fern.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("images/chess.png"), "image/png");
        assert_eq!(content_type_for("icons/logo.svg"), "image/svg");
        assert_eq!(content_type_for("public/index.html"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn test_insert_and_serve() {
        let mut files = StaticFiles::new();
        files.insert("public/site.css", b"body {}".to_vec());

        assert!(files.contains("public/site.css"));
        assert!(files.contains("/public/site.css"));
        assert!(!files.contains("public/other.css"));

        let resp = files.serve("/public/site.css").unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.header_value("content-type"), Some("text/css"));
        assert_eq!(resp.body_bytes(), b"body {}");
    }

    #[test]
    fn test_absolute_key_is_servable() {
        let mut files = StaticFiles::new();
        files.insert("/srv/gallery/fern.jpg", vec![0xFF, 0xD8]);
        assert_eq!(files.keys().collect::<Vec<_>>(), ["srv/gallery/fern.jpg"]);
        assert!(files.serve("/srv/gallery/fern.jpg").is_some());
    }

    #[test]
    fn test_serve_unknown() {
        let files = StaticFiles::new();
        assert!(files.serve("/public/../Cargo.toml").is_none());
    }
}
