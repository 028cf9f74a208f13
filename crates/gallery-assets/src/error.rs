//! Asset loading errors.

use std::io;
use std::path::PathBuf;

/// Error loading assets from disk.
#[derive(Debug)]
pub enum AssetError {
    /// Reading a file or directory failed.
    Io { path: PathBuf, source: io::Error },
    /// The path given to a loader is not a directory.
    NotADirectory { path: PathBuf },
}

impl AssetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::NotADirectory { path } => write!(f, "{} is not a directory", path.display()),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NotADirectory { .. } => None,
        }
    }
}
