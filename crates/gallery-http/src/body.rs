//! Request body limits.
//!
//! The multipart decoder reads a fully buffered body and never bounds it.
//! Bounding is the transport's job, done here before any decoding starts.
//!
//! # Example
//!
//! ```
//! use gallery_http::body::{BodyConfig, BodyError, validate_body_size};
//!
//! let config = BodyConfig::default().with_max_size(4);
//! assert!(validate_body_size(3, &config).is_ok());
//! assert!(matches!(
//!     validate_body_size(5, &config),
//!     Err(BodyError::TooLarge { size: 5, max: 4 })
//! ));
//! ```

/// Default maximum body size (1MB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Configuration for body reading.
#[derive(Debug, Clone)]
pub struct BodyConfig {
    /// Maximum body size in bytes.
    max_size: usize,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl BodyConfig {
    /// Create a new body configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn with_max_size(mut self, size: usize) -> Self {
        self.max_size = size;
        self
    }

    /// Returns the maximum body size.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

/// Error types for body handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    /// Body exceeds maximum allowed size.
    TooLarge {
        /// The actual size.
        size: usize,
        /// The maximum allowed size.
        max: usize,
    },
}

impl std::fmt::Display for BodyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge { size, max } => {
                write!(f, "body too large: {size} bytes exceeds limit of {max}")
            }
        }
    }
}

impl std::error::Error for BodyError {}

/// Validates a buffered body size against the configured limit.
///
/// # Errors
///
/// Returns `BodyError::TooLarge` if `size` exceeds the limit.
pub fn validate_body_size(size: usize, config: &BodyConfig) -> Result<(), BodyError> {
    if size > config.max_size {
        return Err(BodyError::TooLarge {
            size,
            max: config.max_size,
        });
    }
    Ok(())
}
