//! Binary-safe `multipart/form-data` decoder.
//!
//! This crate turns a fully buffered request body and its boundary token into
//! a [`DecodedForm`]: a name → value map where each value is either plain text
//! or an uploaded file with its filename, content type and raw bytes.
//!
//! # Features
//!
//! - Boundary scanning over raw bytes (no UTF-8 assumption on part bodies)
//! - Lazy part segmentation with an explicit termination guard
//! - Per-part header parsing and field/file classification
//! - Lenient mode (skip malformed parts, keep diagnostics) and strict mode
//!
//! # Example
//!
//! ```
//! use gallery_multipart::{FieldValue, decode};
//!
//! let body = b"--B\r\nContent-Disposition: form-data; name=\"class\"\r\n\r\nmage\r\n--B--";
//! let decoded = decode(body, b"B")?;
//!
//! assert_eq!(decoded.form().text("class"), Some("mage"));
//! # Ok::<(), gallery_multipart::DecodeError>(())
//! ```
//!
//! # Caller obligations
//!
//! The decoder never reads incrementally. The transport must hand it the whole
//! body and must bound the body size beforehand.

#![forbid(unsafe_code)]

mod decode;
mod encode;
mod form;
mod part;
mod scan;
mod search;

pub use decode::{
    DEFAULT_MAX_PARTS, DecodeConfig, DecodeError, Decoded, Diagnostic, decode, decode_with,
};
pub use encode::FormEncoder;
pub use form::{DEFAULT_CONTENT_TYPE, DecodedForm, FieldValue, UploadedFile};
pub use part::{PartError, PartHeaders, parse_part};
pub use scan::Parts;
pub use search::find;
