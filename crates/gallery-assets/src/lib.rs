//! Static files and templates for gallery_rust.
//!
//! Both tables are loaded up front and owned by the application. Handlers
//! receive them by reference; there is no global registry.
//!
//! ```
//! use gallery_assets::Templates;
//! use serde_json::json;
//!
//! let mut templates = Templates::new();
//! templates.insert("caption.html", "<p><%= caption %></p>");
//! let html = templates.render("caption.html", &json!({"caption": "fern"})).unwrap();
//! assert_eq!(html, "<p>fern</p>");
//! ```

#![forbid(unsafe_code)]

mod error;
mod static_files;
mod templates;

pub use error::AssetError;
pub use static_files::{StaticFile, StaticFiles, content_type_for};
pub use templates::{RenderError, Templates};
