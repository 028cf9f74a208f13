//! Photo gallery web application toolkit.
//!
//! gallery ties together the pieces a small upload-and-browse site needs:
//!
//! - **Multipart uploads** decoded into a typed form before handlers run
//! - **Path routing** with `:param` captures and separate GET/POST tables
//! - **Static files** served from an in-memory table
//! - **Templates** rendered from JSON contexts
//!
//! # Quick Start
//!
//! ```
//! use gallery::{App, AppContext, Method, Request, Response};
//!
//! fn show(_ctx: &AppContext, req: &mut Request) -> Response {
//!     Response::text(format!("image {}", req.param("name").unwrap_or_default()))
//! }
//!
//! let app = App::builder().get("/images/:name", show).build().unwrap();
//! let resp = app.handle(Request::new(Method::Get, "/images/fern"));
//! assert_eq!(resp.body_bytes(), b"image fern");
//! ```
//!
//! # Crate Structure
//!
//! - [`gallery_multipart`]: Binary-safe multipart/form-data decoder
//! - [`gallery_http`]: Request/response model and multipart attachment
//! - [`gallery_router`]: Path-pattern router
//! - [`gallery_assets`]: Static file table and templates

#![forbid(unsafe_code)]

mod app;

// Re-export crates
pub use gallery_assets as assets;
pub use gallery_http as http;
pub use gallery_multipart as multipart;
pub use gallery_router as router;

pub use app::{App, AppBuilder, AppContext, Handler};

// Re-export commonly used types
pub use gallery_assets::{RenderError, StaticFiles, Templates};
pub use gallery_http::{Method, MultipartOptions, Request, Response, StatusCode};
pub use gallery_multipart::{DecodedForm, FieldValue, UploadedFile};
pub use gallery_router::RouteError;
