//! Request model and multipart plumbing.
//!
//! This crate is the transport-facing side of gallery_rust. It models a
//! buffered HTTP request and response and connects requests to the
//! multipart decoder.
//!
//! # Features
//!
//! - Request/response types with case-insensitive headers
//! - Body size limits, enforced before decoding
//! - `Content-Type` boundary extraction
//! - Multipart form attachment with 4xx mapping of failures
//!
//! # Example
//!
//! ```
//! use gallery_http::{Method, MultipartOptions, Request, attach_multipart};
//!
//! let body = b"--B\r\nContent-Disposition: form-data; name=\"class\"\r\n\r\nmage\r\n--B--";
//! let mut req = Request::new(Method::Post, "/upload")
//!     .with_header("Content-Type", "multipart/form-data; boundary=B")
//!     .with_body(body.to_vec());
//!
//! attach_multipart(&mut req, &MultipartOptions::default()).unwrap();
//! assert_eq!(req.form().unwrap().text("class"), Some("mage"));
//! ```

#![deny(unsafe_code)]

pub mod body;
pub mod multipart;
mod request;
mod response;

pub use body::{BodyConfig, BodyError, DEFAULT_MAX_BODY_SIZE, validate_body_size};
pub use multipart::{
    BoundaryError, DEFAULT_MAX_MULTIPART_SIZE, MultipartOptions, MultipartRejection,
    attach_multipart, decode_request, is_multipart, parse_boundary,
};
pub use request::{Headers, Method, Request};
pub use response::{Response, StatusCode};
