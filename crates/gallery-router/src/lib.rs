//! Path-pattern HTTP router.
//!
//! Routes are registered per method as `/`-separated patterns in which a
//! `:name` segment captures one word (`[A-Za-z0-9_]+`) of the request path.
//!
//! # Features
//!
//! - Separate GET and POST route tables, first registration wins
//! - Named path parameters (`/images/:name`)
//! - Optional trailing slash on every route
//! - 404 / 400 fallbacks for unmatched paths and unknown methods
//!
//! # Example
//!
//! ```
//! use gallery_http::Method;
//! use gallery_router::{RouteLookup, Router};
//!
//! let mut router = Router::new();
//! router.get("/images/:name", "show image").unwrap();
//!
//! match router.lookup(Method::Get, "/images/fern/") {
//!     RouteLookup::Match(m) => {
//!         assert_eq!(*m.route.handler(), "show image");
//!         assert_eq!(m.get_param("name"), Some("fern"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

#![warn(unsafe_code)]

mod r#match;
mod route;
mod router;

pub use r#match::{RouteLookup, RouteMatch};
pub use route::{Route, RouteError};
pub use router::Router;
