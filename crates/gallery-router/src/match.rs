//! Route matching result.

use std::collections::HashMap;

use gallery_http::{Method, Response, StatusCode};

use crate::route::Route;

/// A matched route with extracted parameters.
#[derive(Debug)]
pub struct RouteMatch<'a, H> {
    /// The matched route.
    pub route: &'a Route<H>,
    /// Extracted path parameters.
    pub params: Vec<(&'a str, &'a str)>,
}

impl<'a, H> RouteMatch<'a, H> {
    /// Get a parameter value by name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Owned copy of the parameters, for attaching to a request.
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }
}

/// Result of attempting to locate a route by path and method.
#[derive(Debug)]
pub enum RouteLookup<'a, H> {
    /// A route matched by path and method.
    Match(RouteMatch<'a, H>),
    /// No route matched the path.
    NotFound,
    /// The method has no route table.
    UnknownMethod { method: Method },
}

impl<H> RouteLookup<'_, H> {
    /// The response to send when no route matched, `None` for a match.
    #[must_use]
    pub fn fallback_response(&self) -> Option<Response> {
        match self {
            Self::Match(_) => None,
            Self::NotFound => Some(
                Response::new(StatusCode::NOT_FOUND).reason("Resource not found"),
            ),
            Self::UnknownMethod { method } => Some(Response::error(
                StatusCode::BAD_REQUEST,
                format!("Unknown method {method}"),
            )),
        }
    }
}
