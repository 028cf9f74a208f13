//! Method-keyed route tables.

use gallery_http::Method;

use crate::r#match::{RouteLookup, RouteMatch};
use crate::route::{Route, RouteError};

/// Router holding one route table per supported method.
///
/// `H` is whatever the application dispatches to; the router only stores it.
#[derive(Debug)]
pub struct Router<H> {
    get_routes: Vec<Route<H>>,
    post_routes: Vec<Route<H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self {
            get_routes: Vec::new(),
            post_routes: Vec::new(),
        }
    }
}

impl<H> Router<H> {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a GET route.
    pub fn get(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.add(Method::Get, pattern, handler)
    }

    /// Register a POST route.
    pub fn post(&mut self, pattern: &str, handler: H) -> Result<(), RouteError> {
        self.add(Method::Post, pattern, handler)
    }

    /// Register a route for `method`.
    pub fn add(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), RouteError> {
        let route = Route::new(pattern, handler)?;
        let table = self
            .table_mut(method)
            .ok_or(RouteError::UnsupportedMethod {
                method: method.as_str(),
            })?;
        tracing::debug!(%method, pattern, "route registered");
        table.push(route);
        Ok(())
    }

    /// Find the first route registered for `method` whose pattern matches.
    #[must_use]
    pub fn lookup<'a>(&'a self, method: Method, path: &'a str) -> RouteLookup<'a, H> {
        let Some(table) = self.table(method) else {
            return RouteLookup::UnknownMethod { method };
        };
        let path = path.split_once('?').map_or(path, |(path, _)| path);

        for route in table {
            if let Some(values) = route.matches(path) {
                let params = route
                    .keys()
                    .iter()
                    .map(String::as_str)
                    .zip(values)
                    .collect();
                return RouteLookup::Match(RouteMatch { route, params });
            }
        }
        RouteLookup::NotFound
    }

    /// Number of registered routes across all methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.get_routes.len() + self.post_routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self, method: Method) -> Option<&[Route<H>]> {
        match method {
            Method::Get => Some(&self.get_routes),
            Method::Post => Some(&self.post_routes),
            _ => None,
        }
    }

    fn table_mut(&mut self, method: Method) -> Option<&mut Vec<Route<H>>> {
        match method {
            Method::Get => Some(&mut self.get_routes),
            Method::Post => Some(&mut self.post_routes),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery_router() -> Router<&'static str> {
        let mut router = Router::new();
        router.get("/", "index").unwrap();
        router.get("/images/:name", "image").unwrap();
        router.get("/images/chess", "never reached").unwrap();
        router.post("/upload", "upload").unwrap();
        router
    }

    fn handler_of(lookup: &RouteLookup<'_, &'static str>) -> Option<&'static str> {
        match lookup {
            RouteLookup::Match(m) => Some(*m.route.handler()),
            _ => None,
        }
    }

    #[test]
    fn tables_are_per_method() {
        let router = gallery_router();
        assert_eq!(router.len(), 4);
        assert_eq!(handler_of(&router.lookup(Method::Post, "/upload")), Some("upload"));
        assert!(matches!(
            router.lookup(Method::Get, "/upload"),
            RouteLookup::NotFound
        ));
        assert!(matches!(
            router.lookup(Method::Post, "/"),
            RouteLookup::NotFound
        ));
    }

    #[test]
    fn first_registration_wins() {
        let router = gallery_router();
        let lookup = router.lookup(Method::Get, "/images/chess");
        assert_eq!(handler_of(&lookup), Some("image"));
        if let RouteLookup::Match(m) = lookup {
            assert_eq!(m.get_param("name"), Some("chess"));
        }
    }

    #[test]
    fn query_is_ignored() {
        let router = gallery_router();
        assert_eq!(
            handler_of(&router.lookup(Method::Get, "/images/fern?size=large")),
            Some("image")
        );
    }

    #[test]
    fn unknown_method() {
        let router = gallery_router();
        assert!(matches!(
            router.lookup(Method::Put, "/"),
            RouteLookup::UnknownMethod {
                method: Method::Put
            }
        ));
    }

    #[test]
    fn cannot_register_other_methods() {
        let mut router: Router<()> = Router::new();
        assert_eq!(
            router.add(Method::Delete, "/x", ()),
            Err(RouteError::UnsupportedMethod { method: "DELETE" })
        );
        assert!(router.is_empty());
    }

    #[test]
    fn invalid_pattern_is_not_registered() {
        let mut router: Router<()> = Router::new();
        assert!(router.get("/images/:", ()).is_err());
        assert!(router.is_empty());
    }
}
