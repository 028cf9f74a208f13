//! Application builder and request dispatch.

use gallery_assets::{StaticFiles, Templates};
use gallery_http::{
    Method, MultipartOptions, Request, Response, StatusCode, attach_multipart, is_multipart,
};
use gallery_router::{RouteError, RouteLookup, Router};
use serde::Serialize;
use serde_json::Value;

/// A boxed request handler.
pub type Handler = Box<dyn Fn(&AppContext, &mut Request) -> Response + Send + Sync>;

/// Shared, read-only application state handed to every handler.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    static_files: StaticFiles,
    templates: Templates,
}

impl AppContext {
    /// The static file table.
    #[must_use]
    pub fn static_files(&self) -> &StaticFiles {
        &self.static_files
    }

    /// The template table.
    #[must_use]
    pub fn templates(&self) -> &Templates {
        &self.templates
    }

    /// Render a template into an HTML response.
    ///
    /// A render failure is logged and becomes a 500.
    #[must_use]
    pub fn render(&self, name: &str, context: &Value) -> Response {
        render_response(name, self.templates.render(name, context))
    }

    /// Like [`render`](Self::render), for any serializable context.
    #[must_use]
    pub fn render_serialize<T: Serialize + ?Sized>(&self, name: &str, context: &T) -> Response {
        render_response(name, self.templates.render_serialize(name, context))
    }
}

fn render_response(name: &str, rendered: Result<String, gallery_assets::RenderError>) -> Response {
    match rendered {
        Ok(html) => Response::html(html),
        Err(error) => {
            tracing::error!(template = name, %error, "template render failed");
            Response::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// Builder for [`App`].
///
/// Route registration errors are held until [`build`](Self::build) so the
/// builder chain stays fluent.
#[must_use]
pub struct AppBuilder {
    routes: Vec<(Method, String, Handler)>,
    context: AppContext,
    multipart: MultipartOptions,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            context: AppContext::default(),
            multipart: MultipartOptions::default(),
        }
    }
}

impl AppBuilder {
    /// Create a builder with no routes and empty asset tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `method` and `pattern`.
    pub fn route<H>(mut self, method: Method, pattern: impl Into<String>, handler: H) -> Self
    where
        H: Fn(&AppContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.routes.push((method, pattern.into(), Box::new(handler)));
        self
    }

    /// Register a GET handler.
    pub fn get<H>(self, pattern: impl Into<String>, handler: H) -> Self
    where
        H: Fn(&AppContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.route(Method::Get, pattern, handler)
    }

    /// Register a POST handler.
    pub fn post<H>(self, pattern: impl Into<String>, handler: H) -> Self
    where
        H: Fn(&AppContext, &mut Request) -> Response + Send + Sync + 'static,
    {
        self.route(Method::Post, pattern, handler)
    }

    /// Serve files from this table on GET requests no route claims.
    pub fn with_static(mut self, files: StaticFiles) -> Self {
        self.context.static_files = files;
        self
    }

    /// Make these templates available to handlers.
    pub fn with_templates(mut self, templates: Templates) -> Self {
        self.context.templates = templates;
        self
    }

    /// Set the options used to decode multipart POST bodies.
    pub fn multipart_options(mut self, options: MultipartOptions) -> Self {
        self.multipart = options;
        self
    }

    /// Compile the routes and build the application.
    pub fn build(self) -> Result<App, RouteError> {
        let mut router = Router::new();
        for (method, pattern, handler) in self.routes {
            router.add(method, &pattern, handler)?;
        }
        tracing::debug!(
            routes = router.len(),
            static_files = self.context.static_files.len(),
            templates = self.context.templates.len(),
            "app built"
        );
        Ok(App {
            router,
            context: self.context,
            multipart: self.multipart,
        })
    }
}

/// A routed application.
pub struct App {
    router: Router<Handler>,
    context: AppContext,
    multipart: MultipartOptions,
}

impl App {
    /// Start building an application.
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Number of registered routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.router.len()
    }

    /// The state handed to handlers.
    #[must_use]
    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Dispatch one request.
    ///
    /// Multipart POST bodies are decoded and attached before routing; a body
    /// that fails to decode is answered without reaching a handler. GET
    /// requests that match no route fall back to the static file table.
    #[must_use]
    pub fn handle(&self, mut req: Request) -> Response {
        let method = req.method();
        if method == Method::Post
            && req.headers().get("content-type").is_some_and(is_multipart)
        {
            if let Err(resp) = attach_multipart(&mut req, &self.multipart) {
                return resp;
            }
        }

        let path = req.path().to_string();
        let resp = match self.router.lookup(method, &path) {
            RouteLookup::Match(m) => {
                req.set_params(m.params_map());
                (m.route.handler())(&self.context, &mut req)
            }
            miss => {
                let static_resp = if method == Method::Get {
                    self.context.static_files.serve(&path)
                } else {
                    None
                };
                static_resp
                    .or_else(|| miss.fallback_response())
                    .unwrap_or_else(|| Response::new(StatusCode::NOT_FOUND))
            }
        };
        tracing::debug!(%method, path = %path, status = %resp.status(), "request handled");
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello(_ctx: &AppContext, _req: &mut Request) -> Response {
        Response::text("hello")
    }

    #[test]
    fn builds_routes() {
        let app = App::builder().get("/", hello).post("/", hello).build().unwrap();
        assert_eq!(app.route_count(), 2);
    }

    #[test]
    fn build_reports_bad_pattern() {
        let err = App::builder().get("no-slash", hello).build().err().unwrap();
        assert!(matches!(err, RouteError::MissingLeadingSlash { .. }));
    }

    #[test]
    fn build_reports_unsupported_method() {
        let err = App::builder()
            .route(Method::Put, "/", hello)
            .build()
            .err()
            .unwrap();
        assert_eq!(err, RouteError::UnsupportedMethod { method: "PUT" });
    }

    #[test]
    fn render_failure_is_500() {
        let ctx = AppContext::default();
        let resp = ctx.render("missing.html", &Value::Null);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
