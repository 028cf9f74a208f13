//! HTTP request types.

use std::collections::HashMap;

use gallery_multipart::DecodedForm;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    /// Parse a method name, ignoring case.
    ///
    /// Returns `None` for methods this server does not know.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        const METHODS: [(&str, Method); 7] = [
            ("GET", Method::Get),
            ("HEAD", Method::Head),
            ("POST", Method::Post),
            ("PUT", Method::Put),
            ("DELETE", Method::Delete),
            ("PATCH", Method::Patch),
            ("OPTIONS", Method::Options),
        ];
        METHODS
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, method)| *method)
    }

    /// The canonical uppercase method name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP headers collection.
#[derive(Debug, Default, Clone)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    /// Create empty headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a header value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Insert a header.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner
            .insert(name.into().to_ascii_lowercase(), value.into());
    }

    /// Iterate over all headers as (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Returns the number of headers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// HTTP request.
///
/// The transport builds it with a fully buffered body. Middleware may attach
/// a decoded multipart form and the router attaches path parameters.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Headers,
    body: Vec<u8>,
    form: Option<DecodedForm>,
    params: HashMap<String, String>,
}

impl Request {
    /// Create a new request.
    ///
    /// A `?` in `target` splits off the query string.
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        let mut path = target.into();
        let query = path.find('?').map(|idx| {
            let query = path[idx + 1..].to_string();
            path.truncate(idx);
            query
        });
        Self {
            method,
            path,
            query,
            headers: Headers::new(),
            body: Vec::new(),
            form: None,
            params: HashMap::new(),
        }
    }

    /// Set a header, builder style.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set the body, builder style.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Get the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the query string.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Get the headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get mutable headers.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Get the body.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Take the body, leaving it empty.
    pub fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }

    /// Get the decoded multipart form, if one was attached.
    #[must_use]
    pub fn form(&self) -> Option<&DecodedForm> {
        self.form.as_ref()
    }

    /// Take the decoded form without cloning file data.
    pub fn take_form(&mut self) -> Option<DecodedForm> {
        self.form.take()
    }

    /// Attach a decoded multipart form.
    pub fn set_form(&mut self, form: DecodedForm) {
        self.form = Some(form);
    }

    /// Get a path parameter captured by the router.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Get all path parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Replace the path parameters.
    pub fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}
