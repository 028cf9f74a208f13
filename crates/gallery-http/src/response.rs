//! HTTP response types.

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: Self = Self(200);
    pub const NO_CONTENT: Self = Self(204);
    pub const BAD_REQUEST: Self = Self(400);
    pub const NOT_FOUND: Self = Self(404);
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    pub const PAYLOAD_TOO_LARGE: Self = Self(413);
    pub const UNSUPPORTED_MEDIA_TYPE: Self = Self(415);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Create a status code from its numeric value.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        Self(code)
    }

    /// The numeric value.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true for 4xx codes.
    #[must_use]
    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.0)
    }

    /// Returns true for 2xx codes.
    #[must_use]
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Standard reason phrase, if known.
    #[must_use]
    pub fn canonical_reason(self) -> Option<&'static str> {
        Some(match self.0 {
            200 => "OK",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            413 => "Payload Too Large",
            415 => "Unsupported Media Type",
            500 => "Internal Server Error",
            _ => return None,
        })
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.canonical_reason() {
            Some(reason) => write!(f, "{} {reason}", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    reason: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    /// Create an empty response with the given status.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            reason: None,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// A 200 response with a plain text body.
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body.into().into_bytes())
    }

    /// A 200 response with an HTML body.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self::new(StatusCode::OK)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(body.into().into_bytes())
    }

    /// A 200 response with raw bytes of the given content type.
    #[must_use]
    pub fn bytes(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK)
            .header("Content-Type", content_type)
            .body(body)
    }

    /// An error response whose reason phrase doubles as its text body.
    #[must_use]
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(status)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(message.clone().into_bytes())
            .reason(message)
    }

    /// Set a custom reason phrase.
    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the reason phrase, falling back to the canonical one.
    #[must_use]
    pub fn reason_phrase(&self) -> &str {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or_default()
    }

    /// Get a header value by name (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get all headers.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Get the body bytes.
    #[must_use]
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Serialize as an HTTP/1.1 response with a Content-Length header.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128 + self.body.len());
        out.extend_from_slice(
            format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), self.reason_phrase()).as_bytes(),
        );
        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(format!("Content-Length: {}\r\n\r\n", self.body.len()).as_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_helpers() {
        assert!(StatusCode::BAD_REQUEST.is_client_error());
        assert!(!StatusCode::OK.is_client_error());
        assert!(StatusCode::NO_CONTENT.is_success());
        assert_eq!(StatusCode::NOT_FOUND.to_string(), "404 Not Found");
        assert_eq!(StatusCode::from_u16(599).to_string(), "599");
    }

    #[test]
    fn error_response_carries_message() {
        let resp = Response::error(StatusCode::NOT_FOUND, "Resource not found");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.reason_phrase(), "Resource not found");
        assert_eq!(resp.body_bytes(), b"Resource not found");
    }

    #[test]
    fn serializes_http11() {
        let resp = Response::bytes("image/jpeg", vec![1, 2, 3]);
        let raw = resp.to_bytes();
        let text = String::from_utf8_lossy(&raw);
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Type: image/jpeg\r\n"));
        assert!(text.contains("Content-Length: 3\r\n\r\n"));
        assert!(raw.ends_with(&[1, 2, 3]));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = Response::text("hi");
        assert_eq!(
            resp.header_value("content-type"),
            Some("text/plain; charset=utf-8")
        );
    }
}
