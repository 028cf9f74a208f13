//! Multipart request handling.
//!
//! Bridges the transport and the decoder: extracts the boundary from the
//! request's `Content-Type`, bounds the body size, decodes, and attaches the
//! resulting form to the request. Failures become 4xx responses.

use gallery_multipart::{DEFAULT_MAX_PARTS, DecodeConfig, DecodeError, decode_with};

use crate::body::{BodyConfig, BodyError, validate_body_size};
use crate::request::Request;
use crate::response::{Response, StatusCode};

/// RFC 2046 recommends multipart boundary length <= 70 characters.
const MAX_BOUNDARY_LEN: usize = 70;

/// Default maximum multipart body size (50MB).
pub const DEFAULT_MAX_MULTIPART_SIZE: usize = 50 * 1024 * 1024;

/// Environment variable enabling strict decoding (`1` or `true`).
pub const STRICT_ENV: &str = "GALLERY_MULTIPART_STRICT";

/// Environment variable overriding the maximum multipart body size in bytes.
pub const MAX_BODY_SIZE_ENV: &str = "GALLERY_MAX_BODY_SIZE";

/// Errors extracting a boundary from a `Content-Type` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryError {
    /// The media type is not `multipart/form-data`.
    NotMultipart,
    /// Missing boundary parameter.
    MissingBoundary,
    /// Empty or overlong boundary.
    InvalidBoundary,
}

impl std::fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotMultipart => write!(f, "content type is not multipart/form-data"),
            Self::MissingBoundary => write!(f, "missing boundary in multipart Content-Type"),
            Self::InvalidBoundary => write!(f, "invalid multipart boundary"),
        }
    }
}

impl std::error::Error for BoundaryError {}

/// Parse boundary from Content-Type header.
///
/// Content-Type format: `multipart/form-data; boundary=----WebKitFormBoundary...`
///
/// The returned token has quotes stripped and no `--` prefix.
pub fn parse_boundary(content_type: &str) -> Result<String, BoundaryError> {
    let mut params = content_type.trim().split(';');
    let main = params.next().unwrap_or_default().trim();
    if !main.eq_ignore_ascii_case("multipart/form-data") {
        return Err(BoundaryError::NotMultipart);
    }

    for param in params {
        let Some((key, value)) = param.trim().split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("boundary") {
            let boundary = value.trim().trim_matches('"').trim_matches('\'');
            if boundary.is_empty() || boundary.len() > MAX_BOUNDARY_LEN {
                return Err(BoundaryError::InvalidBoundary);
            }
            return Ok(boundary.to_string());
        }
    }

    Err(BoundaryError::MissingBoundary)
}

/// Returns true if the content type names `multipart/form-data`.
#[must_use]
pub fn is_multipart(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|main| main.trim().eq_ignore_ascii_case("multipart/form-data"))
}

/// Options for multipart attachment.
#[derive(Debug, Clone)]
pub struct MultipartOptions {
    body: BodyConfig,
    decode: DecodeConfig,
}

impl Default for MultipartOptions {
    fn default() -> Self {
        Self {
            body: BodyConfig::new().with_max_size(DEFAULT_MAX_MULTIPART_SIZE),
            decode: DecodeConfig::default(),
        }
    }
}

impl MultipartOptions {
    /// Create options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from the process environment.
    ///
    /// | Variable | Effect |
    /// |----------|--------|
    /// | `GALLERY_MULTIPART_STRICT=1` / `true` | Strict decoding |
    /// | `GALLERY_MAX_BODY_SIZE=<bytes>` | Body size limit |
    ///
    /// Unset or unparseable values keep the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load options through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(value) = lookup(STRICT_ENV) {
            let value = value.trim();
            options = options.strict(value == "1" || value.eq_ignore_ascii_case("true"));
        }
        if let Some(value) = lookup(MAX_BODY_SIZE_ENV) {
            match value.trim().parse::<usize>() {
                Ok(size) => options = options.max_body_size(size),
                Err(_) => tracing::warn!(
                    variable = MAX_BODY_SIZE_ENV,
                    %value,
                    "ignoring unparseable body size"
                ),
            }
        }
        options
    }

    /// Set strict decoding.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.decode = self.decode.strict(strict);
        self
    }

    /// Set the maximum body size.
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.body = self.body.with_max_size(size);
        self
    }

    /// Set the maximum number of parts.
    #[must_use]
    pub fn max_parts(mut self, count: usize) -> Self {
        self.decode = self.decode.max_parts(count);
        self
    }

    /// Get the body limits.
    #[must_use]
    pub fn body_config(&self) -> &BodyConfig {
        &self.body
    }

    /// Get the decode configuration.
    #[must_use]
    pub fn decode_config(&self) -> &DecodeConfig {
        &self.decode
    }
}

/// Why a multipart request was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartRejection {
    /// No usable `Content-Type` header.
    ContentType(BoundaryError),
    /// The body is over the size limit.
    Body(BodyError),
    /// Decoding failed, or produced no fields.
    Decode(DecodeError),
}

impl MultipartRejection {
    /// The status code this rejection maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ContentType(BoundaryError::NotMultipart) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Body(BodyError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ContentType(_) | Self::Decode(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Render as a response.
    #[must_use]
    pub fn into_response(self) -> Response {
        Response::error(self.status(), self.to_string())
    }
}

impl std::fmt::Display for MultipartRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContentType(e) => write!(f, "{e}"),
            Self::Body(e) => write!(f, "{e}"),
            Self::Decode(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MultipartRejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ContentType(e) => Some(e),
            Self::Body(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<BoundaryError> for MultipartRejection {
    fn from(e: BoundaryError) -> Self {
        Self::ContentType(e)
    }
}

impl From<BodyError> for MultipartRejection {
    fn from(e: BodyError) -> Self {
        Self::Body(e)
    }
}

impl From<DecodeError> for MultipartRejection {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

/// Decode a multipart request body and attach the form to the request.
///
/// The body stays on the request. Parts skipped in lenient mode are logged
/// and do not fail the request; an empty result does.
pub fn decode_request(
    req: &mut Request,
    options: &MultipartOptions,
) -> Result<(), MultipartRejection> {
    let content_type = req
        .headers()
        .get("content-type")
        .ok_or(BoundaryError::NotMultipart)?;
    let boundary = parse_boundary(content_type)?;
    validate_body_size(req.body().len(), &options.body)?;

    let decoded = decode_with(req.body(), boundary.as_bytes(), &options.decode)?;
    for diagnostic in decoded.diagnostics() {
        tracing::warn!(
            path = req.path(),
            index = diagnostic.index,
            error = %diagnostic.error,
            "multipart part skipped"
        );
    }

    let form = decoded.into_form_checked()?;
    tracing::debug!(path = req.path(), fields = form.len(), "multipart form attached");
    req.set_form(form);
    Ok(())
}

/// Middleware form of [`decode_request`]: on failure, the response to send.
pub fn attach_multipart(req: &mut Request, options: &MultipartOptions) -> Result<(), Response> {
    decode_request(req, options).map_err(|rejection| {
        tracing::info!(path = req.path(), error = %rejection, "multipart request rejected");
        rejection.into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use gallery_multipart::FormEncoder;
    use std::collections::HashMap;

    #[test]
    fn test_parse_boundary() {
        let ct = "multipart/form-data; boundary=----WebKitFormBoundary7MA4YWxkTrZu0gW";
        assert_eq!(
            parse_boundary(ct).unwrap(),
            "----WebKitFormBoundary7MA4YWxkTrZu0gW"
        );
    }

    #[test]
    fn test_parse_boundary_quoted() {
        let ct = r#"multipart/form-data; boundary="simple""#;
        assert_eq!(parse_boundary(ct).unwrap(), "simple");
    }

    #[test]
    fn test_parse_boundary_case_insensitive_param_name() {
        let ct = "Multipart/Form-Data; charset=utf-8; BOUNDARY=abc";
        assert_eq!(parse_boundary(ct).unwrap(), "abc");
    }

    #[test]
    fn test_parse_boundary_missing() {
        assert_eq!(
            parse_boundary("multipart/form-data"),
            Err(BoundaryError::MissingBoundary)
        );
    }

    #[test]
    fn test_parse_boundary_rejects_empty_and_too_long() {
        assert_eq!(
            parse_boundary("multipart/form-data; boundary=\"\""),
            Err(BoundaryError::InvalidBoundary)
        );
        let long = format!("multipart/form-data; boundary={}", "a".repeat(71));
        assert_eq!(parse_boundary(&long), Err(BoundaryError::InvalidBoundary));
    }

    #[test]
    fn test_parse_boundary_wrong_content_type() {
        assert_eq!(
            parse_boundary("application/json"),
            Err(BoundaryError::NotMultipart)
        );
    }

    #[test]
    fn is_multipart_checks_media_type() {
        assert!(is_multipart("multipart/form-data; boundary=x"));
        assert!(!is_multipart("text/plain"));
    }

    #[test]
    fn options_from_lookup() {
        let vars = HashMap::from([
            (STRICT_ENV, "true".to_string()),
            (MAX_BODY_SIZE_ENV, "2048".to_string()),
        ]);
        let options = MultipartOptions::from_lookup(|key| vars.get(key).cloned());
        assert!(options.decode_config().is_strict());
        assert_eq!(options.body_config().max_size(), 2048);
    }

    #[test]
    fn options_from_lookup_ignores_garbage() {
        let options = MultipartOptions::from_lookup(|key| {
            (key == MAX_BODY_SIZE_ENV).then(|| "lots".to_string())
        });
        assert!(!options.decode_config().is_strict());
        assert_eq!(options.body_config().max_size(), DEFAULT_MAX_MULTIPART_SIZE);
        assert_eq!(options.decode_config().get_max_parts(), DEFAULT_MAX_PARTS);
    }

    fn upload(body: Vec<u8>, content_type: &str) -> Request {
        Request::new(Method::Post, "/upload")
            .with_header("Content-Type", content_type)
            .with_body(body)
    }

    #[test]
    fn attaches_form() {
        let encoder = FormEncoder::new("B");
        let content_type = encoder.content_type();
        let mut req = upload(encoder.text("class", "mage").finish(), &content_type);

        attach_multipart(&mut req, &MultipartOptions::default()).unwrap();
        assert_eq!(req.form().unwrap().text("class"), Some("mage"));
    }

    #[test]
    fn rejects_non_multipart() {
        let mut req = upload(b"{}".to_vec(), "application/json");
        let resp = attach_multipart(&mut req, &MultipartOptions::default()).unwrap_err();
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(req.form().is_none());
    }

    #[test]
    fn rejects_oversized_body() {
        let body = FormEncoder::new("B").text("a", &"x".repeat(64)).finish();
        let mut req = upload(body, "multipart/form-data; boundary=B");
        let options = MultipartOptions::new().max_body_size(16);
        let resp = attach_multipart(&mut req, &options).unwrap_err();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn rejects_empty_body() {
        let mut req = upload(Vec::new(), "multipart/form-data; boundary=B");
        let err = decode_request(&mut req, &MultipartOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            MultipartRejection::Decode(DecodeError::InvalidInput { .. })
        ));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejects_body_without_boundary() {
        let mut req = upload(b"not multipart at all".to_vec(), "multipart/form-data; boundary=B");
        let err = decode_request(&mut req, &MultipartOptions::default()).unwrap_err();
        assert_eq!(err, MultipartRejection::Decode(DecodeError::BoundaryNotFound));
    }

    #[test]
    fn strict_mode_rejects_bad_part() {
        let body = b"--B\r\nContent-Disposition: form-data\r\n\r\nx\r\n--B--".to_vec();
        let mut lenient = upload(body.clone(), "multipart/form-data; boundary=B");
        // Lenient: the only part is skipped, leaving an empty form.
        assert!(decode_request(&mut lenient, &MultipartOptions::default()).is_err());

        let mut strict = upload(body, "multipart/form-data; boundary=B");
        let err = decode_request(&mut strict, &MultipartOptions::new().strict(true)).unwrap_err();
        assert!(matches!(
            err,
            MultipartRejection::Decode(DecodeError::MalformedPart { index: 0, .. })
        ));
    }
}
