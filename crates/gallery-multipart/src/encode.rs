//! Multipart body builder.
//!
//! Produces well-formed bodies in the shape the decoder reads. Used by tests,
//! benchmarks and clients that need to submit forms.

/// Builds a `multipart/form-data` body.
///
/// # Example
///
/// ```
/// use gallery_multipart::{FormEncoder, decode};
///
/// let body = FormEncoder::new("XyZ")
///     .text("class", "mage")
///     .file("image", "x.png", Some("image/png"), &[0x89, b'P', b'N', b'G'])
///     .finish();
///
/// let form = decode(&body, b"XyZ").unwrap().into_form();
/// assert_eq!(form.text("class"), Some("mage"));
/// assert_eq!(form.file("image").unwrap().data, [0x89, b'P', b'N', b'G']);
/// ```
#[derive(Debug, Clone)]
pub struct FormEncoder {
    boundary: String,
    buffer: Vec<u8>,
}

impl FormEncoder {
    /// Create an encoder for the given boundary token (without `--`).
    #[must_use]
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            buffer: Vec::new(),
        }
    }

    /// The boundary token this encoder writes.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `Content-Type` header value matching this body.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Append a text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part();
        self.buffer.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Append a file field. `content_type = None` omits the header.
    #[must_use]
    pub fn file(
        mut self,
        name: &str,
        filename: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Self {
        self.open_part();
        self.buffer.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        if let Some(content_type) = content_type {
            self.buffer
                .extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        self.buffer.extend_from_slice(b"\r\n");
        self.buffer.extend_from_slice(data);
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Write the terminal delimiter and return the body.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.buffer.extend_from_slice(b"--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
        self.buffer.extend_from_slice(b"--\r\n");
        self.buffer
    }

    fn open_part(&mut self) {
        self.buffer.extend_from_slice(b"--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
    }
}
