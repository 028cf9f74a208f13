//! Per-part header parsing and field/file classification.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::form::{DEFAULT_CONTENT_TYPE, FieldValue, UploadedFile};
use crate::search::find;

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

// Attribute keys are matched case-insensitively and must start a parameter,
// so `filename="..."` never satisfies `name="..."`.
static NAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[;\s])(?i:name)="([A-Za-z0-9_\-]+)""#).expect("valid name pattern")
});

static FILENAME_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[;\s])(?i:filename)="([A-Za-z0-9_\-.]+)""#)
        .expect("valid filename pattern")
});

// Any non-empty quoted filename, used to tell a rejected filename apart from
// an absent one.
static FILENAME_ANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[;\s])(?i:filename)="([^"]+)""#).expect("valid filename pattern")
});

static CONTENT_TYPE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_\-/.+]+)").expect("valid content type pattern"));

/// Why a single part could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartError {
    /// No blank line separates the header block from the value.
    MissingHeaderTerminator,
    /// Content-Disposition carries no usable `name` attribute.
    MissingName,
    /// Content-Disposition carries more than one `name` attribute.
    DuplicateName,
    /// A `filename` attribute is present but holds characters outside
    /// letters, digits, `_`, `-` and `.`.
    InvalidFilename {
        /// The field name.
        name: String,
        /// The filename as sent.
        filename: String,
    },
    /// A text field value is not valid UTF-8.
    Encoding {
        /// The field name.
        name: String,
        /// The underlying UTF-8 error.
        source: std::str::Utf8Error,
    },
}

impl PartError {
    /// Returns true for structural failures, as opposed to value encoding.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Encoding { .. })
    }
}

impl std::fmt::Display for PartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeaderTerminator => write!(f, "missing blank line after part headers"),
            Self::MissingName => write!(f, "missing name"),
            Self::DuplicateName => write!(f, "more than one name attribute"),
            Self::InvalidFilename { name, filename } => {
                write!(f, "field {name:?} has unsupported filename {filename:?}")
            }
            Self::Encoding { name, source } => {
                write!(f, "field {name:?} is not valid UTF-8: {source}")
            }
        }
    }
}

impl std::error::Error for PartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encoding { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Headers of a single part.
///
/// Names are stored lowercased so lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartHeaders {
    inner: HashMap<String, String>,
}

impl PartHeaders {
    /// Parse a CRLF-separated header block.
    ///
    /// Lines without a colon are ignored. A repeated header keeps its last
    /// value. Invalid UTF-8 is replaced rather than rejected since only ASCII
    /// tokens are ever extracted.
    #[must_use]
    pub fn parse(block: &[u8]) -> Self {
        let text = String::from_utf8_lossy(block);
        let inner = text
            .split("\r\n")
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();
        Self { inner }
    }

    /// Get a header value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
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

    fn disposition(&self) -> &str {
        self.get("content-disposition").unwrap_or_default()
    }

    fn name(&self) -> Result<String, PartError> {
        let mut names = NAME_ATTR.captures_iter(self.disposition());
        let name = names.next().ok_or(PartError::MissingName)?;
        if names.next().is_some() {
            return Err(PartError::DuplicateName);
        }
        Ok(name[1].to_string())
    }

    fn filename(&self, name: &str) -> Result<Option<String>, PartError> {
        let disposition = self.disposition();
        if let Some(caps) = FILENAME_ATTR.captures(disposition) {
            return Ok(Some(caps[1].to_string()));
        }
        match FILENAME_ANY.captures(disposition) {
            Some(caps) => Err(PartError::InvalidFilename {
                name: name.to_string(),
                filename: caps[1].to_string(),
            }),
            None => Ok(None),
        }
    }

    fn content_type(&self) -> Option<String> {
        let value = self.get("content-type")?;
        CONTENT_TYPE_VALUE
            .captures(value)
            .map(|caps| caps[1].to_string())
    }
}

/// Decode one raw part into its field name and value.
///
/// The header block ends at the first blank line. A part with a `filename`
/// attribute becomes a file whose bytes are copied verbatim; anything else is
/// a text field and must be valid UTF-8.
pub fn parse_part(part: &[u8]) -> Result<(String, FieldValue), PartError> {
    let split = find(part, HEADER_TERMINATOR, 0).ok_or(PartError::MissingHeaderTerminator)?;
    let headers = PartHeaders::parse(&part[..split]);
    let value = &part[split + HEADER_TERMINATOR.len()..];

    let name = headers.name()?;

    if let Some(filename) = headers.filename(&name)? {
        let content_type = headers
            .content_type()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let file = UploadedFile {
            filename,
            content_type,
            data: value.to_vec(),
        };
        return Ok((name, FieldValue::File(file)));
    }

    match std::str::from_utf8(value) {
        Ok(text) => Ok((name, FieldValue::Text(text.to_string()))),
        Err(source) => Err(PartError::Encoding { name, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_case_insensitive() {
        let headers = PartHeaders::parse(
            b"content-disposition: form-data; name=\"a\"\r\nCONTENT-TYPE:  text/plain  ",
        );
        assert_eq!(headers.len(), 2);
        assert_eq!(
            headers.get("Content-Disposition"),
            Some("form-data; name=\"a\"")
        );
        assert_eq!(headers.get("content-type"), Some("text/plain"));
    }

    #[test]
    fn header_lines_without_colon_are_ignored() {
        let headers = PartHeaders::parse(b"garbage line\r\nX-Extra: 1");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-extra"), Some("1"));
    }

    #[test]
    fn parses_text_field() {
        let (name, value) =
            parse_part(b"Content-Disposition: form-data; name=\"class\"\r\n\r\nmage").unwrap();
        assert_eq!(name, "class");
        assert_eq!(value, FieldValue::Text("mage".into()));
    }

    #[test]
    fn empty_text_value() {
        let (name, value) =
            parse_part(b"Content-Disposition: form-data; name=\"note\"\r\n\r\n").unwrap();
        assert_eq!(name, "note");
        assert_eq!(value.as_text(), Some(""));
    }

    #[test]
    fn parses_file_field() {
        let part = b"Content-Disposition: form-data; name=\"image\"; filename=\"x.png\"\r\n\
Content-Type: image/png\r\n\r\n\x89PNG\r\n\x1a\n\x00";
        let (name, value) = parse_part(part).unwrap();
        assert_eq!(name, "image");
        let file = value.as_file().unwrap();
        assert_eq!(file.filename, "x.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.data, b"\x89PNG\r\n\x1a\n\x00");
    }

    #[test]
    fn file_without_content_type_defaults() {
        let part = b"Content-Disposition: form-data; name=\"image\"; filename=\"a.png\"\r\n\r\nxx";
        let (_, value) = parse_part(part).unwrap();
        assert_eq!(value.as_file().unwrap().content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn content_type_parameters_are_dropped() {
        let part = b"Content-Disposition: form-data; name=\"doc\"; filename=\"a.svg\"\r\n\
Content-Type: image/svg+xml; charset=utf-8\r\n\r\n<svg/>";
        let (_, value) = parse_part(part).unwrap();
        assert_eq!(value.as_file().unwrap().content_type, "image/svg+xml");
    }

    #[test]
    fn binary_file_is_not_utf8_decoded() {
        let part = b"Content-Disposition: form-data; name=\"blob\"; filename=\"b.bin\"\r\n\r\n\xff\xfe";
        let (_, value) = parse_part(part).unwrap();
        assert_eq!(value.as_file().unwrap().data, vec![0xff, 0xfe]);
    }

    #[test]
    fn filename_alone_does_not_count_as_name() {
        let part = b"Content-Disposition: form-data; filename=\"x.png\"\r\n\r\ndata";
        assert_eq!(parse_part(part), Err(PartError::MissingName));
    }

    #[test]
    fn missing_disposition_is_missing_name() {
        let part = b"Content-Type: text/plain\r\n\r\nhello";
        assert_eq!(parse_part(part), Err(PartError::MissingName));
    }

    #[test]
    fn name_with_disallowed_characters_is_rejected() {
        let part = b"Content-Disposition: form-data; name=\"my field\"\r\n\r\nv";
        assert_eq!(parse_part(part), Err(PartError::MissingName));
    }

    #[test]
    fn duplicate_name_attribute_is_rejected() {
        let part = b"Content-Disposition: form-data; name=\"a\"; name=\"b\"\r\n\r\nv";
        assert_eq!(parse_part(part), Err(PartError::DuplicateName));
    }

    #[test]
    fn mixed_case_attribute_keys() {
        let part = b"Content-Disposition: form-data; NAME=\"upload\"; FileName=\"r.txt\"\r\n\r\nv";
        let (name, value) = parse_part(part).unwrap();
        assert_eq!(name, "upload");
        assert_eq!(value.as_file().unwrap().filename, "r.txt");
    }

    #[test]
    fn unsupported_filename_is_reported() {
        let part = b"Content-Disposition: form-data; name=\"image\"; filename=\"my photo.png\"\r\n\
Content-Type: image/png\r\n\r\n\x89PNG\r\n\x1a\n";
        let err = parse_part(part).unwrap_err();
        assert_eq!(
            err,
            PartError::InvalidFilename {
                name: "image".into(),
                filename: "my photo.png".into(),
            }
        );
        assert!(err.is_malformed());
    }

    #[test]
    fn empty_filename_is_a_text_field() {
        let part = b"Content-Disposition: form-data; name=\"image\"; filename=\"\"\r\n\r\n";
        let (_, value) = parse_part(part).unwrap();
        assert_eq!(value.as_text(), Some(""));
    }

    #[test]
    fn missing_terminator() {
        let part = b"Content-Disposition: form-data; name=\"a\"\r\nvalue";
        assert_eq!(parse_part(part), Err(PartError::MissingHeaderTerminator));
    }

    #[test]
    fn invalid_utf8_text_value() {
        let part = b"Content-Disposition: form-data; name=\"bad\"\r\n\r\n\xc3\x28";
        let err = parse_part(part).unwrap_err();
        assert!(matches!(&err, PartError::Encoding { name, .. } if name == "bad"));
        assert!(!err.is_malformed());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn value_may_contain_blank_lines() {
        let part = b"Content-Disposition: form-data; name=\"text\"\r\n\r\nline1\r\n\r\nline2";
        let (_, value) = parse_part(part).unwrap();
        assert_eq!(value.as_text(), Some("line1\r\n\r\nline2"));
    }
}
