//! Decode entrypoint, configuration and error surfacing.

use crate::form::DecodedForm;
use crate::part::{PartError, parse_part};
use crate::scan::Parts;

/// Default maximum number of parts examined per body.
pub const DEFAULT_MAX_PARTS: usize = 1000;

/// Configuration for a decode.
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    /// Abort on the first bad part instead of skipping it.
    strict: bool,
    /// Maximum number of parts to examine.
    max_parts: usize,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_parts: DEFAULT_MAX_PARTS,
        }
    }
}

impl DecodeConfig {
    /// Create a new configuration with default settings (lenient).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the maximum number of parts.
    #[must_use]
    pub fn max_parts(mut self, count: usize) -> Self {
        self.max_parts = count;
        self
    }

    /// Returns true if strict mode is enabled.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Get the maximum number of parts.
    #[must_use]
    pub fn get_max_parts(&self) -> usize {
        self.max_parts
    }
}

/// Errors that end a decode without a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Empty body or empty boundary.
    InvalidInput {
        /// Which input was empty.
        detail: &'static str,
    },
    /// The body holds no delimiter and therefore no fields.
    BoundaryNotFound,
    /// Delimiters were found but no part decoded into a field.
    EmptyForm,
    /// A part is structurally broken (strict mode).
    MalformedPart {
        /// Zero-based position of the part in the body.
        index: usize,
        /// What is wrong with the part.
        source: PartError,
    },
    /// A text part is not valid UTF-8 (strict mode).
    Encoding {
        /// Zero-based position of the part in the body.
        index: usize,
        /// The field and its UTF-8 error.
        source: PartError,
    },
    /// The body holds more parts than allowed (strict mode).
    TooManyParts {
        /// The configured part limit.
        max: usize,
    },
}

impl DecodeError {
    fn from_part(index: usize, source: PartError) -> Self {
        if source.is_malformed() {
            Self::MalformedPart { index, source }
        } else {
            Self::Encoding { index, source }
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { detail } => write!(f, "invalid multipart input: {detail}"),
            Self::BoundaryNotFound => write!(f, "multipart boundary not found in body"),
            Self::EmptyForm => write!(f, "multipart body contains no decodable fields"),
            Self::MalformedPart { index, source } => {
                write!(f, "malformed multipart part {index}: {source}")
            }
            Self::Encoding { index, source } => {
                write!(f, "undecodable multipart part {index}: {source}")
            }
            Self::TooManyParts { max } => write!(f, "too many multipart parts: limit is {max}"),
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedPart { source, .. } | Self::Encoding { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A part skipped during a lenient decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Zero-based position of the part in the body.
    pub index: usize,
    /// Why the part was skipped.
    pub error: DecodeError,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "part {} skipped: {}", self.index, self.error)
    }
}

/// Result of a successful decode.
#[derive(Debug, Clone, Default)]
pub struct Decoded {
    form: DecodedForm,
    diagnostics: Vec<Diagnostic>,
    boundary_found: bool,
}

impl Decoded {
    /// Get the decoded form.
    #[must_use]
    pub fn form(&self) -> &DecodedForm {
        &self.form
    }

    /// Consume and return the decoded form.
    #[must_use]
    pub fn into_form(self) -> DecodedForm {
        self.form
    }

    /// Consume and return the form, treating an empty result as an error.
    ///
    /// Callers that require at least one field use this to reject bodies
    /// whose boundary never appears or whose parts were all skipped.
    pub fn into_form_checked(self) -> Result<DecodedForm, DecodeError> {
        match (self.form.is_empty(), self.boundary_found) {
            (false, _) => Ok(self.form),
            (true, true) => Err(DecodeError::EmptyForm),
            (true, false) => Err(DecodeError::BoundaryNotFound),
        }
    }

    /// Get the per-part diagnostics collected in lenient mode.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns true if the boundary occurred anywhere in the body.
    #[must_use]
    pub fn boundary_found(&self) -> bool {
        self.boundary_found
    }

    /// Returns true if no field was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.form.is_empty()
    }

    /// Split into form and diagnostics.
    #[must_use]
    pub fn into_parts(self) -> (DecodedForm, Vec<Diagnostic>) {
        (self.form, self.diagnostics)
    }
}

/// Decode a multipart body with the default (lenient) configuration.
pub fn decode(body: &[u8], boundary: &[u8]) -> Result<Decoded, DecodeError> {
    decode_with(body, boundary, &DecodeConfig::default())
}

/// Decode a multipart body.
///
/// `boundary` is the bare token from the `Content-Type` header. In lenient
/// mode bad parts are skipped and reported through
/// [`Decoded::diagnostics`]; in strict mode the first bad part fails the
/// whole decode and no partial form is returned.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(body_len = body.len(), strict = config.is_strict())
)]
pub fn decode_with(
    body: &[u8],
    boundary: &[u8],
    config: &DecodeConfig,
) -> Result<Decoded, DecodeError> {
    if boundary.is_empty() {
        return Err(DecodeError::InvalidInput {
            detail: "empty boundary",
        });
    }
    if body.is_empty() {
        return Err(DecodeError::InvalidInput {
            detail: "empty body",
        });
    }

    let parts = Parts::new(body, boundary);
    let mut decoded = Decoded {
        boundary_found: parts.boundary_found(),
        ..Decoded::default()
    };

    for (index, part) in parts.enumerate() {
        if index >= config.max_parts {
            let error = DecodeError::TooManyParts {
                max: config.max_parts,
            };
            if config.strict {
                return Err(error);
            }
            tracing::warn!(index, max = config.max_parts, "multipart part limit reached");
            decoded.diagnostics.push(Diagnostic { index, error });
            break;
        }

        match parse_part(part) {
            Ok((name, value)) => {
                tracing::trace!(index, %name, file = value.is_file(), "decoded multipart part");
                decoded.form.insert(name, value);
            }
            Err(source) => {
                let error = DecodeError::from_part(index, source);
                if config.strict {
                    return Err(error);
                }
                tracing::warn!(index, error = %error, "skipping multipart part");
                decoded.diagnostics.push(Diagnostic { index, error });
            }
        }
    }

    tracing::debug!(
        boundary_found = decoded.boundary_found,
        fields = decoded.form.len(),
        skipped = decoded.diagnostics.len(),
        "multipart decode finished"
    );
    Ok(decoded)
}
