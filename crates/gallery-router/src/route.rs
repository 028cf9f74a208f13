//! Route patterns.

use regex::Regex;

/// A registered route: a compiled path pattern plus its handler.
#[derive(Debug)]
pub struct Route<H> {
    pattern: String,
    regex: Regex,
    keys: Vec<String>,
    handler: H,
}

/// Errors registering a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Patterns must start with `/`.
    MissingLeadingSlash { pattern: String },
    /// A `:` segment without a name, or with a non-word name.
    InvalidParam { pattern: String, segment: String },
    /// The same parameter name appears twice.
    DuplicateParam { pattern: String, name: String },
    /// The compiled expression was rejected.
    Regex { pattern: String, detail: String },
    /// Only GET and POST tables exist.
    UnsupportedMethod { method: &'static str },
}

impl std::fmt::Display for RouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLeadingSlash { pattern } => {
                write!(f, "route pattern {pattern:?} must start with '/'")
            }
            Self::InvalidParam { pattern, segment } => {
                write!(f, "invalid parameter segment {segment:?} in {pattern:?}")
            }
            Self::DuplicateParam { pattern, name } => {
                write!(f, "parameter {name:?} repeated in {pattern:?}")
            }
            Self::Regex { pattern, detail } => {
                write!(f, "route pattern {pattern:?} failed to compile: {detail}")
            }
            Self::UnsupportedMethod { method } => {
                write!(f, "cannot register routes for method {method}")
            }
        }
    }
}

impl std::error::Error for RouteError {}

impl<H> Route<H> {
    /// Compile `pattern` into a route.
    pub fn new(pattern: impl Into<String>, handler: H) -> Result<Self, RouteError> {
        let pattern = pattern.into();
        if !pattern.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash { pattern });
        }

        let mut keys: Vec<String> = Vec::new();
        let mut source = String::from("^");
        let trimmed = pattern.trim_end_matches('/');
        for (idx, segment) in trimmed.split('/').enumerate() {
            if idx > 0 {
                source.push('/');
            }
            if let Some(name) = segment.strip_prefix(':') {
                if !is_word(name) {
                    return Err(RouteError::InvalidParam {
                        pattern: pattern.clone(),
                        segment: segment.to_string(),
                    });
                }
                if keys.iter().any(|k| k == name) {
                    return Err(RouteError::DuplicateParam {
                        pattern: pattern.clone(),
                        name: name.to_string(),
                    });
                }
                keys.push(name.to_string());
                source.push_str("([A-Za-z0-9_]+)");
            } else {
                source.push_str(&regex::escape(segment));
            }
        }
        source.push_str("/?$");

        let regex = Regex::new(&source).map_err(|e| RouteError::Regex {
            pattern: pattern.clone(),
            detail: e.to_string(),
        })?;

        Ok(Self {
            pattern,
            regex,
            keys,
            handler,
        })
    }

    /// The pattern this route was registered with.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Parameter names in pattern order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The route handler.
    #[must_use]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Match a request path, returning captured parameters in pattern order.
    #[must_use]
    pub fn matches<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map_or("", |m| m.as_str()))
                .collect(),
        )
    }
}

fn is_word(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
