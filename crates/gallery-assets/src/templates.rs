//! Template table and renderer.
//!
//! Templates are plain text with `<%= path %>` tags. A tag is replaced by the
//! value found at a dotted path inside a JSON context: `<%= title %>`,
//! `<%= image.filename %>`, `<%= images.0 %>`. A leading `context.` segment is
//! accepted and ignored. Tags are data lookups only; nothing is evaluated.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::AssetError;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<%=(.+?)%>").expect("valid template tag pattern"));

/// Errors rendering a template.
#[derive(Debug)]
pub enum RenderError {
    /// No template is loaded under this name.
    UnknownTemplate { name: String },
    /// A tag names a path that is absent from the context.
    MissingValue { template: String, path: String },
    /// The context could not be converted to JSON.
    Context(serde_json::Error),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTemplate { name } => write!(f, "unknown template {name:?}"),
            Self::MissingValue { template, path } => {
                write!(f, "template {template:?} references missing value {path:?}")
            }
            Self::Context(e) => write!(f, "invalid template context: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Context(e)
    }
}

/// Template sources keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    sources: HashMap<String, String>,
}

impl Templates {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from the files directly inside `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, AssetError> {
        let mut templates = Self::new();
        templates.load_dir(dir)?;
        Ok(templates)
    }

    /// Add the files directly inside `dir`. Subdirectories are not entered.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, AssetError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(AssetError::NotADirectory {
                path: dir.to_path_buf(),
            });
        }

        let mut added = 0;
        for entry in fs::read_dir(dir).map_err(|e| AssetError::io(dir, e))? {
            let entry = entry.map_err(|e| AssetError::io(dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let bytes = fs::read(&path).map_err(|e| AssetError::io(&path, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            self.insert(name, String::from_utf8_lossy(&bytes).into_owned());
            added += 1;
        }
        tracing::debug!(dir = %dir.display(), added, "templates loaded");
        Ok(added)
    }

    /// Add a template from source text.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) -> Option<String> {
        self.sources.insert(name.into(), source.into())
    }

    /// Returns true if a template is loaded under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Number of loaded templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if no templates are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Render `name` against a JSON context.
    ///
    /// String values are inserted as-is; other values as their JSON text.
    pub fn render(&self, name: &str, context: &Value) -> Result<String, RenderError> {
        let source = self
            .sources
            .get(name)
            .ok_or_else(|| RenderError::UnknownTemplate {
                name: name.to_string(),
            })?;

        let mut out = String::with_capacity(source.len());
        let mut last = 0;
        for caps in TAG_RE.captures_iter(source) {
            let (Some(tag), Some(expr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let path = expr.as_str().trim();
            let value = lookup(context, path).ok_or_else(|| RenderError::MissingValue {
                template: name.to_string(),
                path: path.to_string(),
            })?;
            out.push_str(&source[last..tag.start()]);
            match value {
                Value::String(s) => out.push_str(s),
                other => out.push_str(&other.to_string()),
            }
            last = tag.end();
        }
        out.push_str(&source[last..]);
        Ok(out)
    }

    /// Render `name` against any serializable context.
    pub fn render_serialize<T: Serialize + ?Sized>(
        &self,
        name: &str,
        context: &T,
    ) -> Result<String, RenderError> {
        let context = serde_json::to_value(context)?;
        self.render(name, &context)
    }
}

/// Resolve a dotted path. Numeric segments index arrays.
fn lookup<'v>(context: &'v Value, path: &str) -> Option<&'v Value> {
    let path = match path.strip_prefix("context") {
        Some("") => return Some(context),
        Some(rest) => rest.strip_prefix('.').unwrap_or(path),
        None => path,
    };
    if path.is_empty() {
        return None;
    }

    path.split('.').try_fold(context, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}
