//! Decoded form values.

use std::collections::HashMap;
use std::collections::hash_map;

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Content type assigned to file parts that carry no usable `Content-Type`.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// An uploaded file taken from a part with a `filename` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// The original filename.
    pub filename: String,
    /// Content-Type of the file.
    pub content_type: String,
    /// Raw bytes exactly as they appeared in the body.
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Get the file size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Get the file extension from the filename.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.filename
            .rsplit('.')
            .next()
            .filter(|ext| !ext.is_empty() && *ext != self.filename)
    }
}

// File bytes never leave through serialization, only their metadata.
impl Serialize for UploadedFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("UploadedFile", 3)?;
        state.serialize_field("filename", &self.filename)?;
        state.serialize_field("content_type", &self.content_type)?;
        state.serialize_field("size", &self.size())?;
        state.end()
    }
}

/// The decoded value of one part.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// An ordinary form field.
    Text(String),
    /// A file upload.
    File(UploadedFile),
}

impl FieldValue {
    /// Returns true if this value is a file upload.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Get the text of an ordinary field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    /// Get the uploaded file of a file field.
    #[must_use]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            Self::Text(_) => None,
        }
    }
}

/// Field name → value mapping produced by a decode.
///
/// Names are unique; inserting an existing name replaces its value, so the
/// last part with a given name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct DecodedForm {
    entries: HashMap<String, FieldValue>,
}

impl DecodedForm {
    /// Create a new empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.entries.insert(name.into(), value)
    }

    /// Get a value by field name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.get(name)
    }

    /// Get a text field by name.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Get a file by field name.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.get(name).and_then(FieldValue::as_file)
    }

    /// Remove and return a value without cloning it.
    pub fn take(&mut self, name: &str) -> Option<FieldValue> {
        self.entries.remove(name)
    }

    /// Check if a field exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Get all text fields as (name, value) pairs.
    #[must_use]
    pub fn fields(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.as_text()?)))
            .collect()
    }

    /// Get all files as (name, file) pairs.
    #[must_use]
    pub fn files(&self) -> Vec<(&str, &UploadedFile)> {
        self.entries
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.as_file()?)))
            .collect()
    }

    /// Iterate over all entries in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, FieldValue> {
        self.entries.iter()
    }

    /// Get the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the form is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the form and return the underlying map.
    #[must_use]
    pub fn into_inner(self) -> HashMap<String, FieldValue> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a DecodedForm {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = hash_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for DecodedForm {
    type Item = (String, FieldValue);
    type IntoIter = hash_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromIterator<(String, FieldValue)> for DecodedForm {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
