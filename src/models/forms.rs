use indexmap::IndexMap;

use crate::models::media::ImageUpload;

/// Decoded `multipart/form-data` body: text fields by name (repeated
/// fields keep every value, in order) and file fields by name.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: IndexMap<String, Vec<String>>,
    files: IndexMap<String, ImageUpload>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(name.into()).or_default().push(value.into());
    }

    /// Stores a file under its field name.
    pub fn insert_file(&mut self, name: impl Into<String>, file: ImageUpload) {
        self.files.insert(name.into(), file);
    }

    /// First value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of a possibly repeated text field.
    pub fn all(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn file(&self, name: &str) -> Option<&ImageUpload> {
        self.files.get(name)
    }
}
