//! Document structure for update requests.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::document::field_value::FieldValue;

/// A document represents a single item to be indexed.
///
/// Documents are ordered collections of field values: the update envelope
/// emits fields in exactly the order they were added, and a multi-valued
/// field keeps the order of its elements. A document only lives for the
/// duration of one `add` call.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Document {
    /// The field values for this document, in insertion order
    fields: IndexMap<String, FieldValue>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Document {
            fields: IndexMap::new(),
        }
    }

    /// Add a field value to the document.
    ///
    /// Adding a field under an existing name replaces the previous value
    /// while keeping its original position.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Get a field value from the document.
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Remove a field from the document.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.shift_remove(name)
    }

    /// Iterate over fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Get all field names, in insertion order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }
}

/// A builder for constructing documents in a fluent manner.
///
/// # Examples
///
/// ```
/// use solander::document::Document;
///
/// let doc = Document::builder()
///     .add_text("id", "doc_1")
///     .add_text("title", "A test document")
///     .add_integer("views", 42)
///     .build();
///
/// assert_eq!(doc.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new() -> Self {
        DocumentBuilder {
            document: Document::new(),
        }
    }

    /// Add a text field to the document.
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document
            .add_field(name, FieldValue::Text(value.into()));
        self
    }

    /// Add an integer field to the document.
    pub fn add_integer<S: Into<String>>(mut self, name: S, value: i64) -> Self {
        self.document.add_field(name, FieldValue::Integer(value));
        self
    }

    /// Add a float field to the document.
    pub fn add_float<S: Into<String>>(mut self, name: S, value: f64) -> Self {
        self.document.add_field(name, FieldValue::Float(value));
        self
    }

    /// Add a boolean field to the document.
    pub fn add_boolean<S: Into<String>>(mut self, name: S, value: bool) -> Self {
        self.document.add_field(name, FieldValue::Boolean(value));
        self
    }

    /// Add a binary field to the document.
    pub fn add_binary<S: Into<String>>(mut self, name: S, value: Vec<u8>) -> Self {
        self.document.add_field(name, FieldValue::Binary(value));
        self
    }

    /// Add a datetime field to the document.
    pub fn add_datetime<S: Into<String>>(
        mut self,
        name: S,
        value: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        self.document.add_field(name, FieldValue::DateTime(value));
        self
    }

    /// Add a date-only field to the document.
    pub fn add_date<S: Into<String>>(mut self, name: S, value: chrono::NaiveDate) -> Self {
        self.document.add_field(name, FieldValue::Date(value));
        self
    }

    /// Add a multi-valued field to the document.
    ///
    /// Each element becomes its own field element in the update envelope,
    /// in the given order.
    pub fn add_sequence<S: Into<String>>(mut self, name: S, values: Vec<FieldValue>) -> Self {
        self.document
            .add_field(name, FieldValue::Sequence(values));
        self
    }

    /// Add a field with a generic value.
    ///
    /// This is a low-level method that accepts any `FieldValue` directly.
    /// For most cases, prefer the type-safe methods like `add_text`,
    /// `add_integer`, `add_float`, etc.
    pub fn add_field<S: Into<String>>(mut self, name: S, value: FieldValue) -> Self {
        self.document.add_field(name, value);
        self
    }

    /// Build the final document.
    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_preserved() {
        let doc = Document::builder()
            .add_text("zebra", "z")
            .add_text("apple", "a")
            .add_text("mango", "m")
            .build();

        assert_eq!(doc.field_names(), vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_field_access() {
        let mut doc = Document::new();
        doc.add_field("title", FieldValue::Text("Rust".to_string()));

        assert!(doc.has_field("title"));
        assert_eq!(
            doc.get_field("title").and_then(|v| v.as_text()),
            Some("Rust")
        );
        assert!(doc.remove_field("title").is_some());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_replacing_field_keeps_position() {
        let mut doc = Document::new();
        doc.add_field("first", FieldValue::Integer(1));
        doc.add_field("second", FieldValue::Integer(2));
        doc.add_field("first", FieldValue::Integer(10));

        assert_eq!(doc.field_names(), vec!["first", "second"]);
        assert_eq!(
            doc.get_field("first").and_then(|v| v.as_integer()),
            Some(10)
        );
    }
}
