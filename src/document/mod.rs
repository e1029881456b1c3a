//! Document module for building update requests.
//!
//! This module provides the document structure and field value types
//! that feed the XML update envelope.

#[allow(clippy::module_inception)]
pub mod document;
pub mod field_value;

// Re-export commonly used types
pub use document::{Document, DocumentBuilder};
pub use field_value::FieldValue;
