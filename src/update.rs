//! XML update envelopes for the Solr `update` handler.
//!
//! This module builds the `<add>`, `<delete>`, `<commit>` and `<optimize>`
//! messages described by the Solr update XML protocol
//! (<https://wiki.apache.org/solr/UpdateXmlMessages>). Serialization goes
//! through `quick-xml`'s serde support: attributes are struct fields renamed
//! with a leading `@`, element text is the `$value` field, and text content
//! is escaped on write.
//!
//! Building a document element never fails on caller data: null and
//! empty-string values are silently omitted, and a multi-valued field
//! expands to one `<field>` element per element of the sequence, in order.

use std::collections::HashMap;

use serde::Serialize;

use crate::codec;
use crate::document::{Document, FieldValue};
use crate::error::{Result, SolrError};

/// Atomic-update directive for a single field.
///
/// When a field name is present in the update map handed to [`build_add`],
/// the generated `<field>` element carries the directive as its `update`
/// attribute and Solr applies a partial update instead of a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    /// Replace the stored value.
    Set,
    /// Append to a multi-valued field.
    Add,
    /// Remove matching values from a multi-valued field.
    Remove,
    /// Increment a numeric field.
    Inc,
}

impl UpdateMode {
    /// The attribute value Solr expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Set => "set",
            UpdateMode::Add => "add",
            UpdateMode::Remove => "remove",
            UpdateMode::Inc => "inc",
        }
    }
}

/// Per-field boost factors, keyed by field name.
pub type BoostMap = HashMap<String, f64>;

/// Per-field atomic-update directives, keyed by field name.
pub type FieldUpdateMap = HashMap<String, UpdateMode>;

#[derive(Serialize)]
#[serde(rename = "field")]
struct FieldElem {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@update", skip_serializing_if = "Option::is_none")]
    update: Option<&'static str>,
    #[serde(rename = "@boost", skip_serializing_if = "Option::is_none")]
    boost: Option<String>,
    #[serde(rename = "$value")]
    value: String,
}

#[derive(Serialize)]
#[serde(rename = "doc")]
struct DocElem {
    #[serde(rename = "@boost", skip_serializing_if = "Option::is_none")]
    boost: Option<String>,
    #[serde(rename = "field")]
    fields: Vec<FieldElem>,
}

#[derive(Serialize)]
#[serde(rename = "add")]
struct AddEnvelope {
    #[serde(rename = "@commitWithin", skip_serializing_if = "Option::is_none")]
    commit_within: Option<i64>,
    #[serde(rename = "doc")]
    docs: Vec<DocElem>,
}

#[derive(Serialize)]
#[serde(rename = "delete")]
struct DeleteEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
}

#[derive(Serialize)]
#[serde(rename = "commit")]
struct CommitEnvelope {
    #[serde(rename = "@expungeDeletes", skip_serializing_if = "Option::is_none")]
    expunge_deletes: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename = "optimize")]
struct OptimizeEnvelope {
    #[serde(rename = "@maxSegments", skip_serializing_if = "Option::is_none")]
    max_segments: Option<u32>,
}

/// Serialize an envelope, folding the serializer's error type away.
fn to_xml<T: Serialize>(envelope: &T) -> Result<String> {
    quick_xml::se::to_string(envelope)
        .map_err(|e| SolrError::Serialize(format!("Failed to serialize update envelope: {e}")))
}

/// Convert one document into its `<doc>` element.
///
/// A field literally named `boost` sets the document-level boost attribute
/// instead of emitting a field element. Values that fail the null check
/// produce nothing, without error.
fn doc_to_elem(
    doc: &Document,
    boost: Option<&BoostMap>,
    field_updates: Option<&FieldUpdateMap>,
) -> DocElem {
    let mut elem = DocElem {
        boost: None,
        fields: Vec::new(),
    };

    for (name, value) in doc.fields() {
        if name == "boost" {
            elem.boost = Some(value.to_string());
            continue;
        }

        // Treat every value as an iterable to keep a single code path.
        let bits: Vec<&FieldValue> = match value {
            FieldValue::Sequence(values) => values.iter().collect(),
            single => vec![single],
        };

        for bit in bits {
            if bit.is_null() {
                continue;
            }

            elem.fields.push(FieldElem {
                name: name.to_string(),
                update: field_updates
                    .and_then(|m| m.get(name))
                    .map(UpdateMode::as_str),
                boost: boost.and_then(|m| m.get(name)).map(|b| b.to_string()),
                value: codec::encode(bit),
            });
        }
    }

    elem
}

/// Build the `<add>` envelope wrapping the given documents.
pub fn build_add(
    docs: &[Document],
    boost: Option<&BoostMap>,
    field_updates: Option<&FieldUpdateMap>,
    commit_within: Option<i64>,
) -> Result<String> {
    let envelope = AddEnvelope {
        commit_within,
        docs: docs
            .iter()
            .map(|doc| doc_to_elem(doc, boost, field_updates))
            .collect(),
    };
    to_xml(&envelope)
}

/// Build a delete directive for a single document id.
pub fn build_delete_by_id(id: &str) -> Result<String> {
    let envelope = DeleteEnvelope {
        id: Some(id.to_string()),
        query: None,
    };
    to_xml(&envelope)
}

/// Build a delete directive for a Lucene-style query.
pub fn build_delete_by_query(query: &str) -> Result<String> {
    let envelope = DeleteEnvelope {
        id: None,
        query: Some(query.to_string()),
    };
    to_xml(&envelope)
}

/// Build a commit directive.
pub fn build_commit(expunge_deletes: Option<bool>) -> Result<String> {
    to_xml(&CommitEnvelope { expunge_deletes })
}

/// Build an optimize directive.
pub fn build_optimize(max_segments: Option<u32>) -> Result<String> {
    to_xml(&OptimizeEnvelope { max_segments })
}

/// Commit-related query parameters appended to the update path.
///
/// A present `commit` suppresses `softCommit`, matching the update
/// handler's own precedence.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct UpdateParams {
    pub commit: Option<bool>,
    pub soft_commit: Option<bool>,
    pub wait_flush: Option<bool>,
    pub wait_searcher: Option<bool>,
}

impl UpdateParams {
    /// Render as a querystring, empty when nothing is set.
    pub fn to_query(self) -> String {
        let mut vars: Vec<String> = Vec::new();

        if let Some(commit) = self.commit {
            vars.push(format!("commit={commit}"));
        } else if let Some(soft_commit) = self.soft_commit {
            vars.push(format!("softCommit={soft_commit}"));
        }

        if let Some(wait_flush) = self.wait_flush {
            vars.push(format!("waitFlush={wait_flush}"));
        }

        if let Some(wait_searcher) = self.wait_searcher {
            vars.push(format!("waitSearcher={wait_searcher}"));
        }

        vars.join("&")
    }
}
