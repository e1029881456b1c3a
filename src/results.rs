//! Read-only view over a decoded Solr search response.

use serde_json::Value;

/// Results of a search or more-like-this request.
///
/// Wraps one decoded JSON response and exposes the well-known response
/// sections as accessors. Individual documents can be reached through
/// [`Results::docs`], indexed access, or iteration.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use solander::results::Results;
///
/// let results = Results::from(json!({
///     "response": {
///         "docs": [{"id": 1}, {"id": 2}, {"id": 3}],
///         "numFound": 3,
///     }
/// }));
///
/// assert_eq!(results.hits(), 3);
/// assert_eq!(results.len(), 3);
/// for doc in &results {
///     println!("{doc}");
/// }
/// assert_eq!(results[1], json!({"id": 2}));
///
/// // With zero documents there is nothing to iterate:
/// let empty = Results::from(json!({}));
/// assert!(!empty.has_hits());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    docs: Vec<Value>,
    hits: u64,
    debug: Value,
    highlighting: Value,
    facets: Value,
    spellcheck: Value,
    stats: Value,
    qtime: Option<i64>,
    grouped: Value,
    next_cursor_mark: Option<String>,
}

impl Results {
    /// The matched documents returned in this page of results.
    pub fn docs(&self) -> &[Value] {
        &self.docs
    }

    /// Total number of matching documents (`numFound`), which may exceed
    /// the number of returned docs.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Debug section, when `debugQuery` was requested.
    pub fn debug(&self) -> &Value {
        &self.debug
    }

    /// Highlighting section.
    pub fn highlighting(&self) -> &Value {
        &self.highlighting
    }

    /// Facet counts section.
    pub fn facets(&self) -> &Value {
        &self.facets
    }

    /// Spellcheck section.
    pub fn spellcheck(&self) -> &Value {
        &self.spellcheck
    }

    /// Stats section.
    pub fn stats(&self) -> &Value {
        &self.stats
    }

    /// Query time in milliseconds, from the response header.
    pub fn qtime(&self) -> Option<i64> {
        self.qtime
    }

    /// Grouped-results section.
    pub fn grouped(&self) -> &Value {
        &self.grouped
    }

    /// Cursor mark for deep paging, when requested.
    pub fn next_cursor_mark(&self) -> Option<&str> {
        self.next_cursor_mark.as_deref()
    }

    /// Number of documents in this page.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether this page holds no documents.
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Whether the query matched anything at all.
    pub fn has_hits(&self) -> bool {
        self.hits > 0
    }

    /// Iterate over the returned documents.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.docs.iter()
    }
}

impl From<Value> for Results {
    /// Build the view from one decoded Solr response mapping.
    ///
    /// Missing or null sections come back empty rather than failing: a
    /// response without a `response` key simply has zero docs and hits.
    fn from(decoded: Value) -> Self {
        let response = decoded.get("response").cloned().unwrap_or(Value::Null);

        let docs = response
            .get("docs")
            .and_then(|d| d.as_array())
            .cloned()
            .unwrap_or_default();
        let hits = response
            .get("numFound")
            .and_then(|n| n.as_u64())
            .unwrap_or(0);

        let section = |name: &str| decoded.get(name).cloned().unwrap_or(Value::Null);

        Results {
            docs,
            hits,
            debug: section("debug"),
            highlighting: section("highlighting"),
            facets: section("facet_counts"),
            spellcheck: section("spellcheck"),
            stats: section("stats"),
            qtime: decoded
                .get("responseHeader")
                .and_then(|h| h.get("QTime"))
                .and_then(|q| q.as_i64()),
            grouped: section("grouped"),
            next_cursor_mark: decoded
                .get("nextCursorMark")
                .and_then(|m| m.as_str())
                .map(String::from),
        }
    }
}

impl std::ops::Index<usize> for Results {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.docs[index]
    }
}

impl<'a> IntoIterator for &'a Results {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_basic_view() {
        let results = Results::from(json!({
            "responseHeader": {"status": 0, "QTime": 7},
            "response": {
                "docs": [{"id": "a"}, {"id": "b"}],
                "numFound": 12,
            },
            "nextCursorMark": "AoEoZG9jXzI=",
        }));

        assert_eq!(results.len(), 2);
        assert_eq!(results.hits(), 12);
        assert!(results.has_hits());
        assert_eq!(results.qtime(), Some(7));
        assert_eq!(results.next_cursor_mark(), Some("AoEoZG9jXzI="));
        assert_eq!(results[0], json!({"id": "a"}));
        assert_eq!(results.iter().count(), 2);
    }

    #[test]
    fn test_empty_response() {
        let results = Results::from(json!({}));
        assert!(results.is_empty());
        assert!(!results.has_hits());
        assert_eq!(results.qtime(), None);
        assert_eq!(*results.facets(), Value::Null);
    }

    #[test]
    fn test_null_response_section() {
        // Some handlers return an explicit null response value.
        let results = Results::from(json!({"response": null}));
        assert!(results.is_empty());
        assert_eq!(results.hits(), 0);
    }
}
