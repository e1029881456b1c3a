#[cfg(test)]
mod tests {
    use solander::client::DeleteOptions;
    use solander::document::{Document, FieldValue};
    use solander::error::SolrError;
    use solander::sanitize::sanitize;
    use solander::update::{BoostMap, FieldUpdateMap, UpdateMode, build_add, build_commit};
    use solander::Solr;

    #[test]
    fn test_full_add_envelope_flow() {
        // 1. Build documents the way a caller would
        let first = Document::builder()
            .add_text("id", "doc_1")
            .add_text("title", "A test document")
            .build();
        let second = Document::builder()
            .add_text("id", "doc_2")
            .add_text("title", "The Banana: Tasty or Dangerous?")
            .build();

        // 2. Serialize the add envelope
        let xml = build_add(&[first, second], None, None, None).unwrap();

        // 3. Both documents appear, in order
        assert_eq!(xml.matches("<doc>").count(), 2);
        let one = xml.find("doc_1").unwrap();
        let two = xml.find("doc_2").unwrap();
        assert!(one < two);

        // 4. Markup in values is escaped, not emitted raw
        assert!(xml.contains("The Banana: Tasty or Dangerous?"));
    }

    #[test]
    fn test_atomic_update_attributes() {
        let doc = Document::builder()
            .add_text("id", "doc_1")
            .add_integer("popularity", 1)
            .add_text("category", "fruit")
            .build();

        let mut updates = FieldUpdateMap::new();
        updates.insert("popularity".to_string(), UpdateMode::Inc);
        updates.insert("category".to_string(), UpdateMode::Set);

        let mut boost = BoostMap::new();
        boost.insert("category".to_string(), 2.0);

        let xml = build_add(&[doc], Some(&boost), Some(&updates), None).unwrap();

        assert!(xml.contains("<field name=\"popularity\" update=\"inc\">1</field>"));
        assert!(xml.contains("<field name=\"category\" update=\"set\" boost=\"2\">fruit</field>"));
        // The id field picked up neither attribute
        assert!(xml.contains("<field name=\"id\">doc_1</field>"));
    }

    #[test]
    fn test_null_fields_never_reach_the_wire() {
        let doc = Document::builder()
            .add_text("id", "doc_1")
            .add_field("subtitle", FieldValue::Null)
            .add_text("summary", "")
            .add_sequence(
                "tags",
                vec![FieldValue::Text(String::new()), FieldValue::Null],
            )
            .build();

        let xml = build_add(&[doc], None, None, None).unwrap();

        assert!(!xml.contains("subtitle"));
        assert!(!xml.contains("summary"));
        assert!(!xml.contains("tags"));
        assert!(xml.contains("<field name=\"id\">doc_1</field>"));
    }

    #[test]
    fn test_envelope_survives_sanitization_unchanged() {
        // A clean envelope passes through the sanitizer untouched,
        // so sanitizing by default costs nothing for well-behaved data.
        let doc = Document::builder()
            .add_text("id", "doc_1")
            .add_text("body", "multi\nline\ttext")
            .build();

        let xml = build_add(&[doc], None, None, None).unwrap();
        assert_eq!(sanitize(&xml), xml);
    }

    #[test]
    fn test_control_characters_cleaned_at_both_layers() {
        // The codec already drops XML-illegal characters per value; the
        // envelope-level sanitizer is the backstop for raw payloads.
        let doc = Document::builder()
            .add_text("body", "with\u{1}control\u{1f}chars")
            .build();

        let xml = build_add(&[doc], None, None, None).unwrap();
        assert!(xml.contains("withcontrolchars"));

        let raw = "<delete><id>broken\u{2}id</id></delete>";
        assert_eq!(
            sanitize(raw),
            "<delete><id>brokenid</id></delete>"
        );
    }

    #[test]
    fn test_commit_directive_shapes() {
        assert_eq!(build_commit(None).unwrap(), "<commit/>");
        assert_eq!(
            build_commit(Some(false)).unwrap(),
            "<commit expungeDeletes=\"false\"/>"
        );
    }

    #[tokio::test]
    async fn test_delete_argument_validation_is_synchronous() {
        let _ = env_logger::builder().is_test(true).try_init();
        let solr = Solr::new("http://localhost:8983/solr");

        // Neither selector: rejected before any connection is attempted,
        // so it fails even against a server that does not exist.
        let err = solr
            .delete(None, None, &DeleteOptions::default())
            .await
            .unwrap_err();
        match err {
            SolrError::InvalidArgument(msg) => assert!(msg.contains("id")),
            other => panic!("Expected InvalidArgument, got {other:?}"),
        }

        // Both selectors: also rejected.
        let err = solr
            .delete(Some("doc_1"), Some("*:*"), &DeleteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SolrError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_extract_fails_before_any_network_call() {
        let solr = Solr::new("http://localhost:8983/solr");

        let err = solr.extract("report.pdf", b"%PDF-1.4").await.unwrap_err();
        assert!(matches!(err, SolrError::NotImplemented(_)));
    }
}
