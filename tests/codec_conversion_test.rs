#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;
    use solander::client::normalize_term_suggestions;
    use solander::codec::{decode, decode_text, encode};
    use solander::document::FieldValue;

    #[test]
    fn test_native_values_survive_the_wire() {
        // Everything the wire can carry round-trips through encode/decode.
        let values = vec![
            FieldValue::Boolean(true),
            FieldValue::Boolean(false),
            FieldValue::Integer(0),
            FieldValue::Integer(-99),
            FieldValue::Integer(7_000_000_000),
            FieldValue::Float(0.5),
            FieldValue::Float(-123.25),
            FieldValue::DateTime(Utc.with_ymd_and_hms(1999, 12, 31, 23, 59, 59).unwrap()),
        ];

        for value in values {
            let wire = encode(&value);
            assert_eq!(decode_text(&wire), value, "round-tripping {wire:?}");
        }
    }

    #[test]
    fn test_date_only_values_gain_midnight() {
        let date = NaiveDate::from_ymd_opt(2013, 1, 18).unwrap();
        let wire = encode(&FieldValue::Date(date));
        assert_eq!(wire, "2013-01-18T00:00:00Z");

        // Decoding produces the equivalent date-time at midnight.
        let expected = Utc.with_ymd_and_hms(2013, 1, 18, 0, 0, 0).unwrap();
        assert_eq!(decode_text(&wire), FieldValue::DateTime(expected));
    }

    #[test]
    fn test_datetime_truncates_to_second_precision() {
        let precise = Utc
            .with_ymd_and_hms(2013, 1, 18, 0, 30, 28)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(500))
            .unwrap();
        let wire = encode(&FieldValue::DateTime(precise));
        assert_eq!(wire, "2013-01-18T00:30:28Z");
    }

    #[test]
    fn test_decode_prefers_specific_forms() {
        // Boolean literal before anything else
        assert_eq!(decode(&json!("true")), FieldValue::Boolean(true));
        // Date-time pattern before literal evaluation
        assert!(matches!(
            decode(&json!("2013-01-18T00:30:28Z")),
            FieldValue::DateTime(_)
        ));
        // Literal evaluation before the string fallback
        assert_eq!(decode(&json!("42")), FieldValue::Integer(42));
        // String fallback when nothing matches
        assert_eq!(
            decode(&json!("not a literal")),
            FieldValue::Text("not a literal".to_string())
        );
    }

    #[test]
    fn test_multivalue_collapses_to_first_seen() {
        let value = json!(["2013-01-18T00:30:28Z", "ignored"]);
        assert!(matches!(decode(&value), FieldValue::DateTime(_)));
    }

    #[test]
    fn test_term_suggestions_old_and_new_protocols() {
        // Solr 1.x: flat alternating list
        let old = json!(["color", ["red", 5, "blue", 3]]);
        // Solr 3.x: mapping
        let new = json!({"color": ["red", 5, "blue", 3]});

        let expected = vec![("red".to_string(), 5), ("blue".to_string(), 3)];
        assert_eq!(
            normalize_term_suggestions(&old).get("color"),
            Some(&expected)
        );
        assert_eq!(
            normalize_term_suggestions(&new).get("color"),
            Some(&expected)
        );
    }

    #[test]
    fn test_term_suggestions_multiple_fields_keep_order() {
        let terms = json!([
            "color", ["red", 5],
            "size", ["xl", 2, "s", 1]
        ]);
        let normalized = normalize_term_suggestions(&terms);
        let fields: Vec<&String> = normalized.keys().collect();
        assert_eq!(fields, vec!["color", "size"]);
        assert_eq!(
            normalized.get("size"),
            Some(&vec![("xl".to_string(), 2), ("s".to_string(), 1)])
        );
    }
}
