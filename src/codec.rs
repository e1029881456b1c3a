//! Bidirectional conversion between native values and Solr wire text.
//!
//! The XML update protocol carries untyped field text, so [`encode`] is a
//! plain rendering step, while [`decode`] has to *guess* what a returned
//! string originally was. The guess is an explicit, ordered chain of typed
//! attempts: boolean literal, then the Solr date-time pattern, then a safe
//! literal evaluation (number, bracketed sequence, quoted string), and
//! finally the text itself unchanged. The order is load-bearing: `"true"`
//! and ISO date strings are syntactically ambiguous with other literal
//! forms, so those checks must run first.
//!
//! The literal-evaluation fallback can misread certain numeric-looking
//! strings (`"010"` decodes as the integer 10, `"[1, 2]"` as a sequence).
//! This ambiguity is inherent to the untyped wire format and is kept as
//! documented behavior.

use chrono::{DateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::document::FieldValue;
use crate::sanitize::clean_xml_string;

lazy_static! {
    static ref DATETIME_REGEX: Regex = Regex::new(
        r"^(?P<year>\d{4})-(?P<month>\d{2})-(?P<day>\d{2})T(?P<hour>\d{2}):(?P<minute>\d{2}):(?P<second>\d{2})(\.\d+)?Z$"
    )
    .expect("datetime pattern is valid");
}

/// Convert a native value to the text form Solr expects in update XML.
///
/// Date-times serialize in UTC at second precision (`YYYY-MM-DDThh:mm:ssZ`,
/// no fractional seconds); date-only values get a synthetic midnight time;
/// booleans become literal `true`/`false`. Everything else uses its natural
/// text representation and is then stripped of characters that have no
/// legal XML encoding. Binary data is decoded as UTF-8 with the replacement
/// character standing in for invalid sequences.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use solander::codec::encode;
/// use solander::document::FieldValue;
///
/// let dt = Utc.with_ymd_and_hms(2013, 1, 18, 0, 30, 28).unwrap();
/// assert_eq!(encode(&FieldValue::DateTime(dt)), "2013-01-18T00:30:28Z");
/// assert_eq!(encode(&FieldValue::Boolean(true)), "true");
/// assert_eq!(encode(&FieldValue::Text("a\u{FFFF}b".into())), "ab");
/// ```
pub fn encode(value: &FieldValue) -> String {
    match value {
        // These render from fixed alphabets and need no filtering.
        FieldValue::DateTime(_) | FieldValue::Date(_) | FieldValue::Boolean(_) => value.to_string(),
        other => clean_xml_string(&other.to_string()),
    }
}

/// Convert a decoded Solr response value back to a best-guess native value.
///
/// Already-typed JSON numbers and booleans pass through unchanged. An array
/// collapses to its first element; this conversion path is used for
/// term-suggestion pairs, not for document round-tripping, so first-seen is
/// the right policy. Strings go through [`decode_text`].
pub fn decode(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(b) => FieldValue::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                FieldValue::Float(f)
            } else {
                FieldValue::Text(n.to_string())
            }
        }
        Value::Array(items) => items.first().map(decode).unwrap_or(FieldValue::Null),
        Value::String(s) => decode_text(s),
        Value::Object(_) => FieldValue::Text(value.to_string()),
    }
}

/// Guess the native type of a plain wire string.
///
/// The attempt order (boolean, date-time, literal, raw text) is part of the
/// contract; see the module documentation.
pub fn decode_text(text: &str) -> FieldValue {
    match text {
        "true" => return FieldValue::Boolean(true),
        "false" => return FieldValue::Boolean(false),
        _ => {}
    }

    if let Some(dt) = parse_solr_datetime(text) {
        return FieldValue::DateTime(dt);
    }

    parse_literal(text).unwrap_or_else(|| FieldValue::Text(text.to_string()))
}

/// Strict match against the ISO-8601-with-Z pattern Solr emits.
///
/// Fractional seconds are accepted by the pattern but discarded: the
/// constructed value has second precision.
fn parse_solr_datetime(text: &str) -> Option<DateTime<Utc>> {
    let caps = DATETIME_REGEX.captures(text)?;
    let year: i32 = caps["year"].parse().ok()?;
    let month: u32 = caps["month"].parse().ok()?;
    let day: u32 = caps["day"].parse().ok()?;
    let hour: u32 = caps["hour"].parse().ok()?;
    let minute: u32 = caps["minute"].parse().ok()?;
    let second: u32 = caps["second"].parse().ok()?;

    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
}

/// Safe literal evaluation: integer, float, bracketed sequence, or quoted
/// string. Anything else is not a literal.
fn parse_literal(text: &str) -> Option<FieldValue> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(FieldValue::Integer(i));
    }

    // Restrict float parsing to digit-shaped text so words like "infinity"
    // stay strings.
    if trimmed
        .starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
    {
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Some(FieldValue::Float(f));
            }
        }
    }

    if (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('(') && trimmed.ends_with(')'))
    {
        return parse_sequence_literal(&trimmed[1..trimmed.len() - 1]);
    }

    if trimmed.len() >= 2 {
        let first = trimmed.chars().next()?;
        if (first == '\'' || first == '"') && trimmed.ends_with(first) {
            let inner = &trimmed[1..trimmed.len() - 1];
            return Some(FieldValue::Text(unescape_quoted(inner, first)));
        }
    }

    None
}

/// Parse the interior of a bracketed sequence literal.
///
/// Splits on top-level commas (quotes and nested brackets respected); every
/// element must itself be a literal or a boolean, otherwise the whole text
/// is not a sequence.
fn parse_sequence_literal(inner: &str) -> Option<FieldValue> {
    let inner = inner.trim();
    if inner.is_empty() {
        return Some(FieldValue::Sequence(Vec::new()));
    }

    let mut elements: Vec<&str> = Vec::new();
    let mut depth: i32 = 0;
    let mut in_quote: Option<char> = None;
    let mut start = 0;

    for (idx, c) in inner.char_indices() {
        match c {
            '\'' | '"' => {
                if in_quote == Some(c) {
                    in_quote = None;
                } else if in_quote.is_none() {
                    in_quote = Some(c);
                }
            }
            '[' | '(' if in_quote.is_none() => depth += 1,
            ']' | ')' if in_quote.is_none() => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 && in_quote.is_none() => {
                elements.push(&inner[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || in_quote.is_some() {
        return None;
    }
    elements.push(&inner[start..]);

    let mut values = Vec::with_capacity(elements.len());
    for element in elements {
        let element = element.trim();
        let value = match element {
            "true" => FieldValue::Boolean(true),
            "false" => FieldValue::Boolean(false),
            _ => parse_literal(element)?,
        };
        values.push(value);
    }

    Some(FieldValue::Sequence(values))
}

/// Undo backslash escapes for the quote character inside a quoted literal.
fn unescape_quoted(inner: &str, quote: char) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) if next == quote || next == '\\' => out.push(next),
                Some(next) => {
                    out.push(c);
                    out.push(next);
                }
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_encode_datetime_drops_subseconds() {
        let dt = Utc
            .with_ymd_and_hms(2005, 1, 1, 12, 30, 59)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(encode(&FieldValue::DateTime(dt)), "2005-01-01T12:30:59Z");
    }

    #[test]
    fn test_encode_date_gets_midnight() {
        let d = NaiveDate::from_ymd_opt(2005, 1, 1).unwrap();
        assert_eq!(encode(&FieldValue::Date(d)), "2005-01-01T00:00:00Z");
    }

    #[test]
    fn test_encode_booleans() {
        assert_eq!(encode(&FieldValue::Boolean(true)), "true");
        assert_eq!(encode(&FieldValue::Boolean(false)), "false");
    }

    #[test]
    fn test_encode_strips_illegal_xml_chars() {
        let text = FieldValue::Text("hel\u{0}lo\u{FFFE}".to_string());
        assert_eq!(encode(&text), "hello");
    }

    #[test]
    fn test_encode_binary_replaces_invalid_utf8() {
        let value = FieldValue::Binary(vec![0x68, 0x69, 0xFF]);
        assert_eq!(encode(&value), "hi\u{FFFD}");
    }

    #[test]
    fn test_decode_passes_through_typed_values() {
        assert_eq!(decode(&serde_json::json!(12)), FieldValue::Integer(12));
        assert_eq!(decode(&serde_json::json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(decode(&serde_json::json!(true)), FieldValue::Boolean(true));
    }

    #[test]
    fn test_decode_collapses_array_to_first() {
        let value = serde_json::json!(["first", "second"]);
        assert_eq!(decode(&value), FieldValue::Text("first".to_string()));
    }

    #[test]
    fn test_decode_boolean_literals() {
        assert_eq!(decode_text("true"), FieldValue::Boolean(true));
        assert_eq!(decode_text("false"), FieldValue::Boolean(false));
        // Only the exact lowercase literals qualify.
        assert_eq!(decode_text("True"), FieldValue::Text("True".to_string()));
    }

    #[test]
    fn test_decode_datetime() {
        let expected = Utc.with_ymd_and_hms(2005, 1, 1, 12, 30, 59).unwrap();
        assert_eq!(
            decode_text("2005-01-01T12:30:59Z"),
            FieldValue::DateTime(expected)
        );
        // Fractional seconds are matched but discarded.
        assert_eq!(
            decode_text("2005-01-01T12:30:59.123Z"),
            FieldValue::DateTime(expected)
        );
    }

    #[test]
    fn test_decode_checks_datetime_before_literals() {
        // A date string contains digits and punctuation a literal parser
        // could chew on; the strict date match must win.
        match decode_text("2005-01-01T12:30:59Z") {
            FieldValue::DateTime(_) => {}
            other => panic!("Expected DateTime, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_numbers() {
        assert_eq!(decode_text("42"), FieldValue::Integer(42));
        assert_eq!(decode_text("-7"), FieldValue::Integer(-7));
        assert_eq!(decode_text("3.25"), FieldValue::Float(3.25));
        assert_eq!(decode_text("1e3"), FieldValue::Float(1000.0));
    }

    #[test]
    fn test_decode_leading_zero_ambiguity_is_preserved() {
        // Documented behavior: numeric-looking strings decode as numbers.
        assert_eq!(decode_text("010"), FieldValue::Integer(10));
    }

    #[test]
    fn test_decode_sequence_literal() {
        assert_eq!(
            decode_text("[1, 2, 3]"),
            FieldValue::Sequence(vec![
                FieldValue::Integer(1),
                FieldValue::Integer(2),
                FieldValue::Integer(3),
            ])
        );
        assert_eq!(
            decode_text("['a', 'b']"),
            FieldValue::Sequence(vec![
                FieldValue::Text("a".to_string()),
                FieldValue::Text("b".to_string()),
            ])
        );
        assert_eq!(
            decode_text("[[1], [2]]"),
            FieldValue::Sequence(vec![
                FieldValue::Sequence(vec![FieldValue::Integer(1)]),
                FieldValue::Sequence(vec![FieldValue::Integer(2)]),
            ])
        );
    }

    #[test]
    fn test_decode_unparseable_stays_text() {
        assert_eq!(
            decode_text("plain words"),
            FieldValue::Text("plain words".to_string())
        );
        // A bracketed run of non-literals is not a sequence.
        assert_eq!(
            decode_text("[red, blue]"),
            FieldValue::Text("[red, blue]".to_string())
        );
        assert_eq!(
            decode_text("infinity"),
            FieldValue::Text("infinity".to_string())
        );
    }

    #[test]
    fn test_decode_quoted_string_literal() {
        assert_eq!(
            decode_text("'quoted'"),
            FieldValue::Text("quoted".to_string())
        );
        assert_eq!(
            decode_text("\"it\\\"s\""),
            FieldValue::Text("it\"s".to_string())
        );
    }

    #[test]
    fn test_roundtrip_primitives() {
        let values = vec![
            FieldValue::Boolean(true),
            FieldValue::Boolean(false),
            FieldValue::Integer(123456789),
            FieldValue::Float(2.5),
            FieldValue::DateTime(Utc.with_ymd_and_hms(2020, 6, 15, 8, 9, 10).unwrap()),
        ];
        for value in values {
            assert_eq!(decode_text(&encode(&value)), value);
        }
    }
}
