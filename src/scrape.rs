//! Best-effort extraction of diagnostics from failed HTTP responses.
//!
//! Solr error responses are not a single documented format: Solr itself may
//! return a structured XML error, or the servlet container in front of it
//! (Jetty, Tomcat, others) may return its own HTML error page, each with a
//! different shape. The scraper runs a graduated pipeline of cheap, ordered
//! fallbacks:
//!
//! 1. a strict parse of Solr's own `<lst name="error">` payload, tried only
//!    when the body opens with an XML declaration; a hit returns
//!    immediately;
//! 2. container identification from the `Server` response header;
//! 3. Tomcat: a regex scan for the first `<h1>` heading;
//! 4. Jetty and unidentified containers: an XML parse of the whole body,
//!    reading `body/pre` (Jetty) or `head/title` (generic) for the reason,
//!    falling back to the re-serialized tree as the detail;
//! 5. if nothing parses, the raw body becomes the detail verbatim.
//!
//! The scraper never fails outward: an unparseable body degrades to "whole
//! body as detail", never to an error.

use lazy_static::lazy_static;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;
use regex::Regex;

lazy_static! {
    // First single-capture heading tag, case-insensitive, non-greedy body.
    static ref H1_REGEX: Regex =
        Regex::new(r"(?i)<h1[^>]*>\s*(.+?)\s*</h1>").expect("heading pattern is valid");
}

/// The servlet container that produced an error response, as identified
/// from the `Server` response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerKind {
    /// Eclipse Jetty.
    Jetty,
    /// Apache Tomcat (identifies itself as "Coyote").
    Tomcat,
    /// Anything else, or no server header at all.
    Generic,
}

impl ServerKind {
    /// Identify the container from the `Server` header value.
    pub fn identify(server_header: Option<&str>) -> Self {
        let Some(server) = server_header else {
            return ServerKind::Generic;
        };
        let server = server.to_lowercase();
        if server.contains("coyote") {
            ServerKind::Tomcat
        } else if server.contains("jetty") {
            ServerKind::Jetty
        } else {
            ServerKind::Generic
        }
    }
}

/// The `(reason, detail)` pair scraped from a failed response.
///
/// Both parts are best-effort and may be empty; worst case the reason is
/// absent and the detail is the raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedError {
    /// Short human-readable reason, when one could be located.
    pub reason: Option<String>,
    /// Full diagnostic text, normalized to a single line.
    pub detail: String,
}

impl ScrapedError {
    /// Fold the pair into the message embedded in the unified error.
    pub fn message(&self) -> String {
        let mut message = match &self.reason {
            Some(reason) => format!("[Reason: {reason}]"),
            None => "[Reason: unknown]".to_string(),
        };
        if !self.detail.is_empty() {
            message.push(' ');
            message.push_str(&self.detail);
        }
        message
    }
}

/// Scrape a non-success response body for diagnostics.
///
/// `server_header` is the raw `Server` response header value, if present.
/// See the module documentation for the pipeline; this function never
/// fails.
///
/// # Examples
///
/// ```
/// use solander::scrape::scrape_response;
///
/// let body = "<html><body><h1>404</h1><h1>Not Found</h1></body></html>";
/// let scraped = scrape_response(Some("Apache-Coyote/1.1"), body);
/// assert_eq!(scraped.reason.as_deref(), Some("404"));
/// ```
pub fn scrape_response(server_header: Option<&str>, body: &str) -> ScrapedError {
    let kind = ServerKind::identify(server_header);

    let mut reason: Option<String> = None;
    let mut detail = String::new();

    if body.starts_with("<?xml") {
        // Try a strict parse of Solr's structured error first.
        if let Ok((msg, trace)) = parse_solr_error(body) {
            if let Some(msg) = msg {
                let msg = msg.trim().to_string();
                detail = msg.clone();
                reason = Some(msg);
            }
            if let Some(trace) = trace {
                detail = trace.trim().to_string();
                if reason.is_none() {
                    reason = Some(detail.clone());
                }
            }

            // A precise match short-circuits the container heuristics.
            if reason.as_deref().is_some_and(|r| !r.is_empty()) && !detail.is_empty() {
                return ScrapedError {
                    reason,
                    detail: normalize_detail(&detail),
                };
            }
            reason = reason.filter(|r| !r.is_empty());
        }
        // Malformed XML is not fatal; the liberal paths below handle it.
    }

    match kind {
        ServerKind::Tomcat => {
            // Tomcat produces neither valid XML nor consistent HTML.
            if let Some(caps) = H1_REGEX.captures(body) {
                if let Some(m) = caps.get(1) {
                    reason = Some(m.as_str().to_string());
                }
            } else {
                detail = body.to_string();
            }
        }
        _ => match parse_error_page(body, kind) {
            Ok((node_reason, tree)) => {
                if let Some(node_reason) = node_reason {
                    reason = Some(node_reason);
                }
                if reason.is_none() {
                    detail = tree;
                }
            }
            Err(()) => detail = body.to_string(),
        },
    }

    ScrapedError {
        reason,
        detail: normalize_detail(&detail),
    }
}

/// Strip line breaks and literal `<br/>` tags, then trim.
fn normalize_detail(detail: &str) -> String {
    detail
        .replace('\n', "")
        .replace('\r', "")
        .replace("<br/>", "")
        .replace("<br />", "")
        .trim()
        .to_string()
}

/// Strict parse for Solr's `<lst name="error">` payload.
///
/// Returns the `msg` and `trace` string texts when present. `Err` means
/// the body is not well-formed XML.
fn parse_solr_error(body: &str) -> Result<(Option<String>, Option<String>), ()> {
    let mut reader = Reader::from_str(body);

    let mut msg: Option<String> = None;
    let mut trace: Option<String> = None;

    let mut depth = 0usize;
    // Depth of the <lst name="error"> element, once seen.
    let mut error_depth: Option<usize> = None;
    // Which of msg/trace we are currently collecting text for.
    let mut collecting: Option<&'static str> = None;
    let mut text_buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                let name_attr = attr_value(e, b"name");
                match e.local_name().as_ref() {
                    b"lst" if depth == 2 && name_attr.as_deref() == Some("error") => {
                        error_depth = Some(depth);
                    }
                    b"str" if error_depth == Some(depth - 1) => {
                        collecting = match name_attr.as_deref() {
                            Some("msg") => Some("msg"),
                            Some("trace") => Some("trace"),
                            _ => None,
                        };
                        text_buf.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::End(_)) => {
                if let Some(which) = collecting.take() {
                    let text = text_buf.clone();
                    match which {
                        "msg" if msg.is_none() => msg = Some(text),
                        "trace" if trace.is_none() => trace = Some(text),
                        _ => {}
                    }
                }
                if error_depth == Some(depth) {
                    error_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Empty(_)) => {}
            Ok(Event::Text(ref t)) => {
                if collecting.is_some() {
                    match t.unescape() {
                        Ok(text) => text_buf.push_str(&text),
                        Err(_) => return Err(()),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(_) => return Err(()),
        }
    }

    Ok((msg, trace))
}

/// Liberal parse of a container error page.
///
/// Looks for the first `body/pre` (Jetty) or `head/title` (generic) node
/// directly under the document root and returns its leading text, plus the
/// re-serialized tree for use as the detail when no reason node exists.
/// `Err` means the body did not parse at all.
fn parse_error_page(body: &str, kind: ServerKind) -> Result<(Option<String>, String), ()> {
    let (outer, inner): (&[u8], &[u8]) = match kind {
        ServerKind::Jetty => (b"body", b"pre"),
        _ => (b"head", b"title"),
    };

    let mut reader = Reader::from_str(body);
    let mut writer = Writer::new(Vec::new());

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut reason: Option<String> = None;
    let mut capturing = false;
    let mut done = false;
    let mut text_buf = String::new();

    loop {
        let event = match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => event,
            Err(_) => return Err(()),
        };

        match &event {
            Event::Start(e) => {
                if capturing {
                    // Only the text before the first child counts.
                    capturing = false;
                    finish_capture(&mut reason, &text_buf, &mut done);
                }
                let name = e.local_name().as_ref().to_vec();
                stack.push(name);
                if !done
                    && stack.len() == 3
                    && stack[1] == outer
                    && stack[2] == inner
                {
                    capturing = true;
                    text_buf.clear();
                }
            }
            Event::End(_) => {
                if capturing {
                    capturing = false;
                    finish_capture(&mut reason, &text_buf, &mut done);
                }
                stack.pop();
            }
            Event::Empty(e) => {
                if capturing {
                    capturing = false;
                    finish_capture(&mut reason, &text_buf, &mut done);
                } else if !done
                    && stack.len() == 2
                    && stack[1] == outer
                    && e.local_name().as_ref() == inner
                {
                    // An empty target node has no text and yields no reason.
                    done = true;
                }
            }
            Event::Text(t) => {
                if capturing {
                    match t.unescape() {
                        Ok(text) => text_buf.push_str(&text),
                        Err(_) => return Err(()),
                    }
                }
            }
            _ => {}
        }

        let is_decl = matches!(&event, Event::Decl(_));
        if !is_decl && writer.write_event(event).is_err() {
            return Err(());
        }
    }

    let tree = String::from_utf8(writer.into_inner()).map_err(|_| ())?;
    Ok((reason, tree))
}

fn finish_capture(reason: &mut Option<String>, text_buf: &str, done: &mut bool) {
    if !*done {
        *done = true;
        if !text_buf.is_empty() {
            *reason = Some(text_buf.to_string());
        }
    }
}

/// Read a named attribute off a start tag.
fn attr_value(e: &quick_xml::events::BytesStart<'_>, name: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == name {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}
