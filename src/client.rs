//! The asynchronous Solr client.
//!
//! [`Solr`] composes the update-envelope builder, the payload sanitizer and
//! the error scraper into the public operations: [`Solr::search`],
//! [`Solr::more_like_this`], [`Solr::suggest_terms`], [`Solr::add`],
//! [`Solr::delete`], [`Solr::commit`] and [`Solr::optimize`]. Every
//! operation is stateless with respect to concurrent calls; the only shared
//! pieces are the pooled HTTP transport and the immutable configuration.
//!
//! # Examples
//!
//! ```no_run
//! use solander::Solr;
//! use solander::client::AddOptions;
//! use solander::document::Document;
//!
//! # async fn run() -> solander::Result<()> {
//! let solr = Solr::new("http://localhost:8983/solr");
//!
//! let doc = Document::builder()
//!     .add_text("id", "doc_1")
//!     .add_text("title", "A test document")
//!     .build();
//! solr.add(&[doc], &AddOptions::default()).await?;
//!
//! let results = solr.search("title:test", &[("rows", "10")]).await?;
//! println!("found {} documents", results.hits());
//! # Ok(())
//! # }
//! ```

use std::io;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use log::{debug, error};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, SERVER};
use serde_json::Value;
use url::Url;
use url::form_urlencoded;

use crate::codec;
use crate::document::{Document, FieldValue};
use crate::error::{Result, SolrError};
use crate::results::Results;
use crate::sanitize::sanitize;
use crate::scrape::scrape_response;
use crate::update::{self, BoostMap, FieldUpdateMap, UpdateParams};

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Querystrings at or above this many encoded bytes are submitted as a
/// POST form body instead of a GET.
const GET_QUERY_LIMIT: usize = 1024;

/// Request-line cap shared by the common servlet containers.
const MAX_URL_LEN: usize = 8192;

/// Join a base URL and a path with exactly one separating slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// How an encoded query travels to the select handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueryRoute {
    Get,
    Post,
}

pub(crate) fn route_for(encoded: &str) -> QueryRoute {
    if encoded.len() < GET_QUERY_LIMIT {
        QueryRoute::Get
    } else {
        QueryRoute::Post
    }
}

/// URL-encode query parameters, forcing JSON response encoding.
fn encode_params(params: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if *key != "wt" {
            serializer.append_pair(key, value);
        }
    }
    serializer.append_pair("wt", "json");
    serializer.finish()
}

/// Walk an error's source chain looking for the underlying I/O failure.
fn io_kind_in_chain(error: &(dyn std::error::Error + 'static)) -> Option<io::ErrorKind> {
    let mut source = error.source();
    while let Some(current) = source {
        if let Some(io_error) = current.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
        source = current.source();
    }
    None
}

/// Classify a transport failure into the unified taxonomy.
///
/// Classification inspects the failure's category, never its message text.
/// A connect-phase failure that produced no socket-level I/O error means
/// the name never resolved.
fn classify_transport(error: reqwest::Error, url: &str) -> SolrError {
    let url = url.to_string();

    if error.is_timeout() {
        return SolrError::Timeout { url };
    }
    if error.is_builder() {
        return SolrError::InvalidUrl { url };
    }
    if error.is_connect() {
        return match io_kind_in_chain(&error) {
            Some(
                io::ErrorKind::ConnectionRefused
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::NotConnected
                | io::ErrorKind::BrokenPipe,
            ) => SolrError::Connection { url },
            _ => SolrError::Resolve { url },
        };
    }

    SolrError::Connection { url }
}

/// Issues single HTTP requests and folds failures into [`SolrError`].
#[derive(Debug, Clone)]
pub(crate) struct Dispatcher {
    http: reqwest::Client,
    timeout: Duration,
}

impl Dispatcher {
    pub(crate) fn new(timeout: Duration) -> Self {
        Dispatcher {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// Send one request and return the response body text.
    ///
    /// The per-request timeout covers the whole transfer; dropping the
    /// future aborts the in-flight request and releases its connection.
    /// Non-2xx responses are scraped for diagnostics before being folded
    /// into [`SolrError::Http`].
    pub(crate) async fn send(
        &self,
        method: &str,
        url: String,
        body: Option<String>,
        headers: HeaderMap,
    ) -> Result<String> {
        let method_name = method.to_uppercase();

        let parsed = Url::parse(&url).map_err(|_| SolrError::InvalidUrl { url: url.clone() })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SolrError::InvalidUrl { url });
        }
        if url.len() > MAX_URL_LEN {
            return Err(SolrError::UrlTooLong { url });
        }

        // The transport accepts a fixed method set; anything else is a
        // caller error, reported by name.
        let method = match method_name.as_str() {
            "GET" => Method::GET,
            "HEAD" => Method::HEAD,
            "POST" => Method::POST,
            "PUT" => Method::PUT,
            "DELETE" => Method::DELETE,
            "PATCH" => Method::PATCH,
            "OPTIONS" => Method::OPTIONS,
            _ => {
                return Err(SolrError::UnknownMethod {
                    method: method_name,
                });
            }
        };

        let preview: String = body.as_deref().unwrap_or("").chars().take(10).collect();
        debug!("Starting request to '{url}' ({method_name}) with body '{preview}'...");
        let start = Instant::now();

        let mut request = self
            .http
            .request(method, parsed)
            .timeout(self.timeout)
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport(e, &url))?;

        let status = response.status();
        let server_header = response
            .headers()
            .get(SERVER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport(e, &url))?;

        if !status.is_success() {
            let scraped = scrape_response(server_header.as_deref(), &text);
            let message = scraped.message();
            error!(
                "Request to '{}' failed with HTTP {}: {}",
                url,
                status.as_u16(),
                message
            );
            return Err(SolrError::Http {
                status: status.as_u16(),
                message,
            });
        }

        debug!(
            "Finished '{}' ({}) with body '{}' in {:.3} seconds.",
            url,
            method_name,
            preview,
            start.elapsed().as_secs_f64()
        );
        Ok(text)
    }
}

/// Options for [`Solr::add`].
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Per-field boost factors.
    pub boost: Option<BoostMap>,
    /// Per-field atomic-update directives.
    pub field_updates: Option<FieldUpdateMap>,
    /// Commit after the add. Default is `true`.
    pub commit: Option<bool>,
    /// Soft-commit after the add. Default is `false`.
    pub soft_commit: Option<bool>,
    /// Let Solr commit within this many milliseconds.
    pub commit_within: Option<i64>,
    /// Block until index changes are flushed to disk.
    pub wait_flush: Option<bool>,
    /// Block until a new searcher is opened.
    pub wait_searcher: Option<bool>,
}

/// Options for [`Solr::delete`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    /// Commit after the delete. Default is `true`.
    pub commit: Option<bool>,
    /// Block until index changes are flushed to disk.
    pub wait_flush: Option<bool>,
    /// Block until a new searcher is opened.
    pub wait_searcher: Option<bool>,
}

/// Options for [`Solr::commit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitOptions {
    /// Issue a soft commit instead of a hard one. Default is `false`.
    pub soft_commit: Option<bool>,
    /// Merge away deleted documents while committing.
    pub expunge_deletes: Option<bool>,
    /// Block until index changes are flushed to disk.
    pub wait_flush: Option<bool>,
    /// Block until a new searcher is opened.
    pub wait_searcher: Option<bool>,
}

/// Options for [`Solr::optimize`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OptimizeOptions {
    /// Maximum number of segments to leave after the merge.
    pub max_segments: Option<u32>,
    /// Block until index changes are flushed to disk.
    pub wait_flush: Option<bool>,
    /// Block until a new searcher is opened.
    pub wait_searcher: Option<bool>,
}

/// Builder for [`Solr`] clients.
#[derive(Debug, Clone)]
pub struct SolrBuilder {
    url: String,
    timeout: Duration,
}

impl SolrBuilder {
    /// Start a builder for the given core or collection URL.
    pub fn new<S: Into<String>>(url: S) -> Self {
        SolrBuilder {
            url: url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Per-request timeout. Default is 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client.
    pub fn build(self) -> Solr {
        Solr {
            dispatcher: Dispatcher::new(self.timeout),
            url: self.url,
        }
    }
}

/// The main object for working with a Solr core or collection.
///
/// Configuration (base URL, timeout) is immutable after construction and
/// all operations borrow the client, so one instance can be shared freely
/// across tasks.
#[derive(Debug, Clone)]
pub struct Solr {
    url: String,
    dispatcher: Dispatcher,
}

impl Solr {
    /// Create a client with default configuration.
    ///
    /// `url` points at the core or collection, e.g.
    /// `http://localhost:8983/solr`.
    pub fn new<S: Into<String>>(url: S) -> Self {
        SolrBuilder::new(url).build()
    }

    /// Start a builder to customize configuration.
    pub fn builder<S: Into<String>>(url: S) -> SolrBuilder {
        SolrBuilder::new(url)
    }

    /// The configured base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) async fn send_request(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
        headers: HeaderMap,
    ) -> Result<String> {
        self.dispatcher
            .send(method, join_url(&self.url, path), body, headers)
            .await
    }

    /// Run an encoded query against the select handler.
    ///
    /// Typical queries travel as a GET; anything whose encoded form is too
    /// long for a request line is submitted as a urlencoded POST body.
    async fn select(&self, params: &[(&str, &str)]) -> Result<String> {
        let encoded = encode_params(params);
        match route_for(&encoded) {
            QueryRoute::Get => {
                let path = format!("select/?{encoded}");
                self.send_request("get", &path, None, HeaderMap::new()).await
            }
            QueryRoute::Post => {
                let mut headers = HeaderMap::new();
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static(
                        "application/x-www-form-urlencoded; charset=utf-8",
                    ),
                );
                self.send_request("post", "select/", Some(encoded), headers)
                    .await
            }
        }
    }

    /// Post an update envelope to the update handler.
    ///
    /// `clean_ctrl_chars` runs the payload through [`sanitize`]; it is on
    /// for every public operation because stray control characters make
    /// Solr reject the whole message. Callers positive their data is clean
    /// go through [`Solr::update_raw`].
    async fn update(
        &self,
        message: String,
        clean_ctrl_chars: bool,
        params: UpdateParams,
    ) -> Result<String> {
        let mut path = "update/".to_string();
        let query = params.to_query();
        if !query.is_empty() {
            path = format!("{path}?{query}");
        }

        let body = if clean_ctrl_chars {
            sanitize(&message).into_owned()
        } else {
            message
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/xml; charset=utf-8"),
        );
        self.send_request("post", &path, Some(body), headers).await
    }

    /// Perform a search and return the results.
    ///
    /// `q` is the query string; `params` are additional options passed
    /// through to the Solr URL, e.g. `&[("rows", "10"), ("hl", "true")]`.
    /// Specifying a default field with `df` is strongly recommended.
    pub async fn search(&self, q: &str, params: &[(&str, &str)]) -> Result<Results> {
        self.search_as(q, params).await
    }

    /// Like [`Solr::search`] but producing a caller-chosen results view.
    ///
    /// Any type constructible from the decoded response mapping works,
    /// including `serde_json::Value` itself.
    pub async fn search_as<R: From<Value>>(&self, q: &str, params: &[(&str, &str)]) -> Result<R> {
        let mut all: Vec<(&str, &str)> = vec![("q", q)];
        all.extend_from_slice(params);

        let response = self.select(&all).await?;
        let decoded: Value = serde_json::from_str(&response)?;

        debug!("Found '{}' search results.", num_found(&decoded));
        Ok(R::from(decoded))
    }

    /// Find and return results similar to the provided query.
    ///
    /// `mltfl` names the fields to use for similarity.
    pub async fn more_like_this(
        &self,
        q: &str,
        mltfl: &str,
        params: &[(&str, &str)],
    ) -> Result<Results> {
        let mut all: Vec<(&str, &str)> = vec![("q", q), ("mlt.fl", mltfl)];
        all.extend_from_slice(params);

        let path = format!("mlt/?{}", encode_params(&all));
        let response = self
            .send_request("get", &path, None, HeaderMap::new())
            .await?;
        let decoded: Value = serde_json::from_str(&response)?;

        debug!("Found '{}' MLT results.", num_found(&decoded));
        Ok(Results::from(decoded))
    }

    /// Suggest terms for the given field names and prefix.
    ///
    /// Returns a mapping keyed on field name containing `(term, count)`
    /// pairs. Both shapes of the `terms` response value (the older flat
    /// alternating list and the newer mapping) normalize to the same
    /// result.
    pub async fn suggest_terms(
        &self,
        fields: &[&str],
        prefix: &str,
        params: &[(&str, &str)],
    ) -> Result<IndexMap<String, Vec<(String, i64)>>> {
        let mut all: Vec<(&str, &str)> = fields.iter().map(|field| ("terms.fl", *field)).collect();
        all.push(("terms.prefix", prefix));
        all.extend_from_slice(params);

        let path = format!("terms/?{}", encode_params(&all));
        let response = self
            .send_request("get", &path, None, HeaderMap::new())
            .await?;
        let decoded: Value = serde_json::from_str(&response)?;

        let suggestions =
            normalize_term_suggestions(decoded.get("terms").unwrap_or(&Value::Null));
        debug!(
            "Found '{}' term suggestion results.",
            suggestions.values().map(Vec::len).sum::<usize>()
        );
        Ok(suggestions)
    }

    /// Add or update documents.
    ///
    /// Commits by default; see [`AddOptions`] for boosts, atomic-update
    /// directives and commit control.
    pub async fn add(&self, docs: &[Document], options: &AddOptions) -> Result<String> {
        let commit = options.commit.unwrap_or(true);
        let soft_commit = options.soft_commit.unwrap_or(false);

        let start = Instant::now();
        debug!("Starting to build add request...");
        let message = update::build_add(
            docs,
            options.boost.as_ref(),
            options.field_updates.as_ref(),
            options.commit_within,
        )?;
        debug!(
            "Built add request of {} docs in {:.2} seconds.",
            docs.len(),
            start.elapsed().as_secs_f64()
        );

        self.update(
            message,
            true,
            UpdateParams {
                commit: Some(commit),
                soft_commit: Some(soft_commit),
                wait_flush: options.wait_flush,
                wait_searcher: options.wait_searcher,
            },
        )
        .await
    }

    /// Delete documents by id or by query.
    ///
    /// Requires *either* `id` *or* `q`: passing neither or both is a
    /// caller-contract violation reported before any network I/O.
    pub async fn delete(
        &self,
        id: Option<&str>,
        q: Option<&str>,
        options: &DeleteOptions,
    ) -> Result<String> {
        let message = match (id, q) {
            (None, None) => {
                return Err(SolrError::invalid_argument(
                    "You must specify \"id\" or \"q\".",
                ));
            }
            (Some(_), Some(_)) => {
                return Err(SolrError::invalid_argument(
                    "You may only specify \"id\" OR \"q\", not both.",
                ));
            }
            (Some(id), None) => update::build_delete_by_id(id)?,
            (None, Some(q)) => update::build_delete_by_query(q)?,
        };

        self.update(
            message,
            true,
            UpdateParams {
                commit: Some(options.commit.unwrap_or(true)),
                soft_commit: None,
                wait_flush: options.wait_flush,
                wait_searcher: options.wait_searcher,
            },
        )
        .await
    }

    /// Force Solr to write the index data to disk.
    pub async fn commit(&self, options: &CommitOptions) -> Result<String> {
        let message = update::build_commit(options.expunge_deletes)?;
        self.update(
            message,
            true,
            UpdateParams {
                commit: None,
                soft_commit: Some(options.soft_commit.unwrap_or(false)),
                wait_flush: options.wait_flush,
                wait_searcher: options.wait_searcher,
            },
        )
        .await
    }

    /// Tell Solr to streamline the number of index segments, essentially
    /// a defragmentation operation.
    pub async fn optimize(&self, options: &OptimizeOptions) -> Result<String> {
        let message = update::build_optimize(options.max_segments)?;
        self.update(
            message,
            true,
            UpdateParams {
                commit: None,
                soft_commit: None,
                wait_flush: options.wait_flush,
                wait_searcher: options.wait_searcher,
            },
        )
        .await
    }

    /// Post a pre-built update envelope without sanitization.
    ///
    /// Only use this when the payload is guaranteed free of control
    /// characters.
    pub async fn update_raw(&self, message: String) -> Result<String> {
        self.update(message, false, UpdateParams::default()).await
    }

    /// Extract content and metadata from a rich document via the
    /// ExtractingRequestHandler.
    pub async fn extract(&self, _file_name: &str, _contents: &[u8]) -> Result<Value> {
        Err(SolrError::not_implemented(
            "extract() rich-document handling is not available",
        ))
    }
}

/// Pull `response.numFound` out of a decoded response for logging.
fn num_found(decoded: &Value) -> u64 {
    decoded
        .get("response")
        .and_then(|r| r.get("numFound"))
        .and_then(|n| n.as_u64())
        .unwrap_or(0)
}

/// Normalize the `terms` response value to field → `(term, count)` pairs.
///
/// Older Solr versions return a flat alternating list
/// (`["color", ["red", 5, ...]]`), newer ones a mapping
/// (`{"color": ["red", 5, ...]}`). Terms are run back through the value
/// codec since the wire text is untyped.
pub fn normalize_term_suggestions(terms: &Value) -> IndexMap<String, Vec<(String, i64)>> {
    let mut result: IndexMap<String, Vec<(String, i64)>> = IndexMap::new();

    let field_pairs = |values: &Value| -> Vec<(String, i64)> {
        let mut pairs = Vec::new();
        if let Some(items) = values.as_array() {
            for chunk in items.chunks(2) {
                if let [term, count] = chunk {
                    let term = match codec::decode(term) {
                        FieldValue::Text(text) => text,
                        other => other.to_string(),
                    };
                    pairs.push((term, count.as_i64().unwrap_or(0)));
                }
            }
        }
        pairs
    };

    match terms {
        Value::Array(flat) => {
            for chunk in flat.chunks(2) {
                if let [field, values] = chunk {
                    if let Some(name) = field.as_str() {
                        result.insert(name.to_string(), field_pairs(values));
                    }
                }
            }
        }
        Value::Object(map) => {
            for (field, values) in map {
                result.insert(field.clone(), field_pairs(values));
            }
        }
        _ => {}
    }

    result
}
