//! Error types for the Solander library.
//!
//! Every fallible operation in this crate returns [`SolrError`]. Transport
//! failures are classified into descriptive variants before they reach the
//! caller; the raw error from the HTTP layer is never surfaced directly, so
//! the message always carries enough context (URL, method, scraped server
//! diagnostics) to act on.
//!
//! # Examples
//!
//! ```
//! use solander::error::{SolrError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SolrError::invalid_argument("You must specify \"id\" or \"q\"."))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for Solander operations.
///
/// Uses the `thiserror` crate for the `Error` trait implementation. The
/// display string of each variant is part of the public contract: it embeds
/// the attempted URL, the offending method name, or the diagnostics scraped
/// from the server's error page, depending on the failure.
#[derive(Error, Debug)]
pub enum SolrError {
    /// The request URL is empty or has no `http`/`https` scheme.
    #[error("URL is empty or protocol missing: {url}")]
    InvalidUrl {
        /// The URL that was attempted.
        url: String,
    },

    /// The encoded request URL exceeds what the transport will accept.
    #[error("URL is too long: {url}")]
    UrlTooLong {
        /// The URL that was attempted.
        url: String,
    },

    /// Name resolution failed before a connection could be established.
    #[error("Socket error (DNS?) connecting to {url}")]
    Resolve {
        /// The URL that was attempted.
        url: String,
    },

    /// The HTTP method name is not one the transport understands.
    #[error("Unknown HTTP method \"{method}\"")]
    UnknownMethod {
        /// The offending method name.
        method: String,
    },

    /// The connection failed or was dropped mid-request.
    #[error("Connection error with {url}")]
    Connection {
        /// The URL that was attempted.
        url: String,
    },

    /// The configured per-request timeout elapsed.
    #[error("Request to {url} timed out")]
    Timeout {
        /// The URL that was attempted.
        url: String,
    },

    /// Solr (or its servlet container) answered with a non-2xx status.
    ///
    /// The message is the best-effort `reason: detail` pair scraped from
    /// the response body; see [`crate::scrape`].
    #[error("Solr responded with an error (HTTP {status}): {message}")]
    Http {
        /// The HTTP status code of the response.
        status: u16,
        /// Scraped reason and detail text.
        message: String,
    },

    /// A caller-contract violation detected before any network I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The response body could not be decoded as JSON.
    #[error("Response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// An update envelope failed to serialize.
    #[error("Update serialization error: {0}")]
    Serialize(String),

    /// The operation exists in the API surface but has no implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

/// Result type alias for operations that may fail with [`SolrError`].
pub type Result<T> = std::result::Result<T, SolrError>;

impl SolrError {
    /// Create a new invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SolrError::InvalidArgument(msg.into())
    }

    /// Create a new not-implemented error.
    pub fn not_implemented<S: Into<String>>(msg: S) -> Self {
        SolrError::NotImplemented(msg.into())
    }
}
