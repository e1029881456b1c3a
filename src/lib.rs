//! # Solander
//!
//! An asynchronous Apache Solr client for Rust.
//!
//! ## Features
//!
//! - Non-blocking search, more-like-this and term-suggestion queries
//! - XML update envelopes: add, delete, commit, optimize
//! - Payload sanitization keeping update messages XML-safe
//! - Typed value codec for Solr's untyped wire text
//! - Best-effort diagnostics scraped from container error pages
//!
//! ## Usage
//!
//! ```no_run
//! use solander::{Document, Solr};
//! use solander::client::AddOptions;
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
//! let results = solr.search("title:test", &[]).await?;
//! for doc in &results {
//!     println!("{doc}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod client;
pub mod codec;
pub mod document;
pub mod error;
pub mod results;
pub mod sanitize;
pub mod scrape;
pub mod update;

// Re-export commonly used types
pub use client::{Solr, SolrBuilder};
pub use document::{Document, DocumentBuilder, FieldValue};
pub use error::{Result, SolrError};
pub use results::Results;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
