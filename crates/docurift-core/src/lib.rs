#![cfg_attr(docsrs, feature(doc_cfg))]

//! # DocuRift Core
//!
//! A passive, in-process engine that turns real HTTP traffic into API
//! documentation. It does not speak HTTP itself — a reverse proxy or
//! middleware layer materializes each observed request/response pair into
//! an [`Exchange`] and hands it to [`Analyzer::process`]; this crate owns
//! everything from there on: URL normalization, path-keyed example
//! collection with redaction and bounded retention, durable snapshotting,
//! and assembling an OpenAPI 3.0 document from whatever has been observed
//! so far.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docurift_core::{Analyzer, AnalyzerConfig, Exchange};
//! use indexmap::IndexMap;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let analyzer = Analyzer::new(&AnalyzerConfig::default());
//!
//! analyzer
//!     .process(Exchange {
//!         method: "GET".to_owned(),
//!         url: "https://api.example.com/users/123".to_owned(),
//!         request_headers: IndexMap::new(),
//!         request_body: Vec::new(),
//!         response_status: 200,
//!         response_headers: IndexMap::new(),
//!         response_body: br#"{"id":123,"name":"Ada"}"#.to_vec(),
//!     })
//!     .await;
//!
//! let document = docurift_core::openapi::assemble(analyzer.registry()).await;
//! # let _ = document;
//! # }
//! ```
//!
//! Every endpoint observed lands under its normalized path template
//! (`/users/{id}`, not `/users/123`), so repeated calls to the same logical
//! endpoint accumulate into a single, increasingly complete schema rather
//! than one entry per concrete URL.

pub mod analyzer;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod gzip;
pub mod json_extract;
pub mod openapi;
pub mod persist;
pub mod redaction;
pub mod schema_store;
pub mod synthesize;
pub mod url;
pub mod value;

pub use analyzer::{Analyzer, Exchange};
pub use config::AnalyzerConfig;
pub use error::DocuRiftError;
pub use persist::{PersistedState, SnapshotHandle, load_snapshot, save_snapshot, spawn_snapshot_task};
pub use value::JsonValue;
