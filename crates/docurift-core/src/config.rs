//! The configuration surface the core consumes.
//!
//! Loading these values from a file or CLI flags is an embedding concern
//! (see `docurift-gateway`'s own config handling) and stays out of this
//! crate; `AnalyzerConfig` is a plain struct the host application
//! constructs however it likes.

use std::path::PathBuf;
use std::time::Duration;

/// Header names excluded from capture because they describe the transport,
/// not the API contract.
pub const EXCLUDED_HEADERS: &[&str] = &[
    "Content-Length",
    "Content-Type",
    "Date",
    "Server",
    "Connection",
    "Keep-Alive",
    "Transfer-Encoding",
    "Accept",
    "Accept-Encoding",
    "Accept-Language",
    "User-Agent",
    "Host",
];

/// The snapshot format version this build writes and accepts on load. A
/// mismatch on load discards the snapshot rather than attempting migration.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Configuration consumed by [`crate::analyzer::Analyzer`].
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Maximum number of distinct examples retained per path. Must be at
    /// least 1.
    pub max_examples: usize,
    /// Field, header, and query-parameter names redacted case-insensitively.
    pub redacted_fields: Vec<String>,
    /// Directory the snapshot file is written to and loaded from.
    pub storage_path: PathBuf,
    /// How often the background persistor writes a snapshot.
    pub storage_frequency: Duration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_examples: 10,
            redacted_fields: Vec::new(),
            storage_path: PathBuf::from("."),
            storage_frequency: Duration::from_secs(10),
        }
    }
}
