//! Error types for the handful of fallible, non-hot-path operations the
//! engine exposes.
//!
//! The capture path itself (see [`crate::analyzer::Analyzer::process`]) is
//! infallible by design: a documentation engine must never perturb the
//! traffic it observes, so parse/decode/I-O problems on that path are
//! logged and swallowed rather than surfaced here. This enum exists for the
//! construction-time and assembly-time operations that legitimately can
//! fail.

use std::path::PathBuf;

/// Errors surfaced by `docurift-core`'s non-hot-path operations.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
#[non_exhaustive]
pub enum DocuRiftError {
    /// The configured storage directory could not be created or is not
    /// writable.
    #[display("invalid storage path {path:?}: {source}")]
    #[from(skip)]
    InvalidStoragePath {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Reading or writing the snapshot file failed.
    #[display("snapshot I/O failed: {_0}")]
    SnapshotIo(std::io::Error),

    /// The snapshot could not be serialized to JSON.
    #[display("failed to serialize snapshot: {_0}")]
    #[from(skip)]
    SnapshotSerialize(serde_json::Error),

    /// The OpenAPI document could not be serialized.
    #[display("failed to serialize openapi document: {_0}")]
    #[from(skip)]
    OpenApiSerialize(serde_json::Error),
}
