//! Durable snapshot persistence: a background task that periodically writes
//! the endpoint registry to disk, and a loader that restores it at startup.
//!
//! The periodic task follows the same `select!`-over-timer-and-shutdown-
//! signal shape used for background workers throughout the wider ecosystem
//! this crate's stack is drawn from: one spawned task, one `tokio::time::
//! interval`, one shutdown channel.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::config::SNAPSHOT_VERSION;
use crate::endpoint::EndpointSnapshot;
use crate::error::DocuRiftError;

const SNAPSHOT_FILE_NAME: &str = "analyzer.json";

/// The full on-disk snapshot document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    /// The format version this document was written with.
    pub version: String,
    /// Every endpoint, keyed by `"METHOD path"`.
    pub endpoints: IndexMap<String, EndpointSnapshot>,
}

fn snapshot_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join(SNAPSHOT_FILE_NAME)
}

/// Write the analyzer's current registry to `storage_dir`, replacing any
/// previous snapshot. The write goes to a sibling `.tmp` file first and is
/// then renamed into place, so a crash mid-write never leaves a half-written
/// snapshot behind.
///
/// Returns `Err` on a genuine I/O or serialization failure; callers on the
/// periodic task path are expected to log and retry on the next tick rather
/// than propagate, matching the spec's best-effort persistence contract.
pub async fn save_snapshot(analyzer: &Analyzer, storage_dir: &Path) -> Result<(), DocuRiftError> {
    let state = PersistedState {
        version: SNAPSHOT_VERSION.to_owned(),
        endpoints: analyzer.registry().snapshot().await,
    };

    let json = serde_json::to_vec_pretty(&state).map_err(DocuRiftError::SnapshotSerialize)?;

    tokio::fs::create_dir_all(storage_dir)
        .await
        .map_err(|source| DocuRiftError::InvalidStoragePath {
            path: storage_dir.to_path_buf(),
            source,
        })?;

    let target = snapshot_path(storage_dir);
    let tmp = target.with_extension("json.tmp");

    tokio::fs::write(&tmp, &json).await.map_err(DocuRiftError::SnapshotIo)?;
    tokio::fs::rename(&tmp, &target).await.map_err(DocuRiftError::SnapshotIo)?;
    Ok(())
}

/// Load a previously-written snapshot from `storage_dir` and restore it into
/// `analyzer`. A missing file, malformed JSON, or version mismatch all result
/// in the analyzer being left with an empty registry — none of these are
/// treated as errors worth surfacing. Only a genuine read failure (permission
/// denied, and the like) is returned as `Err`.
pub async fn load_snapshot(analyzer: &Analyzer, storage_dir: &Path) -> Result<(), DocuRiftError> {
    let path = snapshot_path(storage_dir);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no existing snapshot, starting empty");
            return Ok(());
        }
        Err(err) => return Err(DocuRiftError::SnapshotIo(err)),
    };

    let state: PersistedState = match serde_json::from_slice(&bytes) {
        Ok(state) => state,
        Err(err) => {
            warn!(%err, "snapshot file is malformed, starting empty");
            return Ok(());
        }
    };

    if state.version != SNAPSHOT_VERSION {
        warn!(
            found = %state.version,
            expected = SNAPSHOT_VERSION,
            "snapshot version mismatch, starting empty"
        );
        return Ok(());
    }

    analyzer
        .registry()
        .restore(state.endpoints, analyzer.redaction(), analyzer.max_examples())
        .await;
    info!("restored analyzer state from snapshot");
    Ok(())
}

/// A handle to the background snapshot task, allowing a clean shutdown.
#[derive(Debug)]
pub struct SnapshotHandle {
    shutdown: watch::Sender<()>,
    join: JoinHandle<()>,
}

impl SnapshotHandle {
    /// Signal the background task to stop and wait for it to finish its
    /// current tick.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let _ = self.join.await;
    }
}

/// Spawn the periodic snapshot task. Writes a snapshot every `frequency`
/// until [`SnapshotHandle::shutdown`] is called or the handle is dropped.
pub fn spawn_snapshot_task(analyzer: Arc<Analyzer>, storage_dir: PathBuf, frequency: Duration) -> SnapshotHandle {
    let (tx, mut rx) = watch::channel(());
    let join = tokio::spawn(async move {
        let mut ticker = interval(frequency);
        ticker.tick().await; // first tick fires immediately; skip it
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = save_snapshot(&analyzer, &storage_dir).await {
                        warn!(%err, "failed to write snapshot, will retry next tick");
                    }
                }
                _ = rx.changed() => {
                    if let Err(err) = save_snapshot(&analyzer, &storage_dir).await {
                        warn!(%err, "failed to write snapshot during shutdown");
                    }
                    break;
                }
            }
        }
    });
    SnapshotHandle { shutdown: tx, join }
}
