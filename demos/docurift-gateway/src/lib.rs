#![allow(missing_docs)]
//! A thin reverse proxy that forwards every request to a configured upstream
//! and feeds the observed exchange into [`docurift_core::Analyzer`].
//!
//! This crate is explicitly a demonstration of the core engine running end
//! to end; the transport, CLI parsing, and Postman serializer it carries
//! are out-of-scope collaborators per `SPEC_FULL.md` §1 and §6, kept small
//! and obvious rather than production-hardened.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use docurift_core::{Analyzer, AnalyzerConfig};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use url::Url;

mod docs;
mod proxy;
mod routes;
mod state;

use self::routes::app_router;
use self::state::AppState;

/// Build the analyzer (loading any existing snapshot), bind a listener, and
/// serve the gateway until the process receives a shutdown signal.
///
/// # Errors
///
/// Fails if the socket cannot be bound or the server cannot be launched.
pub async fn run(addr: SocketAddr, upstream: Url, analyzer_config: AnalyzerConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("opening {addr}"))?;
    info!("Using address {addr}");

    launch(listener, upstream, analyzer_config).await
}

/// Launch the server on an already-bound listener.
///
/// # Errors
///
/// Fails if the server cannot be launched.
pub async fn launch(
    listener: tokio::net::TcpListener,
    upstream: Url,
    analyzer_config: AnalyzerConfig,
) -> anyhow::Result<()> {
    let storage_path = analyzer_config.storage_path.clone();
    let storage_frequency = analyzer_config.storage_frequency;

    let analyzer = Arc::new(Analyzer::new(&analyzer_config));
    if let Err(err) = docurift_core::load_snapshot(&analyzer, &storage_path).await {
        warn!(%err, "failed to load existing snapshot, starting with an empty registry");
    }

    let snapshot_handle =
        docurift_core::spawn_snapshot_task(analyzer.clone(), storage_path, storage_frequency);

    let state = AppState::new(analyzer, upstream).context("building gateway client")?;
    let app = app_router().layer(TraceLayer::new_for_http()).with_state(state);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("starting server")?;

    snapshot_handle.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let _ = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("installing SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
