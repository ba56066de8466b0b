//! Shared application state injected into every axum handler.

use std::sync::Arc;

use anyhow::Context;
use docurift_core::Analyzer;
use url::Url;

/// State shared across the gateway's handlers: the analyzer every observed
/// exchange is fed into, the HTTP client used to reach the upstream, and the
/// upstream's base URL.
#[derive(Clone)]
pub struct AppState {
    analyzer: Arc<Analyzer>,
    client: reqwest::Client,
    upstream: Url,
}

impl AppState {
    /// Build the gateway state.
    ///
    /// # Errors
    ///
    /// Fails if the underlying `reqwest` client cannot be built.
    pub fn new(analyzer: Arc<Analyzer>, upstream: Url) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("building reqwest client")?;
        Ok(Self {
            analyzer,
            client,
            upstream,
        })
    }

    pub(crate) fn analyzer(&self) -> &Arc<Analyzer> {
        &self.analyzer
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(crate) fn upstream(&self) -> &Url {
        &self.upstream
    }
}
