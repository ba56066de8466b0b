//! Command-line argument parsing for the gateway binary.
//!
//! Mirrors the teacher's `axum-example` `AppArgs`: a small `pico-args`
//! parser living next to `main`, not a general-purpose config loader (that
//! stays out of `docurift-core`'s scope per SPEC_FULL.md §6).

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use docurift_core::AnalyzerConfig;
use tracing::warn;
use url::Url;

/// Parsed gateway command-line arguments.
#[derive(Debug)]
pub struct GatewayArgs {
    /// Interface the gateway listens on.
    pub host: IpAddr,
    /// Port the gateway listens on.
    pub port: u16,
    /// The upstream backend every request is forwarded to.
    pub upstream: Url,
    /// Configuration handed to [`docurift_core::Analyzer`].
    pub analyzer: AnalyzerConfig,
}

impl GatewayArgs {
    /// Parse from `std::env::args`.
    ///
    /// # Errors
    ///
    /// Fails if `--upstream` is missing or not a valid URL, or if a flag's
    /// value cannot be parsed as its expected type.
    pub fn parse() -> Result<Self> {
        let mut pargs = pico_args::Arguments::from_env();

        let host = pargs
            .opt_value_from_str(["-h", "--host"])
            .context("parsing host argument")?;

        let port = pargs
            .opt_value_from_str(["-p", "--port"])
            .context("parsing port argument")?;

        let upstream: String = pargs
            .value_from_str("--upstream")
            .context("parsing upstream argument (required, e.g. --upstream http://localhost:3000)")?;
        let upstream = Url::parse(&upstream).context("parsing upstream as a URL")?;

        let storage_path: Option<String> = pargs
            .opt_value_from_str("--storage-path")
            .context("parsing storage-path argument")?;

        let storage_frequency_secs: Option<u64> = pargs
            .opt_value_from_str("--storage-frequency")
            .context("parsing storage-frequency argument")?;

        let max_examples: Option<usize> = pargs
            .opt_value_from_str("--max-examples")
            .context("parsing max-examples argument")?;

        let redact: Option<String> = pargs
            .opt_value_from_str("--redact")
            .context("parsing redact argument")?;

        let result = Self {
            host: host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: port.unwrap_or(8080),
            upstream,
            analyzer: AnalyzerConfig {
                max_examples: max_examples.unwrap_or(10),
                redacted_fields: redact
                    .map(|list| list.split(',').map(str::trim).map(str::to_owned).collect())
                    .unwrap_or_default(),
                storage_path: storage_path.map(PathBuf::from).unwrap_or_else(|| PathBuf::from(".docurift")),
                storage_frequency: Duration::from_secs(storage_frequency_secs.unwrap_or(10)),
            },
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            warn!(?remaining, "unused arguments left");
        }
        Ok(result)
    }
}
