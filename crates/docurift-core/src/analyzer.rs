//! The [`Analyzer`]: process-wide owner of the [`Registry`] and redaction
//! list, and the [`Analyzer::process`] capture pipeline entry point.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::config::{AnalyzerConfig, EXCLUDED_HEADERS};
use crate::endpoint::Registry;
use crate::gzip;
use crate::json_extract;
use crate::redaction::RedactionList;
use crate::url;
use crate::value::JsonValue;

/// One observed request/response exchange, already materialized by the
/// transport layer.
///
/// Headers are multi-valued: a single header name may legitimately appear
/// more than once (`Set-Cookie` being the canonical example), so every
/// value list is walked in full rather than just the first entry.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The HTTP method, e.g. `"GET"`.
    pub method: String,
    /// The full raw request URL, including scheme, host, and query string.
    pub url: String,
    /// Request headers as observed on the wire.
    pub request_headers: IndexMap<String, Vec<String>>,
    /// The raw request body bytes, or empty if there was none.
    pub request_body: Vec<u8>,
    /// The response status code.
    pub response_status: u16,
    /// Response headers as observed on the wire.
    pub response_headers: IndexMap<String, Vec<String>>,
    /// The raw response body bytes, or empty if there was none.
    pub response_body: Vec<u8>,
}

/// Process-wide owner of the endpoint [`Registry`] and the [`RedactionList`].
///
/// An `Analyzer` is the explicit dependency threaded into every capture
/// call site; nothing in this crate relies on module-global mutable state.
#[derive(Debug)]
pub struct Analyzer {
    registry: Registry,
    redaction: Arc<RedactionList>,
    max_examples: usize,
}

impl Analyzer {
    /// Build a new analyzer from `config`. Does not load any snapshot; call
    /// [`crate::persist::load_snapshot`] separately if resuming from disk.
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            registry: Registry::new(),
            redaction: Arc::new(RedactionList::new(config.redacted_fields.clone())),
            max_examples: config.max_examples.max(1),
        }
    }

    /// The endpoint registry, for the OpenAPI assembler and the raw
    /// `/api/analyzer` view.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The redaction list, shared by reference into every store this
    /// analyzer creates.
    pub fn redaction(&self) -> &Arc<RedactionList> {
        &self.redaction
    }

    /// The configured per-path example cap.
    pub fn max_examples(&self) -> usize {
        self.max_examples
    }

    /// Observe one exchange, feeding every applicable schema store.
    ///
    /// Never returns an error and never panics on malformed input: a
    /// documentation engine must not perturb the traffic it watches.
    /// Responses with `status >= 400` are discarded entirely before any
    /// state is touched, since an error response is not evidence of the
    /// API's contract.
    pub async fn process(&self, exchange: Exchange) {
        if exchange.response_status >= 400 {
            trace!(status = exchange.response_status, "discarding error response");
            return;
        }

        let query = url::parse_query(&exchange.url);
        let path = url::normalize(&exchange.url);
        let method = exchange.method.to_uppercase();

        let endpoint = self
            .registry
            .get_or_create(&method, &path, &self.redaction, self.max_examples)
            .await;

        for (name, values) in &query {
            for value in values {
                endpoint
                    .url_parameters
                    .add_value(name, JsonValue::String(value.clone()))
                    .await;
            }
            endpoint.url_parameters.set_optional(name, true).await;
        }

        write_headers(&endpoint.request_headers, &exchange.request_headers).await;

        if !exchange.request_body.is_empty() {
            if let Some(value) = decode_json(&exchange.request_body) {
                json_extract::extract(&endpoint.request_payload, "", &value).await;
            } else {
                debug!("request body is not valid json, skipping payload extraction");
            }
        }

        let slot = endpoint.get_or_create_response_slot(exchange.response_status).await;
        write_headers(&slot.headers, &exchange.response_headers).await;

        if !exchange.response_body.is_empty() {
            let body = if is_gzip(&exchange.response_headers) {
                match gzip::decompress(&exchange.response_body) {
                    Some(decompressed) => decompressed,
                    None => {
                        warn!("failed to decompress gzip response body, skipping");
                        return;
                    }
                }
            } else {
                exchange.response_body
            };
            if let Some(value) = decode_json(&body) {
                json_extract::extract(&slot.payload, "", &value).await;
            } else {
                debug!("response body is not valid json, skipping payload extraction");
            }
        }
    }
}

async fn write_headers(store: &crate::schema_store::SchemaStore, headers: &IndexMap<String, Vec<String>>) {
    for (name, values) in headers {
        if EXCLUDED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        for value in values {
            store.add_value(name, JsonValue::String(value.clone())).await;
        }
    }
}

fn is_gzip(headers: &IndexMap<String, Vec<String>>) -> bool {
    headers
        .get("Content-Encoding")
        .is_some_and(|values| values.iter().any(|v| v.eq_ignore_ascii_case("gzip")))
}

fn decode_json(bytes: &[u8]) -> Option<JsonValue> {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()
        .map(JsonValue::from)
}
