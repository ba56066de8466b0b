//! The catch-all reverse-proxy handler: forwards every request to the
//! configured upstream, relays the response back to the caller, and feeds
//! the materialized exchange into the analyzer.
//!
//! Bodies are buffered in full rather than streamed — acceptable at demo
//! scale, and explicitly out of the core's concerns per SPEC_FULL.md §1
//! ("the reverse-proxying transport itself ... streaming, forwarding").

use axum::body::Bytes;
use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use docurift_core::Exchange;
use indexmap::IndexMap;
use tracing::warn;

use crate::state::AppState;

/// Forward one request to the upstream and observe the resulting exchange.
pub async fn proxy(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let mut target = state.upstream().clone();
    target.set_path(uri.path());
    target.set_query(uri.query());

    let mut forwarded_headers = headers.clone();
    forwarded_headers.remove(axum::http::header::HOST);

    let request = state
        .client()
        .request(method.clone(), target.as_str())
        .headers(forwarded_headers)
        .body(body.clone());

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            warn!(%err, %target, "upstream request failed");
            return (StatusCode::BAD_GATEWAY, "upstream request failed").into_response();
        }
    };

    let status = response.status();
    let response_headers = response.headers().clone();
    let response_body = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(%err, %target, "failed to read upstream response body");
            return (StatusCode::BAD_GATEWAY, "failed to read upstream response").into_response();
        }
    };

    let exchange = Exchange {
        method: method.as_str().to_owned(),
        url: target.to_string(),
        request_headers: header_map_to_multi(&headers),
        request_body: body.to_vec(),
        response_status: status.as_u16(),
        response_headers: header_map_to_multi(&response_headers),
        response_body: response_body.to_vec(),
    };
    state.analyzer().process(exchange).await;

    let mut builder = axum::http::Response::builder().status(status);
    if let Some(builder_headers) = builder.headers_mut() {
        *builder_headers = response_headers;
    }
    builder
        .body(axum::body::Body::from(response_body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn header_map_to_multi(headers: &HeaderMap) -> IndexMap<String, Vec<String>> {
    let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
    for (name, value) in headers {
        let Ok(value) = value.to_str() else { continue };
        map.entry(canonicalize_header_name(name.as_str()))
            .or_default()
            .push(value.to_owned());
    }
    map
}

/// `http::HeaderName::as_str()` is always lowercase, but the core's fixed
/// exclusion list and gzip check (`Content-Type`, `Content-Encoding`,
/// `Host`, ...) compare case-sensitively against Title-Case names, so every
/// header is re-cased to that convention before it reaches the analyzer.
fn canonicalize_header_name(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_single_word_header() {
        assert_eq!(canonicalize_header_name("host"), "Host");
    }

    #[test]
    fn canonicalizes_hyphenated_header() {
        assert_eq!(canonicalize_header_name("content-type"), "Content-Type");
        assert_eq!(canonicalize_header_name("content-encoding"), "Content-Encoding");
        assert_eq!(canonicalize_header_name("user-agent"), "User-Agent");
        assert_eq!(canonicalize_header_name("keep-alive"), "Keep-Alive");
    }
}
