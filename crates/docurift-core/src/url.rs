//! Pure URL normalization: turning a raw observed URL into a path template
//! with numeric and UUID segments replaced by placeholders, plus its query
//! map.
//!
//! Both functions are stateless and side-effect free; they exist purely to
//! be called from the capture pipeline before anything touches shared
//! state.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

/// Matches a canonical UUID, case-insensitively.
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$",
    )
    .expect("a valid regex")
});

/// Replace numeric path segments with `{id}` and UUID path segments with
/// `{uuid}`, and strip any query string.
///
/// Input with no scheme marker (`://`) is returned unchanged other than the
/// query-string strip, matching the contract that a bare path (or a string
/// with no recognizable authority) passes through untouched.
pub fn normalize(raw: &str) -> String {
    let without_query = strip_query(raw);

    let path = match without_query.find("://") {
        Some(scheme_end) => {
            let after_scheme = &without_query[scheme_end + 3..];
            match after_scheme.find('/') {
                Some(path_start) => &after_scheme[path_start..],
                None => "/",
            }
        }
        None => return without_query.to_owned(),
    };

    let normalized_segments: Vec<String> = path
        .split('/')
        .map(|segment| {
            if segment.is_empty() {
                segment.to_owned()
            } else if segment.parse::<i64>().is_ok() {
                "{id}".to_owned()
            } else if UUID_RE.is_match(segment) {
                "{uuid}".to_owned()
            } else {
                segment.to_owned()
            }
        })
        .collect();

    normalized_segments.join("/")
}

/// Extract the multi-valued query map from a raw URL, before normalization
/// strips it.
pub fn parse_query(raw: &str) -> IndexMap<String, Vec<String>> {
    let mut map: IndexMap<String, Vec<String>> = IndexMap::new();
    let Some((_, query)) = raw.split_once('?') else {
        return map;
    };
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        map.entry(key.to_owned()).or_default().push(value.to_owned());
    }
    map
}

fn strip_query(raw: &str) -> &str {
    raw.split_once('?').map_or(raw, |(path, _)| path)
}
