//! Field-name based redaction.
//!
//! The teacher's own redaction module builds JSON-Pointer edits against a
//! specific captured value (`RedactionBuilder`); this engine's redaction is
//! coarser and cheaper by design, since it has to run on every leaf of every
//! observed body: a process-wide, case-insensitive set of field names, any
//! match replacing the captured value with the literal `"REDACTED"`.

use std::collections::HashSet;

use crate::value::JsonValue;

/// A process-wide, case-insensitive set of field names whose values should
/// never be retained verbatim.
#[derive(Debug, Clone, Default)]
pub struct RedactionList {
    lowercased: HashSet<String>,
}

impl RedactionList {
    /// Build a redaction list from configured field names.
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            lowercased: fields
                .into_iter()
                .map(|field| field.into().to_lowercase())
                .collect(),
        }
    }

    /// `true` if `name` (a header name, query parameter name, or the final
    /// segment of a schema path) is on the redaction list.
    pub fn matches(&self, name: &str) -> bool {
        self.lowercased.contains(&name.to_lowercase())
    }

    /// Apply redaction to `value` if `name` matches; otherwise return it
    /// unchanged.
    pub fn apply(&self, name: &str, value: JsonValue) -> JsonValue {
        if self.matches(name) {
            JsonValue::redacted()
        } else {
            value
        }
    }

    /// The final segment of a dotted schema path, used to decide whether a
    /// leaf value should be redacted (the path `password` and the path
    /// `user.password` redact the same way).
    pub fn final_segment(path: &str) -> &str {
        let trimmed = path.strip_suffix("[]").unwrap_or(path);
        trimmed.rsplit('.').next().unwrap_or(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_is_case_insensitive() {
        let list = RedactionList::new(["Authorization", "password"]);
        assert!(list.matches("authorization"));
        assert!(list.matches("PASSWORD"));
        assert!(!list.matches("name"));
    }

    #[test]
    fn apply_replaces_matched_values() {
        let list = RedactionList::new(["password"]);
        let redacted = list.apply("password", JsonValue::String("p".to_owned()));
        assert_eq!(redacted, JsonValue::redacted());
        let kept = list.apply("name", JsonValue::String("n".to_owned()));
        assert_eq!(kept, JsonValue::String("n".to_owned()));
    }

    #[test]
    fn final_segment_strips_dotted_prefix_and_array_marker() {
        assert_eq!(RedactionList::final_segment("user.password"), "password");
        assert_eq!(RedactionList::final_segment("user.friends[]"), "friends");
        assert_eq!(RedactionList::final_segment("password"), "password");
    }
}
