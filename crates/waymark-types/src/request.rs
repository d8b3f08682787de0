//! The per-call unit of work: raw request text plus optional hints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Structured hints a caller may attach to a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestHints {
    /// Skill the caller most recently invoked, if any. Its id tokens
    /// join the request tokens during matching as a continuity signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_skill: Option<String>,
    /// Detected context tags (e.g. platform or project markers). Folded
    /// into matching as additional request tokens.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_tags: Vec<String>,
    /// Pre-supplied decision-tree answers, keyed `"skill-id/node-id"`.
    /// Branch nodes without an answer here take their default child.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub answers: BTreeMap<String, String>,
}

/// One resolution request. Created per call, discarded after the caller
/// consumes the plan; carries no persistent identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub text: String,
    #[serde(default)]
    pub hints: RequestHints,
}

impl Request {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            hints: RequestHints::default(),
        }
    }

    pub fn with_hints(text: impl Into<String>, hints: RequestHints) -> Self {
        Self {
            text: text.into(),
            hints,
        }
    }

    /// Hint key for a branch answer on `skill`'s node `node`.
    pub fn answer_key(skill: &str, node: &str) -> String {
        format!("{skill}/{node}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_without_hints_serializes_compactly() {
        let req = Request::new("my app was rejected");
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("previous_skill"), "got: {json}");
        assert!(!json.contains("answers"), "got: {json}");
    }

    #[test]
    fn answer_key_format() {
        assert_eq!(Request::answer_key("perf-router", "n2"), "perf-router/n2");
    }

    #[test]
    fn hints_round_trip() {
        let mut hints = RequestHints::default();
        hints.context_tags.push("swiftui".into());
        hints
            .answers
            .insert("perf-router/n1".into(), "layout".into());
        let req = Request::with_hints("slow scrolling", hints);
        let json = serde_json::to_string(&req).unwrap();
        let back: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hints.context_tags, vec!["swiftui".to_owned()]);
        assert_eq!(
            back.hints.answers.get("perf-router/n1").map(String::as_str),
            Some("layout")
        );
    }
}
