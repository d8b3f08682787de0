//! Trigger index: normalized inverted maps built once per snapshot.
//!
//! Every trigger/anti-trigger pattern is normalized (case-fold,
//! whitespace collapse, alphanumeric tokenization) and compiled; an
//! inverted token map narrows a request to candidate skills and the
//! compiled patterns drive exact scoring. All containers are BTree
//! based so identical registry content always yields an identical
//! index, which keeps matching reproducible.

use std::collections::{BTreeMap, BTreeSet};

use waymark_types::skill::{TriggerKind, TriggerPattern};

use crate::registry::Registry;

/// Lowercase and collapse runs of whitespace into single spaces.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased alphanumeric tokens, split on everything else.
///
/// "Guideline 2.1" tokenizes to ["guideline", "2", "1"], so dotted
/// section numbers still match token patterns.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// A trigger pattern pre-normalized for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    /// Original phrase, reported in match provenance.
    pub phrase: String,
    /// Normalized phrase for substring (exact) matching.
    pub normalized: String,
    /// Normalized tokens for token-set and prefix matching.
    pub tokens: Vec<String>,
    pub kind: TriggerKind,
    pub weight: u32,
}

impl CompiledPattern {
    fn compile(pattern: &TriggerPattern) -> Self {
        Self {
            phrase: pattern.phrase.clone(),
            normalized: normalize(&pattern.phrase),
            tokens: tokenize(&pattern.phrase),
            kind: pattern.kind,
            weight: pattern.weight,
        }
    }
}

/// Compiled triggers and anti-triggers of one skill.
#[derive(Debug, Clone, Default)]
pub struct SkillPatterns {
    pub triggers: Vec<CompiledPattern>,
    pub anti_triggers: Vec<CompiledPattern>,
}

/// The per-snapshot inverted index.
#[derive(Debug)]
pub struct TriggerIndex {
    /// Token -> (skill id -> max pattern weight). Candidate discovery.
    tokens: BTreeMap<String, BTreeMap<String, u32>>,
    /// Normalized exact phrases kept verbatim for substring scans.
    exact_phrases: Vec<(String, String)>,
    /// `(stem, skill id)` for prefix patterns; a stem matching the
    /// start of any request token makes the skill a candidate.
    prefix_stems: Vec<(String, String)>,
    /// Skill id -> compiled patterns, for full scoring.
    patterns: BTreeMap<String, SkillPatterns>,
}

impl TriggerIndex {
    /// Build the index from a validated registry snapshot.
    pub fn build(registry: &Registry) -> Self {
        let mut tokens: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
        let mut exact_phrases = Vec::new();
        let mut prefix_stems = Vec::new();
        let mut patterns: BTreeMap<String, SkillPatterns> = BTreeMap::new();

        for skill in registry.iter() {
            let mut compiled = SkillPatterns::default();

            for trigger in &skill.triggers {
                let pattern = CompiledPattern::compile(trigger);
                for token in &pattern.tokens {
                    let entry = tokens
                        .entry(token.clone())
                        .or_default()
                        .entry(skill.id.clone())
                        .or_insert(0);
                    *entry = (*entry).max(pattern.weight);
                }
                if pattern.kind == TriggerKind::Exact {
                    exact_phrases.push((pattern.normalized.clone(), skill.id.clone()));
                }
                if pattern.kind == TriggerKind::Prefix {
                    if let Some(stem) = pattern.tokens.first() {
                        prefix_stems.push((stem.clone(), skill.id.clone()));
                    }
                }
                compiled.triggers.push(pattern);
            }

            for anti in &skill.anti_triggers {
                compiled.anti_triggers.push(CompiledPattern::compile(anti));
            }

            patterns.insert(skill.id.clone(), compiled);
        }

        exact_phrases.sort();
        prefix_stems.sort();

        tracing::debug!(
            tokens = tokens.len(),
            exact_phrases = exact_phrases.len(),
            prefix_stems = prefix_stems.len(),
            skills = patterns.len(),
            "trigger index built"
        );

        Self {
            tokens,
            exact_phrases,
            prefix_stems,
            patterns,
        }
    }

    /// Skills whose triggers share at least one token with the request,
    /// whose exact phrase occurs in it, or whose prefix stem starts one
    /// of its tokens. Deterministically ordered.
    pub fn candidates(&self, request_tokens: &[String], request_normalized: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for token in request_tokens {
            if let Some(skills) = self.tokens.get(token) {
                out.extend(skills.keys().cloned());
            }
        }
        for (phrase, skill_id) in &self.exact_phrases {
            if request_normalized.contains(phrase.as_str()) {
                out.insert(skill_id.clone());
            }
        }
        for (stem, skill_id) in &self.prefix_stems {
            if request_tokens.iter().any(|t| t.starts_with(stem.as_str())) {
                out.insert(skill_id.clone());
            }
        }
        out
    }

    /// Compiled patterns for one skill.
    pub fn patterns(&self, skill_id: &str) -> Option<&SkillPatterns> {
        self.patterns.get(skill_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_types::config::RouterConfig;
    use waymark_types::skill::SkillSource;

    fn registry() -> Registry {
        let sources = [
            SkillSource::new(
                "rejection.md",
                r#"---
name: rejection-diagnostics
description: Diagnose app rejections
triggers:
  - rejected
  - phrase: "guideline"
    weight: 2
  - phrase: "app review rejection"
    kind: exact
    weight: 3
---
body
"#,
            ),
            SkillSource::new(
                "general.md",
                "---\nname: general-help\ndescription: catch-all\n---\nbody\n",
            ),
        ];
        Registry::load(&sources, RouterConfig::with_fallback("general-help")).unwrap()
    }

    #[test]
    fn normalize_folds_case_and_whitespace() {
        assert_eq!(normalize("  My App\t Was  REJECTED "), "my app was rejected");
    }

    #[test]
    fn tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("rejected for guideline 2.1!"),
            vec!["rejected", "for", "guideline", "2", "1"]
        );
    }

    #[test]
    fn candidates_found_by_token() {
        let index = TriggerIndex::build(&registry());
        let toks = tokenize("my app was rejected");
        let candidates = index.candidates(&toks, &normalize("my app was rejected"));
        assert!(candidates.contains("rejection-diagnostics"));
        assert!(!candidates.contains("general-help"));
    }

    #[test]
    fn candidates_found_by_exact_phrase() {
        let index = TriggerIndex::build(&registry());
        // No token overlap besides the phrase itself.
        let text = "got an app review rejection";
        let candidates = index.candidates(&tokenize(text), &normalize(text));
        assert!(candidates.contains("rejection-diagnostics"));
    }

    #[test]
    fn candidates_found_by_prefix_stem() {
        let sources = [
            SkillSource::new(
                "reject.md",
                r#"---
name: reject-skill
description: prefix stem trigger
triggers:
  - phrase: "reject"
    kind: prefix
---
body
"#,
            ),
            SkillSource::new(
                "general.md",
                "---\nname: general-help\ndescription: catch-all\n---\nbody\n",
            ),
        ];
        let registry =
            Registry::load(&sources, RouterConfig::with_fallback("general-help")).unwrap();
        let index = TriggerIndex::build(&registry);

        // "rejected" is not a verbatim token of the pattern; only the
        // stem scan can discover it.
        let text = "my submission was rejected";
        let candidates = index.candidates(&tokenize(text), &normalize(text));
        assert!(candidates.contains("reject-skill"));

        let text = "approved without issue";
        assert!(index.candidates(&tokenize(text), &normalize(text)).is_empty());
    }

    #[test]
    fn no_candidates_for_unrelated_text() {
        let index = TriggerIndex::build(&registry());
        let text = "completely unrelated request";
        assert!(index.candidates(&tokenize(text), &normalize(text)).is_empty());
    }

    #[test]
    fn patterns_compiled_per_skill() {
        let index = TriggerIndex::build(&registry());
        let patterns = index.patterns("rejection-diagnostics").unwrap();
        assert_eq!(patterns.triggers.len(), 3);
        assert!(patterns.anti_triggers.is_empty());
        assert_eq!(patterns.triggers[1].weight, 2);
    }

    #[test]
    fn identical_registries_build_identical_indexes() {
        let a = TriggerIndex::build(&registry());
        let b = TriggerIndex::build(&registry());
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
    }
}
