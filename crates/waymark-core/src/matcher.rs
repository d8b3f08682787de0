//! Trigger matching and scoring.
//!
//! Scores are fixed-point integers: a fully matched pattern is worth
//! `weight * 1000`, token-set patterns scale by their overlap fraction,
//! and exact phrases carry a small constant edge on top. Anti-triggers
//! subtract the configured penalty, a hard veto rather than a soft
//! preference. The final ordering is total: score, then longest matched
//! pattern, then skill id -- never map iteration order.

use waymark_types::plan::MatchCandidate;
use waymark_types::request::Request;
use waymark_types::skill::{Specificity, TriggerKind};

use crate::index::{normalize, tokenize, CompiledPattern, TriggerIndex};
use crate::registry::Registry;

/// Fixed-point scale: one pattern weight unit.
pub const WEIGHT_SCALE: i64 = 1000;

/// Constant edge exact phrases get over an equal-weight full token
/// overlap, so "exact scores highest" holds at equal weights.
pub const EXACT_PHRASE_BONUS: i64 = 100;

/// Matcher output: ranked candidates plus the anti-trigger vetoes that
/// fired, for the plan's provenance trail.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Sorted descending; always ends with the no-match sentinel.
    pub candidates: Vec<MatchCandidate>,
    /// `(skill_id, anti-trigger phrase)` for every veto applied.
    pub vetoes: Vec<(String, String)>,
}

/// Score one pattern against the request. Returns the score
/// contribution, zero when the pattern does not match.
fn score_pattern(
    pattern: &CompiledPattern,
    request_normalized: &str,
    request_tokens: &[String],
) -> i64 {
    let weight = i64::from(pattern.weight);
    match pattern.kind {
        TriggerKind::Exact => {
            if !pattern.normalized.is_empty() && request_normalized.contains(&pattern.normalized) {
                weight * WEIGHT_SCALE + EXACT_PHRASE_BONUS
            } else {
                0
            }
        }
        TriggerKind::Prefix => {
            // Prefix patterns are single-token stems; multi-word
            // phrases reduce to their first normalized token.
            match pattern.tokens.first() {
                Some(stem) => {
                    if request_tokens.iter().any(|t| t.starts_with(stem.as_str())) {
                        weight * WEIGHT_SCALE
                    } else {
                        0
                    }
                }
                None => 0,
            }
        }
        TriggerKind::TokenSet => {
            if pattern.tokens.is_empty() {
                return 0;
            }
            let matched = pattern
                .tokens
                .iter()
                .filter(|pt| request_tokens.iter().any(|rt| rt == *pt))
                .count() as i64;
            if matched == 0 {
                0
            } else {
                weight * WEIGHT_SCALE * matched / pattern.tokens.len() as i64
            }
        }
    }
}

/// Score the request against the index and return ranked candidates.
///
/// Never empty: the no-match sentinel (score 0) is always appended, so
/// callers detect the no-match case without special-casing an empty
/// list. Pure function of request + snapshot.
pub fn match_request(
    request: &Request,
    index: &TriggerIndex,
    registry: &Registry,
) -> MatchOutcome {
    let config = registry.config();

    let normalized = normalize(&request.text);
    let mut tokens = tokenize(&request.text);
    // Context tags participate as additional request tokens.
    for tag in &request.hints.context_tags {
        tokens.extend(tokenize(tag));
    }
    // The previously invoked skill is a continuity signal: its id
    // tokens join the request, keeping related skills in contention
    // for terse follow-ups.
    if let Some(prev) = &request.hints.previous_skill {
        tokens.extend(tokenize(prev));
    }

    let mut candidates = Vec::new();
    let mut vetoes = Vec::new();

    for skill_id in index.candidates(&tokens, &normalized) {
        let Some(patterns) = index.patterns(&skill_id) else {
            continue;
        };
        let Some(skill) = registry.get(&skill_id) else {
            continue;
        };

        let mut score: i64 = 0;
        let mut matched_patterns = Vec::new();

        for pattern in &patterns.triggers {
            let contribution = score_pattern(pattern, &normalized, &tokens);
            if contribution > 0 {
                score += contribution;
                matched_patterns.push(pattern.phrase.clone());
            }
        }

        for anti in &patterns.anti_triggers {
            if score_pattern(anti, &normalized, &tokens) > 0 {
                score -= config.anti_trigger_penalty;
                vetoes.push((skill_id.clone(), anti.phrase.clone()));
            }
        }

        // A leaf is immediately actionable; a router only defers.
        if score > 0 && skill.specificity == Specificity::Leaf {
            score += config.leaf_bonus;
        }

        if score >= config.min_score_threshold {
            tracing::debug!(skill = %skill_id, score, "candidate matched");
            candidates.push(MatchCandidate {
                skill_id: Some(skill_id),
                score,
                matched_patterns,
            });
        }
    }

    // Total order: score desc, longest matched pattern desc, id asc.
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.longest_pattern_len().cmp(&a.longest_pattern_len()))
            .then_with(|| a.skill_id.cmp(&b.skill_id))
    });

    candidates.push(MatchCandidate::sentinel());

    MatchOutcome { candidates, vetoes }
}
