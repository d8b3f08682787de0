//! Match candidates and resolution plans.
//!
//! A `ResolutionPlan` is the engine's only output: the ordered steps to
//! take, diagnostic flags for anything that went sideways, and a
//! provenance trail of every decision made along the way. Plans contain
//! no timestamps or random identifiers so that identical inputs always
//! serialize to identical bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Match candidates
// ---------------------------------------------------------------------------

/// One scored candidate produced by the trigger matcher.
///
/// `skill_id = None` is the synthetic no-match sentinel appended to
/// every candidate list, so callers can detect the no-match case
/// without special-casing an empty list. The score is a pure function
/// of request + registry; fixed point, pattern weight scaled by 1000.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchCandidate {
    pub skill_id: Option<String>,
    pub score: i64,
    /// Raw phrases of the trigger patterns that matched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_patterns: Vec<String>,
}

impl MatchCandidate {
    /// The sentinel appended when nothing (else) matched.
    pub fn sentinel() -> Self {
        Self {
            skill_id: None,
            score: 0,
            matched_patterns: Vec::new(),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.skill_id.is_none()
    }

    /// Length of the longest matched pattern; first tie-break key.
    pub fn longest_pattern_len(&self) -> usize {
        self.matched_patterns
            .iter()
            .map(|p| p.len())
            .max()
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Plan steps
// ---------------------------------------------------------------------------

/// How sure the engine is about a step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Trigger-matched above threshold.
    High,
    /// Committed by a router's decision tree rather than by triggers.
    Medium,
    /// Fallback; the request matched nothing.
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// What a plan step invokes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PlanTarget {
    Skill(String),
    Agent(String),
}

impl PlanTarget {
    pub fn id(&self) -> &str {
        match self {
            Self::Skill(id) | Self::Agent(id) => id,
        }
    }
}

/// One ordered step of a resolution plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanStep {
    pub target: PlanTarget,
    /// Human-readable explanation of why this step was chosen.
    pub reason: String,
    pub confidence: Confidence,
}

// ---------------------------------------------------------------------------
// Diagnostics and provenance
// ---------------------------------------------------------------------------

/// Request-time anomalies folded into the plan instead of being thrown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum PlanFlag {
    /// Two top candidates declare conflicting (or no) precedence; the
    /// engine refuses to guess. Competing ids listed for the caller.
    Ambiguous { candidates: Vec<String> },
    /// Chain expansion hit the configured hop limit and was truncated.
    HopLimitExceeded { limit: usize },
    /// A skill already in the chain was reached again; expansion stopped.
    RuntimeCycleDetected { skill_id: String },
    /// A decision-tree walk exceeded the depth bound.
    DepthExceeded { skill_id: String, limit: usize },
    /// A decision-tree walk failed for a reason other than depth, e.g.
    /// an unresolvable node id. Load validation makes this unreachable
    /// for a served registry; kept so the trail never misnames a cause.
    TreeWalkFailed { skill_id: String, reason: String },
    /// Nothing matched; the plan is the designated fallback skill.
    FallbackUsed,
}

/// One entry of the plan's provenance trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    Matched {
        skill_id: String,
        score: i64,
        patterns: Vec<String>,
    },
    AntiTriggerVeto {
        skill_id: String,
        pattern: String,
    },
    ConflictRemoved {
        loser: String,
        winner: String,
    },
    TreeWalked {
        skill_id: String,
        path: Vec<String>,
        action: String,
    },
    Delegated {
        from: String,
        to: String,
    },
    FallbackSelected {
        skill_id: String,
    },
    ChainStopped {
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// The plan
// ---------------------------------------------------------------------------

/// The ordered, explainable output of one resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolutionPlan {
    pub steps: Vec<PlanStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<PlanFlag>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceEvent>,
}

impl ResolutionPlan {
    /// Whether any step names the given skill id.
    pub fn contains_skill(&self, id: &str) -> bool {
        self.steps
            .iter()
            .any(|s| matches!(&s.target, PlanTarget::Skill(sid) if sid == id))
    }

    /// Whether the plan was truncated or ambiguous.
    pub fn is_degraded(&self) -> bool {
        !self.flags.is_empty()
    }

    pub fn has_flag(&self, f: impl Fn(&PlanFlag) -> bool) -> bool {
        self.flags.iter().any(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_has_no_skill_and_zero_score() {
        let s = MatchCandidate::sentinel();
        assert!(s.is_sentinel());
        assert_eq!(s.score, 0);
        assert_eq!(s.longest_pattern_len(), 0);
    }

    #[test]
    fn longest_pattern_len_picks_max() {
        let c = MatchCandidate {
            skill_id: Some("a".into()),
            score: 1000,
            matched_patterns: vec!["rejected".into(), "guideline 2.1".into()],
        };
        assert_eq!(c.longest_pattern_len(), "guideline 2.1".len());
    }

    #[test]
    fn plan_contains_skill_ignores_agents() {
        let plan = ResolutionPlan {
            steps: vec![
                PlanStep {
                    target: PlanTarget::Skill("perf-router".into()),
                    reason: "matched".into(),
                    confidence: Confidence::High,
                },
                PlanStep {
                    target: PlanTarget::Agent("profiler-agent".into()),
                    reason: "tree terminal".into(),
                    confidence: Confidence::Medium,
                },
            ],
            flags: vec![],
            trace: vec![],
        };
        assert!(plan.contains_skill("perf-router"));
        assert!(!plan.contains_skill("profiler-agent"));
    }

    #[test]
    fn identical_plans_serialize_identically() {
        let mk = || ResolutionPlan {
            steps: vec![PlanStep {
                target: PlanTarget::Skill("layout-fix".into()),
                reason: "matched 'layout'".into(),
                confidence: Confidence::High,
            }],
            flags: vec![PlanFlag::FallbackUsed],
            trace: vec![TraceEvent::FallbackSelected {
                skill_id: "layout-fix".into(),
            }],
        };
        let a = serde_json::to_vec(&mk()).unwrap();
        let b = serde_json::to_vec(&mk()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn flag_serde_tags() {
        let json = serde_json::to_string(&PlanFlag::RuntimeCycleDetected {
            skill_id: "perf-router".into(),
        })
        .unwrap();
        assert!(json.contains("runtime_cycle_detected"), "got: {json}");

        let json = serde_json::to_string(&PlanFlag::TreeWalkFailed {
            skill_id: "perf-router".into(),
            reason: "unknown node".into(),
        })
        .unwrap();
        assert!(json.contains("tree_walk_failed"), "got: {json}");
    }
}
