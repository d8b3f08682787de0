//! Delegation chain builder: matching + walking across router hops.
//!
//! Picks the top surviving candidate, then expands delegation: a leaf
//! terminates immediately, a router's decision tree commits to the next
//! target without re-running matching. Expansion is bounded by a global
//! hop counter and a visited-skill cycle guard; every anomaly truncates
//! the plan with a diagnostic flag instead of failing the request.

use std::collections::BTreeSet;

use waymark_types::plan::{
    Confidence, MatchCandidate, PlanFlag, PlanStep, PlanTarget, ResolutionPlan, TraceEvent,
};
use waymark_types::error::WalkError;
use waymark_types::request::Request;
use waymark_types::skill::{Specificity, TerminalAction};

use crate::conflict::{resolve_conflicts, Ambiguity};
use crate::index::TriggerIndex;
use crate::matcher::match_request;
use crate::registry::Registry;
use crate::walker::walk_to_terminal;

/// Supplies branch answers during chain expansion.
///
/// Returning `None` lets the walker take the branch's default child,
/// so expansion always completes even with no answers at all.
pub trait AnswerSource {
    fn answer(
        &self,
        skill_id: &str,
        node_id: &str,
        question: &str,
        options: &[String],
    ) -> Option<String>;
}

/// Answers drawn from the request's hints, keyed `"skill-id/node-id"`.
pub struct HintAnswers<'a> {
    request: &'a Request,
}

impl<'a> HintAnswers<'a> {
    pub fn new(request: &'a Request) -> Self {
        Self { request }
    }
}

impl AnswerSource for HintAnswers<'_> {
    fn answer(
        &self,
        skill_id: &str,
        node_id: &str,
        _question: &str,
        _options: &[String],
    ) -> Option<String> {
        self.request
            .hints
            .answers
            .get(&Request::answer_key(skill_id, node_id))
            .cloned()
    }
}

/// Build a complete resolution plan for one request.
///
/// Never returns an error: ambiguity, truncation, and no-match all
/// degrade into flags on the returned plan.
pub fn build_plan(
    request: &Request,
    registry: &Registry,
    index: &TriggerIndex,
    answers: &dyn AnswerSource,
) -> ResolutionPlan {
    let config = registry.config();
    let mut plan = ResolutionPlan::default();

    let outcome = match_request(request, index, registry);

    for (skill_id, pattern) in &outcome.vetoes {
        plan.trace.push(TraceEvent::AntiTriggerVeto {
            skill_id: skill_id.clone(),
            pattern: pattern.clone(),
        });
    }
    for candidate in outcome.candidates.iter().filter(|c| !c.is_sentinel()) {
        if let Some(ref id) = candidate.skill_id {
            plan.trace.push(TraceEvent::Matched {
                skill_id: id.clone(),
                score: candidate.score,
                patterns: candidate.matched_patterns.clone(),
            });
        }
    }

    let resolved = match resolve_conflicts(outcome.candidates, registry) {
        Ok(resolved) => resolved,
        Err(Ambiguity { left, right }) => {
            tracing::warn!(%left, %right, "ambiguous match, refusing to guess");
            plan.flags.push(PlanFlag::Ambiguous {
                candidates: vec![left, right],
            });
            plan.trace.push(TraceEvent::ChainStopped {
                reason: "conflicting precedence between top candidates".to_owned(),
            });
            return plan;
        }
    };

    for (loser, winner) in &resolved.removed {
        plan.trace.push(TraceEvent::ConflictRemoved {
            loser: loser.clone(),
            winner: winner.clone(),
        });
    }

    let top = resolved
        .candidates
        .first()
        .cloned()
        .unwrap_or_else(MatchCandidate::sentinel);

    let Some(entry_id) = top.skill_id else {
        // No-match: the designated fallback, low confidence.
        let fallback = registry.fallback();
        plan.trace.push(TraceEvent::FallbackSelected {
            skill_id: fallback.id.clone(),
        });
        plan.flags.push(PlanFlag::FallbackUsed);
        plan.steps.push(PlanStep {
            target: PlanTarget::Skill(fallback.id.clone()),
            reason: "no trigger matched; designated fallback".to_owned(),
            confidence: Confidence::Low,
        });
        return plan;
    };

    let mut visited: BTreeSet<String> = BTreeSet::new();
    visited.insert(entry_id.clone());
    plan.steps.push(PlanStep {
        target: PlanTarget::Skill(entry_id.clone()),
        reason: format!(
            "matched {} (score {})",
            format_patterns(&top.matched_patterns),
            top.score
        ),
        confidence: Confidence::High,
    });

    let mut current_id = entry_id;
    loop {
        let Some(current) = registry.get(&current_id) else {
            // Route targets are validated at load; nothing to expand.
            break;
        };
        if current.specificity == Specificity::Leaf {
            break;
        }
        let Some(tree) = current.decision_tree.as_ref() else {
            break;
        };

        let walk = walk_to_terminal(
            &current_id,
            tree,
            config.max_tree_depth,
            |node_id, question, options| answers.answer(&current_id, node_id, question, options),
        );

        let (action, path) = match walk {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(skill = %current_id, error = %e, "decision tree walk truncated");
                let flag = match &e {
                    WalkError::DepthExceeded { .. } => PlanFlag::DepthExceeded {
                        skill_id: current_id.clone(),
                        limit: config.max_tree_depth,
                    },
                    WalkError::UnknownNode { .. } => PlanFlag::TreeWalkFailed {
                        skill_id: current_id.clone(),
                        reason: e.to_string(),
                    },
                };
                plan.flags.push(flag);
                plan.trace.push(TraceEvent::ChainStopped {
                    reason: e.to_string(),
                });
                break;
            }
        };

        plan.trace.push(TraceEvent::TreeWalked {
            skill_id: current_id.clone(),
            path,
            action: action.to_string(),
        });

        match action {
            TerminalAction::InvokeAgent(agent_id) => {
                if plan.steps.len() >= config.max_chain_hops {
                    tracing::warn!(limit = config.max_chain_hops, "hop limit reached, truncating chain");
                    plan.flags.push(PlanFlag::HopLimitExceeded {
                        limit: config.max_chain_hops,
                    });
                    plan.trace.push(TraceEvent::ChainStopped {
                        reason: format!("hop limit of {} reached", config.max_chain_hops),
                    });
                    break;
                }
                plan.steps.push(PlanStep {
                    target: PlanTarget::Agent(agent_id),
                    reason: format!("escalated by '{current_id}' decision tree"),
                    confidence: Confidence::Medium,
                });
                break;
            }
            TerminalAction::RouteTo(target_id) => {
                if visited.contains(&target_id) {
                    tracing::warn!(skill = %target_id, "runtime cycle detected, truncating chain");
                    plan.flags.push(PlanFlag::RuntimeCycleDetected {
                        skill_id: target_id.clone(),
                    });
                    plan.trace.push(TraceEvent::ChainStopped {
                        reason: format!("skill '{target_id}' already in chain"),
                    });
                    break;
                }
                if plan.steps.len() >= config.max_chain_hops {
                    tracing::warn!(limit = config.max_chain_hops, "hop limit reached, truncating chain");
                    plan.flags.push(PlanFlag::HopLimitExceeded {
                        limit: config.max_chain_hops,
                    });
                    plan.trace.push(TraceEvent::ChainStopped {
                        reason: format!("hop limit of {} reached", config.max_chain_hops),
                    });
                    break;
                }

                plan.trace.push(TraceEvent::Delegated {
                    from: current_id.clone(),
                    to: target_id.clone(),
                });
                plan.steps.push(PlanStep {
                    target: PlanTarget::Skill(target_id.clone()),
                    reason: format!("delegated by '{current_id}'"),
                    confidence: Confidence::Medium,
                });
                visited.insert(target_id.clone());
                current_id = target_id;
            }
        }
    }

    plan
}

fn format_patterns(patterns: &[String]) -> String {
    if patterns.is_empty() {
        "no patterns".to_owned()
    } else {
        patterns
            .iter()
            .map(|p| format!("'{p}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
