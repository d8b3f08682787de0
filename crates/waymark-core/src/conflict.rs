//! Conflict resolution between matched candidates.
//!
//! Declared precedence is directional and decisive: when A precedes B
//! and both matched, B is removed from consideration entirely, not
//! reordered. Precedence declared in both directions, or a
//! conflicts-with relation with no precedence either way, is ambiguous
//! and surfaced to the caller -- the engine never guesses intent.

use waymark_types::plan::MatchCandidate;

use crate::registry::Registry;

/// Two mutually-matching candidates the engine refuses to pick between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub left: String,
    pub right: String,
}

/// Resolver output: surviving candidates (ranking preserved, sentinel
/// kept last) plus `(loser, winner)` pairs for the provenance trail.
#[derive(Debug, Clone)]
pub struct ConflictOutcome {
    pub candidates: Vec<MatchCandidate>,
    pub removed: Vec<(String, String)>,
}

/// Apply declared precedence and conflict relations pairwise.
///
/// Candidates are processed in ranked order; each incoming candidate is
/// compared against every current survivor, so a removed skill's own
/// precedence never fires.
pub fn resolve_conflicts(
    candidates: Vec<MatchCandidate>,
    registry: &Registry,
) -> Result<ConflictOutcome, Ambiguity> {
    let mut survivors: Vec<MatchCandidate> = Vec::new();
    let mut removed: Vec<(String, String)> = Vec::new();

    'next: for candidate in candidates {
        let Some(ref cand_id) = candidate.skill_id else {
            // Sentinel: always survives, always last.
            survivors.push(candidate);
            continue;
        };

        let mut drop_survivors: Vec<usize> = Vec::new();
        for (i, survivor) in survivors.iter().enumerate() {
            let Some(ref surv_id) = survivor.skill_id else {
                continue;
            };

            let surv = registry.get(surv_id);
            let cand = registry.get(cand_id);
            let surv_precedes = surv.is_some_and(|s| s.precedes(cand_id));
            let cand_precedes = cand.is_some_and(|s| s.precedes(surv_id));

            if surv_precedes && cand_precedes {
                return Err(Ambiguity {
                    left: surv_id.clone(),
                    right: cand_id.clone(),
                });
            }

            if surv_precedes {
                tracing::debug!(loser = %cand_id, winner = %surv_id, "conflict removed candidate");
                removed.push((cand_id.clone(), surv_id.clone()));
                continue 'next;
            }

            if cand_precedes {
                tracing::debug!(loser = %surv_id, winner = %cand_id, "conflict removed candidate");
                removed.push((surv_id.clone(), cand_id.clone()));
                drop_survivors.push(i);
                continue;
            }

            // A declared conflict with no precedence either way is the
            // corpus leaving intent implicit; refuse to infer it.
            let declared_conflict = surv.is_some_and(|s| s.conflicts_with(cand_id))
                || cand.is_some_and(|s| s.conflicts_with(surv_id));
            if declared_conflict {
                return Err(Ambiguity {
                    left: surv_id.clone(),
                    right: cand_id.clone(),
                });
            }
        }

        for i in drop_survivors.into_iter().rev() {
            survivors.remove(i);
        }
        survivors.push(candidate);
    }

    Ok(ConflictOutcome {
        candidates: survivors,
        removed,
    })
}
