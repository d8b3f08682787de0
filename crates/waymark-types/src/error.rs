//! Error taxonomy for the routing engine.
//!
//! Load-time violations are fatal to that load/reload attempt and are
//! collected exhaustively (never first-error-only) so corpus authors
//! can fix a whole batch at once. Request-time anomalies are not errors
//! at all: they degrade into `PlanFlag`s on the returned plan.

use thiserror::Error;

/// A load-time registry violation. Any one of these fails the whole
/// load; no partial registry is ever exposed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate skill id '{id}' (first defined in {first_origin}, again in {second_origin})")]
    DuplicateId {
        id: String,
        first_origin: String,
        second_origin: String,
    },

    #[error("skill '{skill_id}': related skill '{target}' does not exist in the registry")]
    DanglingReference { skill_id: String, target: String },

    #[error("skill '{skill_id}': precedence target '{target}' does not exist in the registry")]
    DanglingPrecedence { skill_id: String, target: String },

    #[error("malformed skill source {origin}: {reason}")]
    MalformedSource { origin: String, reason: String },

    #[error("skill '{skill_id}': decision tree contains a cycle through node '{node_id}'")]
    CyclicDecisionTree { skill_id: String, node_id: String },

    #[error("skill '{skill_id}': decision tree root '{root}' does not exist")]
    MissingTreeRoot { skill_id: String, root: String },

    #[error("skill '{skill_id}': branch node '{node_id}' has no default child")]
    MissingDefaultBranch { skill_id: String, node_id: String },

    #[error("skill '{skill_id}': node '{node_id}' references unknown child '{child}'")]
    UnknownBranchChild {
        skill_id: String,
        node_id: String,
        child: String,
    },

    #[error("skill '{skill_id}': node '{node_id}' routes to unknown skill '{target}'")]
    UnresolvableTerminal {
        skill_id: String,
        node_id: String,
        target: String,
    },

    #[error("skill '{skill_id}': node '{node_id}' is neither a branch nor a terminal")]
    EmptyNode { skill_id: String, node_id: String },

    #[error("skill '{skill_id}' is a router but declares no decision tree")]
    RouterWithoutTree { skill_id: String },

    #[error("configured fallback skill '{id}' does not exist in the registry")]
    MissingFallback { id: String },

    #[error("configured fallback skill '{id}' must be a leaf, not a router")]
    RouterFallback { id: String },
}

/// A decision-tree walk failure. Depth overruns are recovered into a
/// truncated plan by the chain builder; `UnknownNode` indicates a bug
/// (load validation should have rejected the tree).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalkError {
    #[error("decision tree walk exceeded depth limit of {limit} in skill '{skill_id}'")]
    DepthExceeded { skill_id: String, limit: usize },

    #[error("decision tree of skill '{skill_id}' references unknown node '{node_id}'")]
    UnknownNode { skill_id: String, node_id: String },
}
