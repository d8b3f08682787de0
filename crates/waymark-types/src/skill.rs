//! Skill catalog domain types.
//!
//! Defines the descriptor format the registry parses out of skill
//! documents: trigger patterns, specificity, inter-skill relations,
//! and the decision tree a router uses to narrow its choice.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// Whether a skill is directly actionable or must delegate further.
///
/// - `Leaf`: terminates a resolution chain; its body is the answer.
/// - `Router`: always defers to another skill or agent via its
///   decision tree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Specificity {
    Router,
    Leaf,
}

impl Default for Specificity {
    fn default() -> Self {
        Self::Leaf
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Router => write!(f, "router"),
            Self::Leaf => write!(f, "leaf"),
        }
    }
}

/// How a trigger phrase is matched against a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    /// The normalized phrase must appear verbatim in the request.
    Exact,
    /// Some request token must start with the (single-token) stem.
    Prefix,
    /// Scores proportionally to the fraction of pattern tokens present.
    TokenSet,
}

impl Default for TriggerKind {
    fn default() -> Self {
        Self::TokenSet
    }
}

/// Declared relationship between two skills.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    RoutesTo,
    Specializes,
    ConflictsWith,
    Complements,
    EscalatesToAgent,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoutesTo => write!(f, "routes-to"),
            Self::Specializes => write!(f, "specializes"),
            Self::ConflictsWith => write!(f, "conflicts-with"),
            Self::Complements => write!(f, "complements"),
            Self::EscalatesToAgent => write!(f, "escalates-to-agent"),
        }
    }
}

// ---------------------------------------------------------------------------
// Triggers and relations
// ---------------------------------------------------------------------------

/// One weighted trigger (or anti-trigger) phrase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TriggerPattern {
    pub phrase: String,
    #[serde(default)]
    pub kind: TriggerKind,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl TriggerPattern {
    /// Convenience constructor for a token-set pattern with weight 1.
    pub fn token_set(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            kind: TriggerKind::TokenSet,
            weight: 1,
        }
    }

    /// Convenience constructor for an exact-phrase pattern.
    pub fn exact(phrase: impl Into<String>, weight: u32) -> Self {
        Self {
            phrase: phrase.into(),
            kind: TriggerKind::Exact,
            weight,
        }
    }
}

/// A typed edge from one skill to another skill or agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelatedSkill {
    pub target: String,
    pub relation: Relation,
}

// ---------------------------------------------------------------------------
// Decision trees
// ---------------------------------------------------------------------------

/// What a terminal decision node commits to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TerminalAction {
    /// Hand off to another skill in the registry.
    RouteTo(String),
    /// Name an external autonomous agent; invoked by the caller.
    InvokeAgent(String),
}

impl fmt::Display for TerminalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouteTo(id) => write!(f, "route-to {id}"),
            Self::InvokeAgent(id) => write!(f, "invoke-agent {id}"),
        }
    }
}

/// One node of a skill's internal branching logic.
///
/// A node is either a branch (question + answer branches + default) or
/// a terminal (action), never both. The parser enforces this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionNode {
    pub id: String,
    /// Present on branch nodes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// Answer token -> child node id. BTreeMap keeps iteration stable.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub branches: BTreeMap<String, String>,
    /// Child taken for unknown/missing answers. Required on branch nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Present on terminal nodes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<TerminalAction>,
}

impl DecisionNode {
    pub fn is_terminal(&self) -> bool {
        self.action.is_some()
    }
}

/// A rooted, cycle-free tree of decision nodes (arena by node id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecisionTree {
    pub root: String,
    pub nodes: Vec<DecisionNode>,
}

impl DecisionTree {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&DecisionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// ---------------------------------------------------------------------------
// Descriptor and sources
// ---------------------------------------------------------------------------

/// Identity and matching metadata for one skill.
///
/// Immutable after registry construction; the markdown `body` below
/// the frontmatter is opaque payload returned alongside plan steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Unique, stable slug (lowercase alphanumeric + hyphens).
    pub id: String,
    pub title: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub specificity: Specificity,
    #[serde(default)]
    pub triggers: Vec<TriggerPattern>,
    #[serde(default)]
    pub anti_triggers: Vec<TriggerPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_tree: Option<DecisionTree>,
    #[serde(default)]
    pub related_skills: Vec<RelatedSkill>,
    /// Skill ids this skill wins against when both match.
    #[serde(default)]
    pub precedence_over: Vec<String>,
    /// Opaque reference content; never inspected by the engine.
    #[serde(default)]
    pub body: String,
    /// Where the descriptor was parsed from (file path or source name).
    #[serde(default)]
    pub origin: String,
}

impl SkillDescriptor {
    /// Whether this skill declares a `conflicts-with` relation to `other`.
    pub fn conflicts_with(&self, other: &str) -> bool {
        self.related_skills
            .iter()
            .any(|r| r.relation == Relation::ConflictsWith && r.target == other)
    }

    /// Whether this skill declares precedence over `other`.
    pub fn precedes(&self, other: &str) -> bool {
        self.precedence_over.iter().any(|id| id == other)
    }
}

/// An unparsed skill document handed to the registry loader.
///
/// The loader does no file or network I/O itself; callers read the
/// documents and pass them in as in-memory sources.
#[derive(Debug, Clone)]
pub struct SkillSource {
    /// Display name for diagnostics (typically the file path).
    pub origin: String,
    pub content: String,
}

impl SkillSource {
    pub fn new(origin: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            content: content.into(),
        }
    }
}
