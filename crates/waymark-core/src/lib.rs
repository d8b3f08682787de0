//! The Waymark routing engine.
//!
//! Pipeline, leaves first: the registry loads and validates skill
//! descriptors into an immutable snapshot; the trigger index inverts
//! their patterns; the matcher scores a request; the conflict resolver
//! applies declared precedence; the walker executes a router's decision
//! tree; the chain builder strings delegation hops into a plan; and the
//! resolution service fronts it all behind an atomically-swapped
//! snapshot.
//!
//! The engine performs no file or network I/O: callers hand in
//! `SkillSource` values and get `ResolutionPlan`s back. All matching is
//! a pure function of request + snapshot, so concurrent readers need no
//! locks and identical inputs always produce byte-identical plans.

pub mod chain;
pub mod conflict;
pub mod index;
pub mod matcher;
pub mod registry;
pub mod service;
pub mod walker;
