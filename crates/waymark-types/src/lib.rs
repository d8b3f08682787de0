//! Shared domain types for Waymark.
//!
//! This crate contains the core domain types used across the Waymark
//! routing engine: skill descriptors, decision trees, requests,
//! resolution plans, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod error;
pub mod plan;
pub mod request;
pub mod skill;
