//! Router configuration with serde defaults.
//!
//! Defaults are tuned so that a single matching pattern of weight 1
//! clears the threshold, while one anti-trigger hit pushes any
//! realistic score far below it.

use serde::{Deserialize, Serialize};

/// Tunable parameters of the resolution pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RouterConfig {
    /// Minimum post-bonus score a candidate needs to survive matching.
    #[serde(default = "default_min_score_threshold")]
    pub min_score_threshold: i64,
    /// Subtracted once per matching anti-trigger. Hard veto, not a
    /// soft preference; must dwarf any achievable trigger score.
    #[serde(default = "default_anti_trigger_penalty")]
    pub anti_trigger_penalty: i64,
    /// Additive bonus for leaf skills with a positive trigger score.
    #[serde(default = "default_leaf_bonus")]
    pub leaf_bonus: i64,
    /// Maximum decision-tree walk depth per skill.
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,
    /// Maximum number of delegation hops in one plan.
    #[serde(default = "default_max_chain_hops")]
    pub max_chain_hops: usize,
    /// Leaf skill selected when a request matches nothing.
    pub fallback_skill: String,
}

fn default_min_score_threshold() -> i64 {
    1
}

fn default_anti_trigger_penalty() -> i64 {
    1_000_000
}

fn default_leaf_bonus() -> i64 {
    50
}

fn default_max_tree_depth() -> usize {
    12
}

fn default_max_chain_hops() -> usize {
    5
}

impl RouterConfig {
    /// Config with all defaults and the given fallback skill.
    pub fn with_fallback(fallback_skill: impl Into<String>) -> Self {
        Self {
            min_score_threshold: default_min_score_threshold(),
            anti_trigger_penalty: default_anti_trigger_penalty(),
            leaf_bonus: default_leaf_bonus(),
            max_tree_depth: default_max_tree_depth(),
            max_chain_hops: default_max_chain_hops(),
            fallback_skill: fallback_skill.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_in_from_partial_toml() {
        let cfg: RouterConfig = toml::from_str(r#"fallback_skill = "general-help""#).unwrap();
        assert_eq!(cfg.min_score_threshold, 1);
        assert_eq!(cfg.anti_trigger_penalty, 1_000_000);
        assert_eq!(cfg.leaf_bonus, 50);
        assert_eq!(cfg.max_tree_depth, 12);
        assert_eq!(cfg.max_chain_hops, 5);
        assert_eq!(cfg.fallback_skill, "general-help");
    }

    #[test]
    fn fallback_skill_is_required() {
        let result: Result<RouterConfig, _> = toml::from_str("min_score_threshold = 2");
        assert!(result.is_err());
    }

    #[test]
    fn overrides_take_effect() {
        let cfg: RouterConfig = toml::from_str(
            r#"
            fallback_skill = "general-help"
            max_chain_hops = 3
            leaf_bonus = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.max_chain_hops, 3);
        assert_eq!(cfg.leaf_bonus, 0);
    }
}
