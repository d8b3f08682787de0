//! Skill registry: load, validate, and serve immutable catalog snapshots.
//!
//! `Registry::load` parses every source, validates the whole set, and
//! either returns a complete immutable snapshot or the full list of
//! violations. There is no partial success: a registry either serves
//! all of its skills or none of them.

pub mod parser;
pub mod validate;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use waymark_types::config::RouterConfig;
use waymark_types::error::RegistryError;
use waymark_types::skill::{SkillDescriptor, SkillSource, Specificity};

/// An immutable, validated catalog snapshot.
///
/// Never mutated after construction; a reload builds an entirely new
/// snapshot off to the side. Skills are kept in a `BTreeMap` arena so
/// iteration order (and therefore index construction) is deterministic.
#[derive(Debug)]
pub struct Registry {
    skills: BTreeMap<String, SkillDescriptor>,
    config: RouterConfig,
    loaded_at: DateTime<Utc>,
}

impl Registry {
    /// Parse and validate `sources` into a registry snapshot.
    ///
    /// All parse and validation errors are collected and returned
    /// together; the snapshot is only produced when every check passes.
    pub fn load(
        sources: &[SkillSource],
        config: RouterConfig,
    ) -> Result<Self, Vec<RegistryError>> {
        let mut errors = Vec::new();
        let mut parsed = Vec::new();

        for source in sources {
            match parser::parse_skill_source(source) {
                Ok(skill) => parsed.push(skill),
                Err(e) => errors.push(e),
            }
        }

        errors.extend(validate::collect_issues(&parsed, &config));

        if !errors.is_empty() {
            tracing::warn!(
                sources = sources.len(),
                errors = errors.len(),
                "registry load rejected"
            );
            return Err(errors);
        }

        let skills: BTreeMap<String, SkillDescriptor> =
            parsed.into_iter().map(|s| (s.id.clone(), s)).collect();

        tracing::info!(skills = skills.len(), "registry snapshot loaded");

        Ok(Self {
            skills,
            config,
            loaded_at: Utc::now(),
        })
    }

    /// Validate `sources` without building a servable snapshot.
    ///
    /// Returns every violation found; empty means the set would load.
    pub fn check(sources: &[SkillSource], config: &RouterConfig) -> Vec<RegistryError> {
        let mut errors = Vec::new();
        let mut parsed = Vec::new();
        for source in sources {
            match parser::parse_skill_source(source) {
                Ok(skill) => parsed.push(skill),
                Err(e) => errors.push(e),
            }
        }
        errors.extend(validate::collect_issues(&parsed, config));
        errors
    }

    pub fn get(&self, id: &str) -> Option<&SkillDescriptor> {
        self.skills.get(id)
    }

    /// The designated no-match fallback. Validated at load, so the
    /// lookup cannot fail on a constructed registry.
    pub fn fallback(&self) -> &SkillDescriptor {
        self.skills
            .get(&self.config.fallback_skill)
            .unwrap_or_else(|| unreachable!("fallback skill validated at load"))
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Skills in deterministic (id) order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillDescriptor> {
        self.skills.values()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Count of routers in the snapshot (serves the status surfaces).
    pub fn router_count(&self) -> usize {
        self.skills
            .values()
            .filter(|s| s.specificity == Specificity::Router)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn src(origin: &str, content: &str) -> SkillSource {
        SkillSource::new(origin, content)
    }

    const GENERAL: &str = "---\nname: general-help\ndescription: catch-all\n---\nbody\n";
    const LAYOUT: &str =
        "---\nname: layout-fix\ndescription: layout fixes\ntriggers:\n  - layout\n---\nbody\n";

    #[test]
    fn load_valid_sources() {
        let registry = Registry::load(
            &[src("g.md", GENERAL), src("l.md", LAYOUT)],
            RouterConfig::with_fallback("general-help"),
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.fallback().id, "general-help");
        assert!(registry.get("layout-fix").is_some());
        assert_eq!(registry.router_count(), 0);
    }

    #[test]
    fn load_collects_parse_and_validation_errors() {
        let errors = Registry::load(
            &[src("bad.md", "no frontmatter"), src("l.md", LAYOUT)],
            RouterConfig::with_fallback("general-help"),
        )
        .unwrap_err();

        // One malformed source plus the missing fallback.
        assert!(errors.len() >= 2, "got: {errors:?}");
    }

    #[test]
    fn failed_load_produces_no_registry() {
        let result = Registry::load(
            &[src("l.md", LAYOUT)],
            RouterConfig::with_fallback("does-not-exist"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn check_reports_without_building() {
        let errors = Registry::check(
            &[src("a.md", LAYOUT), src("b.md", LAYOUT)],
            &RouterConfig::with_fallback("general-help"),
        );
        assert!(errors
            .iter()
            .any(|e| matches!(e, RegistryError::DuplicateId { id, .. } if id == "layout-fix")));
    }

    #[test]
    fn iteration_is_id_ordered() {
        let registry = Registry::load(
            &[src("l.md", LAYOUT), src("g.md", GENERAL)],
            RouterConfig::with_fallback("general-help"),
        )
        .unwrap();
        let ids: Vec<&str> = registry.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["general-help", "layout-fix"]);
    }
}
