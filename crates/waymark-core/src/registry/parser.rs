//! Skill document parsing.
//!
//! A skill source is a markdown document with YAML frontmatter
//! delimited by `---`: the frontmatter holds the routing metadata
//! (triggers, relations, decision tree), the body below it is opaque
//! reference content the engine never inspects.

use std::collections::BTreeMap;

use serde::Deserialize;

use waymark_types::error::RegistryError;
use waymark_types::skill::{
    DecisionNode, DecisionTree, RelatedSkill, SkillDescriptor, SkillSource, Specificity,
    TerminalAction, TriggerKind, TriggerPattern,
};

// ---------------------------------------------------------------------------
// Raw frontmatter shapes
// ---------------------------------------------------------------------------

/// A trigger entry: either a bare phrase (token-set, weight 1) or the
/// full form with kind and weight.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTrigger {
    Phrase(String),
    Full {
        phrase: String,
        #[serde(default)]
        kind: TriggerKind,
        #[serde(default = "default_weight")]
        weight: u32,
    },
}

fn default_weight() -> u32 {
    1
}

impl From<RawTrigger> for TriggerPattern {
    fn from(raw: RawTrigger) -> Self {
        match raw {
            RawTrigger::Phrase(phrase) => TriggerPattern::token_set(phrase),
            RawTrigger::Full {
                phrase,
                kind,
                weight,
            } => TriggerPattern {
                phrase,
                kind,
                weight,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    branches: BTreeMap<String, String>,
    #[serde(default)]
    default: Option<String>,
    #[serde(default, rename = "route-to")]
    route_to: Option<String>,
    #[serde(default, rename = "invoke-agent")]
    invoke_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTree {
    root: String,
    nodes: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    name: String,
    #[serde(default)]
    title: Option<String>,
    description: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    specificity: Specificity,
    #[serde(default)]
    triggers: Vec<RawTrigger>,
    #[serde(default, rename = "anti-triggers")]
    anti_triggers: Vec<RawTrigger>,
    #[serde(default, rename = "related-skills")]
    related_skills: Vec<RelatedSkill>,
    #[serde(default, rename = "precedence-over")]
    precedence_over: Vec<String>,
    #[serde(default, rename = "decision-tree")]
    decision_tree: Option<RawTree>,
}

// ---------------------------------------------------------------------------
// Frontmatter extraction
// ---------------------------------------------------------------------------

/// Split a skill document into its YAML frontmatter and markdown body.
///
/// The document must start with `---\n`; a closing `\n---` separates
/// the YAML from the body.
fn extract_frontmatter(content: &str) -> Result<(&str, &str), String> {
    if !content.starts_with("---") {
        return Err("document must start with YAML frontmatter delimiter '---'".to_owned());
    }

    let after_open = &content[3..];
    let after_open = after_open.strip_prefix('\n').unwrap_or(after_open);

    let closing_pos = after_open
        .find("\n---")
        .ok_or_else(|| "missing closing frontmatter delimiter '---'".to_owned())?;

    let yaml_str = &after_open[..closing_pos];
    let remainder = &after_open[closing_pos + 4..];
    let body = remainder
        .strip_prefix('\n')
        .unwrap_or(remainder)
        .trim_start_matches('\n');

    Ok((yaml_str, body))
}

// ---------------------------------------------------------------------------
// Descriptor construction
// ---------------------------------------------------------------------------

fn malformed(origin: &str, reason: impl Into<String>) -> RegistryError {
    RegistryError::MalformedSource {
        origin: origin.to_owned(),
        reason: reason.into(),
    }
}

fn convert_node(origin: &str, raw: RawNode) -> Result<DecisionNode, RegistryError> {
    let action = match (raw.route_to, raw.invoke_agent) {
        (Some(_), Some(_)) => {
            return Err(malformed(
                origin,
                format!("node '{}' declares both route-to and invoke-agent", raw.id),
            ));
        }
        (Some(skill), None) => Some(TerminalAction::RouteTo(skill)),
        (None, Some(agent)) => Some(TerminalAction::InvokeAgent(agent)),
        (None, None) => None,
    };

    if action.is_some() && (!raw.branches.is_empty() || raw.question.is_some()) {
        return Err(malformed(
            origin,
            format!("node '{}' is both a branch and a terminal", raw.id),
        ));
    }

    Ok(DecisionNode {
        id: raw.id,
        question: raw.question,
        branches: raw.branches,
        default: raw.default,
        action,
    })
}

fn validate_slug(origin: &str, name: &str) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(malformed(origin, "skill name must not be empty"));
    }
    let is_slug = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !is_slug {
        return Err(malformed(
            origin,
            format!("skill name '{name}' must contain only lowercase letters, digits, and hyphens"),
        ));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(malformed(
            origin,
            format!("skill name '{name}' must not start or end with a hyphen"),
        ));
    }
    Ok(())
}

/// Parse one skill source into a descriptor.
///
/// Structural problems (bad frontmatter, bad YAML, invalid slug,
/// malformed tree nodes, invalid semver) are load-time errors; no
/// cross-skill checks happen here.
pub fn parse_skill_source(source: &SkillSource) -> Result<SkillDescriptor, RegistryError> {
    let origin = source.origin.as_str();

    let (yaml_str, body) =
        extract_frontmatter(&source.content).map_err(|reason| malformed(origin, reason))?;

    let raw: RawManifest =
        serde_yaml_ng::from_str(yaml_str).map_err(|e| malformed(origin, e.to_string()))?;

    validate_slug(origin, &raw.name)?;

    if raw.description.is_empty() {
        return Err(malformed(origin, "skill description must not be empty"));
    }

    if let Some(ref version) = raw.version {
        version
            .parse::<semver::Version>()
            .map_err(|e| malformed(origin, format!("invalid semver version '{version}': {e}")))?;
    }

    let decision_tree = match raw.decision_tree {
        Some(tree) => {
            let nodes = tree
                .nodes
                .into_iter()
                .map(|n| convert_node(origin, n))
                .collect::<Result<Vec<_>, _>>()?;
            Some(DecisionTree {
                root: tree.root,
                nodes,
            })
        }
        None => None,
    };

    Ok(SkillDescriptor {
        title: raw.title.unwrap_or_else(|| raw.name.clone()),
        id: raw.name,
        summary: raw.description,
        version: raw.version,
        specificity: raw.specificity,
        triggers: raw.triggers.into_iter().map(Into::into).collect(),
        anti_triggers: raw.anti_triggers.into_iter().map(Into::into).collect(),
        decision_tree,
        related_skills: raw.related_skills,
        precedence_over: raw.precedence_over,
        body: body.to_owned(),
        origin: origin.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_SKILL: &str = r#"---
name: performance-router
title: Performance Router
description: Route performance complaints to the right specialist
version: "1.0.0"
specificity: router
triggers:
  - slow
  - phrase: "performance"
    weight: 2
  - phrase: "hang"
    kind: prefix
anti-triggers:
  - phrase: "implementation change"
    kind: exact
related-skills:
  - target: layout-fix
    relation: routes-to
precedence-over:
  - generic-profiler
decision-tree:
  root: n1
  nodes:
    - id: n1
      question: "Where is the slowness?"
      branches:
        layout: n2
        other: n3
      default: n3
    - id: n2
      route-to: layout-fix
    - id: n3
      invoke-agent: profiler-agent
---

# Performance Router

Try the domain-specific fix before the generic profiler.
"#;

    const MINIMAL_SKILL: &str = r#"---
name: general-help
description: Catch-all guidance
---

General guidance lives here.
"#;

    fn source(content: &str) -> SkillSource {
        SkillSource::new("skills/test.md", content)
    }

    #[test]
    fn parse_full_skill() {
        let skill = parse_skill_source(&source(FULL_SKILL)).unwrap();

        assert_eq!(skill.id, "performance-router");
        assert_eq!(skill.title, "Performance Router");
        assert_eq!(skill.specificity, Specificity::Router);
        assert_eq!(skill.version.as_deref(), Some("1.0.0"));

        assert_eq!(skill.triggers.len(), 3);
        assert_eq!(skill.triggers[0].phrase, "slow");
        assert_eq!(skill.triggers[0].kind, TriggerKind::TokenSet);
        assert_eq!(skill.triggers[0].weight, 1);
        assert_eq!(skill.triggers[1].weight, 2);
        assert_eq!(skill.triggers[2].kind, TriggerKind::Prefix);

        assert_eq!(skill.anti_triggers.len(), 1);
        assert_eq!(skill.anti_triggers[0].kind, TriggerKind::Exact);

        assert_eq!(skill.precedence_over, vec!["generic-profiler".to_owned()]);

        let tree = skill.decision_tree.as_ref().unwrap();
        assert_eq!(tree.root, "n1");
        let n1 = tree.node("n1").unwrap();
        assert_eq!(n1.branches.get("layout").map(String::as_str), Some("n2"));
        assert_eq!(n1.default.as_deref(), Some("n3"));
        assert_eq!(
            tree.node("n2").unwrap().action,
            Some(TerminalAction::RouteTo("layout-fix".into()))
        );
        assert_eq!(
            tree.node("n3").unwrap().action,
            Some(TerminalAction::InvokeAgent("profiler-agent".into()))
        );

        assert!(skill.body.contains("# Performance Router"));
        assert_eq!(skill.origin, "skills/test.md");
    }

    #[test]
    fn parse_minimal_skill_defaults() {
        let skill = parse_skill_source(&source(MINIMAL_SKILL)).unwrap();
        assert_eq!(skill.id, "general-help");
        // Title defaults to the name when absent.
        assert_eq!(skill.title, "general-help");
        assert_eq!(skill.specificity, Specificity::Leaf);
        assert!(skill.triggers.is_empty());
        assert!(skill.decision_tree.is_none());
    }

    #[test]
    fn reject_missing_frontmatter() {
        let err = parse_skill_source(&source("# Just markdown\n")).unwrap_err();
        assert!(err.to_string().contains("must start with YAML frontmatter"));
    }

    #[test]
    fn reject_unclosed_frontmatter() {
        let err = parse_skill_source(&source("---\nname: broken\n")).unwrap_err();
        assert!(err.to_string().contains("missing closing frontmatter"));
    }

    #[test]
    fn reject_uppercase_name() {
        let content = "---\nname: MySkill\ndescription: bad name\n---\nbody\n";
        let err = parse_skill_source(&source(content)).unwrap_err();
        assert!(err.to_string().contains("lowercase"));
    }

    #[test]
    fn reject_node_with_both_actions() {
        let content = r#"---
name: broken-router
description: node is overloaded
specificity: router
decision-tree:
  root: n1
  nodes:
    - id: n1
      route-to: a
      invoke-agent: b
---
body
"#;
        let err = parse_skill_source(&source(content)).unwrap_err();
        assert!(err.to_string().contains("both route-to and invoke-agent"));
    }

    #[test]
    fn reject_branch_and_terminal_mix() {
        let content = r#"---
name: broken-router
description: node is both branch and terminal
specificity: router
decision-tree:
  root: n1
  nodes:
    - id: n1
      question: "which?"
      branches:
        a: n2
      route-to: a
---
body
"#;
        let err = parse_skill_source(&source(content)).unwrap_err();
        assert!(err.to_string().contains("both a branch and a terminal"));
    }

    #[test]
    fn reject_invalid_semver() {
        let content = "---\nname: ok-name\ndescription: d\nversion: not-a-version\n---\nbody\n";
        let err = parse_skill_source(&source(content)).unwrap_err();
        assert!(err.to_string().contains("invalid semver"));
    }

    #[test]
    fn error_carries_origin() {
        let err = parse_skill_source(&SkillSource::new("skills/perf.md", "no frontmatter"))
            .unwrap_err();
        assert!(err.to_string().contains("skills/perf.md"));
    }
}
