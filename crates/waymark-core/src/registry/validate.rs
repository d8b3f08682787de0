//! Cross-skill registry validation.
//!
//! Runs after every source parsed cleanly: unique ids, resolvable
//! references, well-formed decision trees (acyclic, rooted, every
//! branch node carrying a default), and a usable fallback skill.
//! All violations are collected; the caller gets the full list.

use std::collections::{BTreeMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;

use waymark_types::config::RouterConfig;
use waymark_types::error::RegistryError;
use waymark_types::skill::{DecisionTree, Relation, SkillDescriptor, Specificity, TerminalAction};

/// Validate a parsed skill set against a config. Returns every
/// violation found; an empty vec means the set is servable.
pub fn collect_issues(skills: &[SkillDescriptor], config: &RouterConfig) -> Vec<RegistryError> {
    let mut issues = Vec::new();

    // Unique ids, reporting both origins for each duplicate.
    let mut first_seen: BTreeMap<&str, &str> = BTreeMap::new();
    for skill in skills {
        match first_seen.get(skill.id.as_str()) {
            Some(first_origin) => issues.push(RegistryError::DuplicateId {
                id: skill.id.clone(),
                first_origin: (*first_origin).to_owned(),
                second_origin: skill.origin.clone(),
            }),
            None => {
                first_seen.insert(&skill.id, &skill.origin);
            }
        }
    }

    let known: HashSet<&str> = skills.iter().map(|s| s.id.as_str()).collect();

    for skill in skills {
        // Related-skill targets must resolve, except agent escalations:
        // agents are external executors the registry cannot see.
        for related in &skill.related_skills {
            if related.relation == Relation::EscalatesToAgent {
                continue;
            }
            if !known.contains(related.target.as_str()) {
                issues.push(RegistryError::DanglingReference {
                    skill_id: skill.id.clone(),
                    target: related.target.clone(),
                });
            }
        }

        for target in &skill.precedence_over {
            if !known.contains(target.as_str()) {
                issues.push(RegistryError::DanglingPrecedence {
                    skill_id: skill.id.clone(),
                    target: target.clone(),
                });
            }
        }

        match &skill.decision_tree {
            Some(tree) => validate_tree(skill, tree, &known, &mut issues),
            None => {
                if skill.specificity == Specificity::Router {
                    issues.push(RegistryError::RouterWithoutTree {
                        skill_id: skill.id.clone(),
                    });
                }
            }
        }
    }

    // The fallback must exist and be directly actionable: a router
    // fallback would re-delegate from a request that matched nothing.
    match skills.iter().find(|s| s.id == config.fallback_skill) {
        None => issues.push(RegistryError::MissingFallback {
            id: config.fallback_skill.clone(),
        }),
        Some(fallback) if fallback.specificity == Specificity::Router => {
            issues.push(RegistryError::RouterFallback {
                id: config.fallback_skill.clone(),
            });
        }
        Some(_) => {}
    }

    issues
}

fn validate_tree(
    skill: &SkillDescriptor,
    tree: &DecisionTree,
    known_skills: &HashSet<&str>,
    issues: &mut Vec<RegistryError>,
) {
    let mut node_ids: HashSet<&str> = HashSet::new();
    for node in &tree.nodes {
        if !node_ids.insert(node.id.as_str()) {
            issues.push(RegistryError::MalformedSource {
                origin: skill.origin.clone(),
                reason: format!("duplicate decision node id '{}'", node.id),
            });
        }
    }

    if !node_ids.contains(tree.root.as_str()) {
        issues.push(RegistryError::MissingTreeRoot {
            skill_id: skill.id.clone(),
            root: tree.root.clone(),
        });
    }

    for node in &tree.nodes {
        match &node.action {
            Some(TerminalAction::RouteTo(target)) => {
                if !known_skills.contains(target.as_str()) {
                    issues.push(RegistryError::UnresolvableTerminal {
                        skill_id: skill.id.clone(),
                        node_id: node.id.clone(),
                        target: target.clone(),
                    });
                }
            }
            Some(TerminalAction::InvokeAgent(_)) => {
                // Agents are named, not resolved; the caller invokes them.
            }
            None => {
                if node.branches.is_empty() {
                    issues.push(RegistryError::EmptyNode {
                        skill_id: skill.id.clone(),
                        node_id: node.id.clone(),
                    });
                    continue;
                }
                // The walker must never stall on an unknown answer.
                match &node.default {
                    None => issues.push(RegistryError::MissingDefaultBranch {
                        skill_id: skill.id.clone(),
                        node_id: node.id.clone(),
                    }),
                    Some(default) => {
                        if !node_ids.contains(default.as_str()) {
                            issues.push(RegistryError::UnknownBranchChild {
                                skill_id: skill.id.clone(),
                                node_id: node.id.clone(),
                                child: default.clone(),
                            });
                        }
                    }
                }
                for child in node.branches.values() {
                    if !node_ids.contains(child.as_str()) {
                        issues.push(RegistryError::UnknownBranchChild {
                            skill_id: skill.id.clone(),
                            node_id: node.id.clone(),
                            child: child.clone(),
                        });
                    }
                }
            }
        }
    }

    check_tree_acyclic(skill, tree, issues);
}

/// Build a child-edge digraph over the tree and toposort it; a sort
/// failure pinpoints a node on a cycle.
fn check_tree_acyclic(skill: &SkillDescriptor, tree: &DecisionTree, issues: &mut Vec<RegistryError>) {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut indices = BTreeMap::new();

    for node in &tree.nodes {
        let idx = *indices
            .entry(node.id.as_str())
            .or_insert_with(|| graph.add_node(node.id.as_str()));
        for child in node.branches.values().chain(node.default.iter()) {
            if let Some(&child_idx) = indices.get(child.as_str()) {
                graph.add_edge(idx, child_idx, ());
            } else if tree.node(child).is_some() {
                let child_idx = *indices
                    .entry(child.as_str())
                    .or_insert_with(|| graph.add_node(child.as_str()));
                graph.add_edge(idx, child_idx, ());
            }
            // Unknown children were already reported above.
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        issues.push(RegistryError::CyclicDecisionTree {
            skill_id: skill.id.clone(),
            node_id: graph[cycle.node_id()].to_owned(),
        });
    }
}
