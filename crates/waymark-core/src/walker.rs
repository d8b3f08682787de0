//! Decision-tree walker: a resumable state machine over one skill's tree.
//!
//! The walk holds nothing but the current node id, the depth, and the
//! visited path, so a caller can suspend between branch questions and
//! resume later. Unknown or missing answers take the branch's declared
//! default child (required at load), so the walker never stalls. Depth
//! is bounded to guarantee termination even if a malformed tree escapes
//! load-time cycle detection.

use waymark_types::error::WalkError;
use waymark_types::skill::{DecisionTree, TerminalAction};

/// What the walk is waiting on, or what it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkStep {
    /// A branch node needs an answer before the walk can proceed.
    Question {
        node_id: String,
        question: String,
        /// Accepted answer tokens, in stable order.
        answers: Vec<String>,
    },
    /// The walk ended; the terminal commits to this action.
    Terminal(TerminalAction),
}

/// A suspended walk over one skill's decision tree.
#[derive(Debug, Clone)]
pub struct TreeWalk<'a> {
    skill_id: &'a str,
    tree: &'a DecisionTree,
    current: String,
    depth: usize,
    max_depth: usize,
    path: Vec<String>,
}

impl<'a> TreeWalk<'a> {
    /// Start a walk at the tree root.
    pub fn begin(
        skill_id: &'a str,
        tree: &'a DecisionTree,
        max_depth: usize,
    ) -> Result<Self, WalkError> {
        if tree.node(&tree.root).is_none() {
            return Err(WalkError::UnknownNode {
                skill_id: skill_id.to_owned(),
                node_id: tree.root.clone(),
            });
        }
        Ok(Self {
            skill_id,
            tree,
            current: tree.root.clone(),
            depth: 0,
            max_depth,
            path: vec![tree.root.clone()],
        })
    }

    /// Node ids visited so far, root first.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn current_node(&self) -> &str {
        &self.current
    }

    /// Inspect the current node without advancing.
    pub fn step(&self) -> Result<WalkStep, WalkError> {
        let node = self.tree.node(&self.current).ok_or_else(|| WalkError::UnknownNode {
            skill_id: self.skill_id.to_owned(),
            node_id: self.current.clone(),
        })?;

        match &node.action {
            Some(action) => Ok(WalkStep::Terminal(action.clone())),
            None => Ok(WalkStep::Question {
                node_id: node.id.clone(),
                question: node.question.clone().unwrap_or_default(),
                answers: node.branches.keys().cloned().collect(),
            }),
        }
    }

    /// Consume one branch transition and return the next step.
    ///
    /// `answer = None` or an unrecognized token takes the default
    /// child. Calling this on a terminal node returns the terminal
    /// unchanged.
    pub fn answer(&mut self, answer: Option<&str>) -> Result<WalkStep, WalkError> {
        let node = self.tree.node(&self.current).ok_or_else(|| WalkError::UnknownNode {
            skill_id: self.skill_id.to_owned(),
            node_id: self.current.clone(),
        })?;

        if node.is_terminal() {
            return self.step();
        }

        let next = answer
            .and_then(|a| node.branches.get(a))
            .or(node.default.as_ref())
            .ok_or_else(|| WalkError::UnknownNode {
                skill_id: self.skill_id.to_owned(),
                node_id: self.current.clone(),
            })?
            .clone();

        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(WalkError::DepthExceeded {
                skill_id: self.skill_id.to_owned(),
                limit: self.max_depth,
            });
        }

        self.current = next.clone();
        self.path.push(next);
        self.step()
    }
}

/// Drive a walk to its terminal, pulling answers from `answer_for`.
///
/// `answer_for(node_id, question, options)` returning `None` takes the
/// default branch. Returns the terminal action and the visited path.
pub fn walk_to_terminal(
    skill_id: &str,
    tree: &DecisionTree,
    max_depth: usize,
    mut answer_for: impl FnMut(&str, &str, &[String]) -> Option<String>,
) -> Result<(TerminalAction, Vec<String>), WalkError> {
    let mut walk = TreeWalk::begin(skill_id, tree, max_depth)?;
    loop {
        match walk.step()? {
            WalkStep::Terminal(action) => return Ok((action, walk.path().to_vec())),
            WalkStep::Question {
                node_id,
                question,
                answers,
            } => {
                let answer = answer_for(&node_id, &question, &answers);
                walk.answer(answer.as_deref())?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use waymark_types::skill::DecisionNode;

    fn branch(id: &str, question: &str, branches: &[(&str, &str)], default: &str) -> DecisionNode {
        DecisionNode {
            id: id.into(),
            question: Some(question.into()),
            branches: branches
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<BTreeMap<_, _>>(),
            default: Some(default.into()),
            action: None,
        }
    }

    fn terminal(id: &str, action: TerminalAction) -> DecisionNode {
        DecisionNode {
            id: id.into(),
            question: None,
            branches: BTreeMap::new(),
            default: None,
            action: Some(action),
        }
    }

    fn tree() -> DecisionTree {
        DecisionTree {
            root: "n1".into(),
            nodes: vec![
                branch("n1", "Where is the slowness?", &[("layout", "n2"), ("other", "n3")], "n3"),
                terminal("n2", TerminalAction::RouteTo("layout-fix".into())),
                terminal("n3", TerminalAction::InvokeAgent("profiler-agent".into())),
            ],
        }
    }

    #[test]
    fn begin_surfaces_root_question() {
        let tree = tree();
        let walk = TreeWalk::begin("perf-router", &tree, 12).unwrap();
        match walk.step().unwrap() {
            WalkStep::Question {
                node_id,
                question,
                answers,
            } => {
                assert_eq!(node_id, "n1");
                assert_eq!(question, "Where is the slowness?");
                assert_eq!(answers, vec!["layout".to_owned(), "other".to_owned()]);
            }
            other => panic!("expected question, got {other:?}"),
        }
    }

    #[test]
    fn answered_branch_reaches_terminal() {
        let tree = tree();
        let mut walk = TreeWalk::begin("perf-router", &tree, 12).unwrap();
        let step = walk.answer(Some("layout")).unwrap();
        assert_eq!(
            step,
            WalkStep::Terminal(TerminalAction::RouteTo("layout-fix".into()))
        );
        assert_eq!(walk.path(), &["n1".to_owned(), "n2".to_owned()]);
    }

    #[test]
    fn unknown_answer_takes_default() {
        let tree = tree();
        let mut walk = TreeWalk::begin("perf-router", &tree, 12).unwrap();
        let step = walk.answer(Some("no idea")).unwrap();
        assert_eq!(
            step,
            WalkStep::Terminal(TerminalAction::InvokeAgent("profiler-agent".into()))
        );
    }

    #[test]
    fn missing_answer_takes_default() {
        let tree = tree();
        let mut walk = TreeWalk::begin("perf-router", &tree, 12).unwrap();
        let step = walk.answer(None).unwrap();
        assert_eq!(
            step,
            WalkStep::Terminal(TerminalAction::InvokeAgent("profiler-agent".into()))
        );
    }

    #[test]
    fn depth_limit_enforced() {
        // Two branch nodes pointing at each other: malformed, but the
        // walker must still terminate.
        let tree = DecisionTree {
            root: "n1".into(),
            nodes: vec![
                branch("n1", "a?", &[("x", "n2")], "n2"),
                branch("n2", "b?", &[("y", "n1")], "n1"),
            ],
        };
        let mut walk = TreeWalk::begin("loopy", &tree, 3).unwrap();
        let mut last = Ok(WalkStep::Question {
            node_id: String::new(),
            question: String::new(),
            answers: vec![],
        });
        for _ in 0..10 {
            last = walk.answer(None);
            if last.is_err() {
                break;
            }
        }
        assert_eq!(
            last.unwrap_err(),
            WalkError::DepthExceeded {
                skill_id: "loopy".into(),
                limit: 3
            }
        );
    }

    #[test]
    fn walk_to_terminal_with_answer_source() {
        let tree = tree();
        let (action, path) =
            walk_to_terminal("perf-router", &tree, 12, |node_id, question, options| {
                assert_eq!(node_id, "n1");
                assert!(question.contains("slowness"));
                assert_eq!(options, &["layout".to_owned(), "other".to_owned()]);
                Some("layout".to_owned())
            })
        .unwrap();
        assert_eq!(action, TerminalAction::RouteTo("layout-fix".into()));
        assert_eq!(path, vec!["n1".to_owned(), "n2".to_owned()]);
    }

    #[test]
    fn begin_rejects_missing_root() {
        let tree = DecisionTree {
            root: "missing".into(),
            nodes: vec![],
        };
        let err = TreeWalk::begin("broken", &tree, 12).unwrap_err();
        assert!(matches!(err, WalkError::UnknownNode { node_id, .. } if node_id == "missing"));
    }

    #[test]
    fn answer_on_terminal_is_idempotent() {
        let tree = DecisionTree {
            root: "n1".into(),
            nodes: vec![terminal("n1", TerminalAction::RouteTo("layout-fix".into()))],
        };
        let mut walk = TreeWalk::begin("leafish", &tree, 12).unwrap();
        let a = walk.answer(None).unwrap();
        let b = walk.answer(Some("anything")).unwrap();
        assert_eq!(a, b);
    }
}
