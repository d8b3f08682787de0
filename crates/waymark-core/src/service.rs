//! Resolution service: the facade callers talk to.
//!
//! Holds the current registry snapshot (plus its pre-built trigger
//! index) behind an atomically-swapped `Arc`. Readers clone the `Arc`
//! under a brief lock and then work lock-free against one complete
//! snapshot; a reload builds and validates a candidate snapshot off to
//! the side and publishes it only on full success, so in-flight
//! requests never observe a partially-updated registry.

use std::cell::RefCell;
use std::sync::{Arc, RwLock};

use waymark_types::config::RouterConfig;
use waymark_types::error::RegistryError;
use waymark_types::plan::ResolutionPlan;
use waymark_types::request::{Request, RequestHints};
use waymark_types::skill::{SkillDescriptor, SkillSource};

use crate::chain::{build_plan, AnswerSource, HintAnswers};
use crate::index::TriggerIndex;
use crate::registry::Registry;

/// One immutable registry snapshot with its trigger index.
#[derive(Debug)]
pub struct Snapshot {
    pub registry: Registry,
    pub index: TriggerIndex,
}

impl Snapshot {
    fn build(sources: &[SkillSource], config: RouterConfig) -> Result<Self, Vec<RegistryError>> {
        let registry = Registry::load(sources, config)?;
        let index = TriggerIndex::build(&registry);
        Ok(Self { registry, index })
    }
}

/// Aggregate counts for status surfaces.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RegistryStats {
    pub skills: usize,
    pub routers: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// A branch question the caller must answer before resolution can
/// finish. Resuming means re-resolving with the answer added to the
/// request hints under `"skill-id/node-id"`; resolution is cheap and
/// deterministic, so the accumulated answer map *is* the resumable
/// state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PendingQuestion {
    pub skill_id: String,
    pub node_id: String,
    pub question: String,
    pub options: Vec<String>,
}

/// Outcome of an interactive resolution pass.
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    Complete(ResolutionPlan),
    NeedsAnswer(PendingQuestion),
}

/// The engine facade. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct ResolutionService {
    current: RwLock<Arc<Snapshot>>,
}

impl ResolutionService {
    /// Load the initial snapshot. Fails with the full error list if the
    /// sources do not validate; the service never starts on an invalid
    /// registry.
    pub fn new(sources: &[SkillSource], config: RouterConfig) -> Result<Self, Vec<RegistryError>> {
        let snapshot = Snapshot::build(sources, config)?;
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
        })
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Resolve a request into a plan. Total: never errors, all
    /// anomalies are diagnostic flags on the plan.
    pub fn resolve(&self, text: &str, hints: RequestHints) -> ResolutionPlan {
        self.resolve_request(&Request::with_hints(text, hints))
    }

    pub fn resolve_request(&self, request: &Request) -> ResolutionPlan {
        let snapshot = self.snapshot();
        build_plan(
            request,
            &snapshot.registry,
            &snapshot.index,
            &HintAnswers::new(request),
        )
    }

    /// Resolve, surfacing the first unanswered branch question instead
    /// of silently taking its default child.
    pub fn resolve_interactive(&self, request: &Request) -> ResolveOutcome {
        let snapshot = self.snapshot();
        let recorder = RecordingAnswers {
            hints: HintAnswers::new(request),
            first_miss: RefCell::new(None),
        };
        let plan = build_plan(request, &snapshot.registry, &snapshot.index, &recorder);
        match recorder.first_miss.into_inner() {
            Some(question) => ResolveOutcome::NeedsAnswer(question),
            None => ResolveOutcome::Complete(plan),
        }
    }

    /// Validate sources without touching the served snapshot.
    pub fn validate(sources: &[SkillSource], config: &RouterConfig) -> Vec<RegistryError> {
        Registry::check(sources, config)
    }

    /// Hot-swap in a new snapshot built from `sources`, keeping the
    /// current config. A failed reload leaves the served snapshot
    /// untouched and returns every violation.
    pub fn reload(&self, sources: &[SkillSource]) -> Result<(), Vec<RegistryError>> {
        let config = self.snapshot().registry.config().clone();
        self.reload_with(sources, config)
    }

    /// Hot-swap with a new config as well.
    pub fn reload_with(
        &self,
        sources: &[SkillSource],
        config: RouterConfig,
    ) -> Result<(), Vec<RegistryError>> {
        let snapshot = Snapshot::build(sources, config)?;
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(snapshot);
        tracing::info!("registry snapshot swapped");
        Ok(())
    }

    /// Clone of one skill's descriptor (body included) from the current
    /// snapshot; the opaque payload callers display or execute.
    pub fn skill(&self, id: &str) -> Option<SkillDescriptor> {
        self.snapshot().registry.get(id).cloned()
    }

    pub fn stats(&self) -> RegistryStats {
        let snapshot = self.snapshot();
        RegistryStats {
            skills: snapshot.registry.len(),
            routers: snapshot.registry.router_count(),
            loaded_at: snapshot.registry.loaded_at(),
        }
    }
}

/// Wraps hint answers, remembering the first question they missed.
struct RecordingAnswers<'a> {
    hints: HintAnswers<'a>,
    first_miss: RefCell<Option<PendingQuestion>>,
}

impl AnswerSource for RecordingAnswers<'_> {
    fn answer(
        &self,
        skill_id: &str,
        node_id: &str,
        question: &str,
        options: &[String],
    ) -> Option<String> {
        let answer = self.hints.answer(skill_id, node_id, question, options);
        if answer.is_none() {
            let mut miss = self.first_miss.borrow_mut();
            if miss.is_none() {
                *miss = Some(PendingQuestion {
                    skill_id: skill_id.to_owned(),
                    node_id: node_id.to_owned(),
                    question: question.to_owned(),
                    options: options.to_vec(),
                });
            }
        }
        answer
    }
}
