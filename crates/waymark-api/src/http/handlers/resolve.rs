//! Resolution endpoint.
//!
//! POST /api/v1/resolve - Route request text into a delegation plan.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use waymark_core::service::{PendingQuestion, ResolveOutcome};
use waymark_types::plan::ResolutionPlan;
use waymark_types::request::{Request, RequestHints};

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub text: String,
    #[serde(default)]
    pub hints: RequestHints,
    /// When true, an unanswered decision-tree question is returned
    /// instead of silently taking its default branch. The caller adds
    /// the answer to `hints.answers` and re-posts.
    #[serde(default)]
    pub interactive: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolveResponse {
    Complete { plan: ResolutionPlan },
    NeedsAnswer { question: PendingQuestion },
}

/// POST /api/v1/resolve - Resolve request text.
///
/// Resolution is total: every request produces a plan, with anomalies
/// carried as diagnostic flags rather than errors.
pub async fn resolve(
    State(state): State<AppState>,
    Json(body): Json<ResolveBody>,
) -> Result<Json<ResolveResponse>, AppError> {
    if body.text.trim().is_empty() {
        return Err(AppError::Validation("request text must not be empty".into()));
    }

    let request = Request::with_hints(body.text, body.hints);

    let response = if body.interactive {
        match state.service.resolve_interactive(&request) {
            ResolveOutcome::Complete(plan) => ResolveResponse::Complete { plan },
            ResolveOutcome::NeedsAnswer(question) => ResolveResponse::NeedsAnswer { question },
        }
    } else {
        ResolveResponse::Complete {
            plan: state.service.resolve_request(&request),
        }
    };

    Ok(Json(response))
}
