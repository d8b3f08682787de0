//! Registry management endpoints.
//!
//! POST /api/v1/reload   - Re-read the skills directory, atomic swap.
//! POST /api/v1/validate - Validate the skills directory offline.
//! GET  /api/v1/skills/{id} - One skill descriptor, body included.
//! GET  /api/v1/stats    - Registry snapshot counts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use waymark_core::service::{RegistryStats, ResolutionService};
use waymark_types::skill::SkillDescriptor;

use crate::http::error::AppError;
use crate::loader;
use crate::state::AppState;

/// POST /api/v1/reload - Rebuild the registry from disk.
///
/// On validation failure the served snapshot is untouched and the full
/// error list is returned with 422.
pub async fn reload(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let sources = loader::load_skill_sources(&state.skills_dir)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    state
        .service
        .reload(&sources)
        .map_err(AppError::Registry)?;

    let stats = state.service.stats();
    tracing::info!(skills = stats.skills, "registry reloaded");

    Ok(Json(serde_json::json!({
        "data": { "reloaded": true, "skills": stats.skills },
        "errors": [],
    })))
}

/// POST /api/v1/validate - Validate the skills directory without
/// swapping the served snapshot.
pub async fn validate(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let config = loader::load_router_config(state.config_path.as_deref(), &state.skills_dir)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let sources = loader::load_skill_sources(&state.skills_dir)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let errors = ResolutionService::validate(&sources, &config);

    Ok(Json(serde_json::json!({
        "data": {
            "sources": sources.len(),
            "valid": errors.is_empty(),
            "errors": errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
        },
        "errors": [],
    })))
}

/// GET /api/v1/skills/{id} - Fetch one skill descriptor.
pub async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SkillDescriptor>, (StatusCode, String)> {
    state
        .service
        .skill(&id)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("skill '{id}' not found")))
}

/// GET /api/v1/stats - Registry snapshot counts.
pub async fn get_stats(State(state): State<AppState>) -> Json<RegistryStats> {
    Json(state.service.stats())
}
