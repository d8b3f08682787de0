//! Application state shared by the CLI commands and the HTTP handlers.

use std::path::PathBuf;
use std::sync::Arc;

use waymark_core::service::ResolutionService;

use crate::loader;

/// Shared application state: the resolution service plus the paths a
/// reload re-reads.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ResolutionService>,
    pub skills_dir: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl AppState {
    /// Load config and skill sources from disk and start the service.
    ///
    /// Validation failures are reported as one error listing every
    /// violation, so a broken registry is fixable in a single pass.
    pub fn init(skills_dir: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = loader::load_router_config(config_path.as_deref(), &skills_dir)?;
        let sources = loader::load_skill_sources(&skills_dir)?;

        let service = ResolutionService::new(&sources, config).map_err(|errors| {
            let lines: Vec<String> = errors.iter().map(|e| format!("  - {e}")).collect();
            anyhow::anyhow!(
                "registry validation failed with {} error(s):\n{}",
                errors.len(),
                lines.join("\n")
            )
        })?;

        tracing::info!(
            skills_dir = %skills_dir.display(),
            "resolution service started"
        );

        Ok(Self {
            service: Arc::new(service),
            skills_dir,
            config_path,
        })
    }
}
