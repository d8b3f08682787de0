//! `waymark validate` command: offline registry validation.

use std::path::Path;

use anyhow::Result;
use console::style;

use waymark_core::service::ResolutionService;

use crate::loader;

/// Validate the skills directory. Prints one line per violation and
/// returns the number of errors found; the caller maps a non-zero
/// count to a non-zero exit code.
pub fn validate(
    skills_dir: &Path,
    config_path: Option<&Path>,
    json: bool,
    quiet: bool,
) -> Result<usize> {
    let config = loader::load_router_config(config_path, skills_dir)?;
    let sources = loader::load_skill_sources(skills_dir)?;
    let errors = ResolutionService::validate(&sources, &config);

    if json {
        let report = serde_json::json!({
            "skills_dir": skills_dir.display().to_string(),
            "sources": sources.len(),
            "errors": errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            "valid": errors.is_empty(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(errors.len());
    }

    if errors.is_empty() {
        if !quiet {
            println!(
                "  {} {} skill document(s) valid",
                style("✓").green(),
                sources.len()
            );
        }
        return Ok(0);
    }

    for error in &errors {
        println!("  {} {error}", style("✗").red());
    }
    println!();
    println!(
        "  {} validation failed with {} error(s)",
        style("✗").red().bold(),
        errors.len()
    );
    Ok(errors.len())
}
