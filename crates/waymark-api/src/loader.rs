//! Filesystem loading of skill sources and router configuration.
//!
//! Skills are markdown documents discovered recursively under the
//! skills directory. The router config lives in a TOML file, either
//! passed explicitly or found as `router.toml` next to the skills.

use std::path::{Path, PathBuf};

use anyhow::Context;

use waymark_types::config::RouterConfig;
use waymark_types::skill::SkillSource;

/// Recursively collect every `*.md` file under `dir` as a skill source.
///
/// Origins are paths relative to `dir`, so validation errors stay
/// readable regardless of where the directory lives. Files are returned
/// in sorted origin order.
pub fn load_skill_sources(dir: &Path) -> anyhow::Result<Vec<SkillSource>> {
    let mut sources = Vec::new();
    collect_markdown(dir, dir, &mut sources)
        .with_context(|| format!("failed to read skills directory {}", dir.display()))?;
    if sources.is_empty() {
        anyhow::bail!("no skill documents (*.md) found under {}", dir.display());
    }
    sources.sort_by(|a, b| a.origin.cmp(&b.origin));
    Ok(sources)
}

fn collect_markdown(root: &Path, dir: &Path, out: &mut Vec<SkillSource>) -> anyhow::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_markdown(root, &path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "md") {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let origin = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .to_string_lossy()
                .into_owned();
            out.push(SkillSource::new(origin, content));
        }
    }
    Ok(())
}

/// Resolve the router config: an explicit `--config` path, else
/// `router.toml` inside the skills directory.
pub fn load_router_config(
    explicit: Option<&Path>,
    skills_dir: &Path,
) -> anyhow::Result<RouterConfig> {
    let path: PathBuf = match explicit {
        Some(p) => p.to_path_buf(),
        None => skills_dir.join("router.toml"),
    };
    if !path.exists() {
        anyhow::bail!(
            "router config not found at {} (pass --config or add router.toml to the skills directory)",
            path.display()
        );
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: RouterConfig =
        toml::from_str(&raw).with_context(|| format!("invalid router config {}", path.display()))?;
    Ok(config)
}
