//! Engine configuration loading

use std::path::Path;

use anyhow::{Context, Result};
use danmaku_engine::EngineConfig;

/// Resolve the engine configuration for a run.
///
/// A TOML file wins when given; fields it leaves out take their defaults.
/// Otherwise the preset follows the container width unless `compact` forces
/// the narrow-screen one.
pub fn load(path: Option<&Path>, compact: bool, width: f32) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            parse(&text).with_context(|| format!("Invalid config {}", path.display()))?
        }
        None if compact => EngineConfig::compact(),
        None => EngineConfig::for_viewport_width(width),
    };
    tracing::debug!(?config, "engine configuration resolved");
    Ok(config)
}

/// Parse and validate a TOML configuration
pub fn parse(text: &str) -> Result<EngineConfig> {
    let config: EngineConfig = toml::from_str(text).context("Malformed TOML")?;
    config.validate()?;
    Ok(config)
}
