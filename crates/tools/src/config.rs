//! Builder settings read from a TOML file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cellar::BuilderConfig;

/// Reads `path` as a TOML [`BuilderConfig`]. Keys the file leaves out keep
/// their default values.
pub fn load_builder_config(path: &Path) -> Result<BuilderConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: BuilderConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    config.validate().with_context(|| format!("invalid settings in {}", path.display()))?;
    Ok(config)
}
