// Configuration loader
// Loads ~/.mindguard/config.toml when present, then applies environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::{mindguard_dir, Config};

/// Load configuration from the Mindguard config file or defaults
pub fn load_config() -> Result<Config> {
    let config_path = mindguard_dir().join("config.toml");

    let config = if config_path.exists() {
        load_config_from(&config_path)?
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        Config::default()
    };

    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

/// Parse an explicit TOML config file
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(config)
}

/// MINDGUARD_MODEL_DIR, MINDGUARD_DATASET and MINDGUARD_KEYWORDS win over the file
fn apply_env_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty()).map(PathBuf::from);

    if let Some(dir) = non_empty("MINDGUARD_MODEL_DIR") {
        config.model_dir = dir;
    }
    if let Some(dataset) = non_empty("MINDGUARD_DATASET") {
        config.dataset_path = Some(dataset);
    }
    if let Some(keywords) = non_empty("MINDGUARD_KEYWORDS") {
        config.keywords_path = Some(keywords);
    }
    config
}
