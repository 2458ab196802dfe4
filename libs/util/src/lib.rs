use std::path::{Path, PathBuf};

use anyhow::Context;
use toml::{map::Map, Value};
use tracing::warn;

pub const CONFIG_ENV: &str = "VH_ADMIN_CONFIG";
pub const DEFAULT_CONFIG_NAME: &str = "Config.toml";

/// Path of the config file: `$VH_ADMIN_CONFIG` or `./Config.toml`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME))
}

pub fn load_config(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let config = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    toml::from_str::<Map<String, Value>>(&config)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Like [`load_config`], but a missing file yields an empty table so
/// every value falls back to its default.
pub fn load_config_or_default(
    path: &Path,
) -> anyhow::Result<Map<String, Value>> {
    if !path.exists() {
        warn!(task = "load config", path = %path.display(), "not found");
        return Ok(Map::new());
    }

    load_config(path)
}

/// Looks up `section.key` as a string.
pub fn get_str<'a>(
    config: &'a Map<String, Value>,
    section: &str,
    key: &str,
) -> Option<&'a str> {
    config.get(section)?.get(key)?.as_str()
}

/// Looks up `section.key` as an integer.
pub fn get_integer(
    config: &Map<String, Value>,
    section: &str,
    key: &str,
) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

/// Resolves a value from the first non-empty environment variable in
/// `vars`, then from the config file, then from `default`.
pub fn resolve(
    vars: &[&str],
    from_file: Option<&str>,
    default: &str,
) -> String {
    vars.iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .or_else(|| from_file.map(str::to_string))
        .unwrap_or_else(|| default.to_string())
}
