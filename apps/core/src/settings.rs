use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::config::{self, Config, ConfigError, CONFIG_FILE_NAME, WEB_SEARCH_SEPARATOR};

pub fn validate(cfg: &Config) -> Result<(), String> {
    validate_max_results(cfg.max_search_result_count)?;

    if cfg.window_width < 200 {
        return Err("windowWidth must be at least 200.".to_string());
    }

    if cfg.rescan_interval < 5 {
        return Err("rescanInterval must be at least 5 seconds.".to_string());
    }

    let mut prefixes = BTreeSet::new();
    for search in &cfg.web_searches {
        let prefix = search.prefix.as_str();
        if prefix.is_empty() {
            return Err(format!("Web search '{}' needs a prefix.", search.name));
        }
        // prefixes are matched untrimmed
        if prefix.chars().any(char::is_whitespace) {
            return Err(format!(
                "Web search prefix '{prefix}' must not contain whitespace."
            ));
        }
        if prefix.contains(WEB_SEARCH_SEPARATOR) {
            return Err(format!(
                "Web search prefix '{prefix}' must not contain '{WEB_SEARCH_SEPARATOR}'."
            ));
        }
        if !prefixes.insert(prefix.to_ascii_lowercase()) {
            return Err(format!("Web search prefix '{prefix}' is used more than once."));
        }
        if !(search.url.starts_with("https://") || search.url.starts_with("http://")) {
            return Err(format!(
                "Web search '{}' must use an http(s) URL template.",
                search.name
            ));
        }
    }

    Ok(())
}

pub fn validate_max_results(value: usize) -> Result<(), String> {
    if (1..=50).contains(&value) {
        Ok(())
    } else {
        Err("maxSearchResultCount must be between 1 and 50.".to_string())
    }
}

/// Writes `cfg` to `<folder>/ezr.config.json` and returns the written path.
pub fn export(cfg: &Config, folder: &Path) -> Result<PathBuf, ConfigError> {
    if !folder.is_dir() {
        return Err(ConfigError::Invalid(format!(
            "export folder does not exist: {}",
            folder.display()
        )));
    }
    let target = folder.join(CONFIG_FILE_NAME);
    config::save(&target, cfg)?;
    info!(path = %target.display(), "exported settings");
    Ok(target)
}

/// Reads settings from `file`, merges them over the defaults and persists the
/// result to `config_path`.
pub fn import(file: &Path, config_path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(file)?;
    let imported = merge_with_defaults(&content)?;
    config::save(config_path, &imported)?;
    info!(from = %file.display(), to = %config_path.display(), "imported settings");
    Ok(imported)
}

pub fn reset(config_path: &Path) -> Result<Config, ConfigError> {
    let defaults = Config::default();
    config::save(config_path, &defaults)?;
    info!(path = %config_path.display(), "reset settings to defaults");
    Ok(defaults)
}

/// Overlays the fields present in `content` on top of the default config.
pub fn merge_with_defaults(content: &str) -> Result<Config, ConfigError> {
    let user: Value = json5::from_str(content)?;
    if !user.is_object() {
        return Err(ConfigError::Invalid("settings file must hold an object".to_string()));
    }
    config::ensure_current_version(user.get("version").and_then(Value::as_str))?;

    let mut merged = serde_json::to_value(Config::default())?;
    merge_values(&mut merged, user);
    let cfg: Config = serde_json::from_value(merged)?;
    validate(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
