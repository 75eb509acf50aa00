use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::WebSearch;

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CONFIG_FILE_NAME: &str = "ezr.config.json";
const APP_DIR_NAME: &str = "ezr";

pub const COMMAND_LINE_PREFIX: &str = ">";
pub const INTERNAL_COMMAND_PREFIX: &str = "ezr:";
pub const OS_SETTINGS_PREFIX: &str = "win:";
pub const WEB_SEARCH_SEPARATOR: &str = "?";

pub const USER_INPUT_HEIGHT: u32 = 80;
pub const SEARCH_RESULT_HEIGHT: u32 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] json5::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("unsupported config version {found:?}, expected major {expected}")]
    UnsupportedVersion { found: Option<String>, expected: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Why a load ended up with the values it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Missing,
    Unreadable,
    StaleVersion,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub version: String,
    pub auto_start_app: bool,
    pub max_search_result_count: usize,
    /// Seconds between app index rescans.
    pub rescan_interval: u64,
    pub search_operating_system_settings: bool,
    pub window_width: u32,
    pub web_searches: Vec<WebSearch>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            auto_start_app: true,
            max_search_result_count: 8,
            rescan_interval: 30,
            search_operating_system_settings: true,
            window_width: 860,
            web_searches: default_web_searches(),
        }
    }
}

impl Config {
    pub fn min_window_height(&self) -> u32 {
        USER_INPUT_HEIGHT
    }

    pub fn max_window_height(&self) -> u32 {
        let rows = u32::try_from(self.max_search_result_count).unwrap_or(u32::MAX);
        USER_INPUT_HEIGHT.saturating_add(rows.saturating_mul(SEARCH_RESULT_HEIGHT))
    }

    pub fn calculate_window_height(&self, search_result_count: usize) -> u32 {
        if search_result_count >= self.max_search_result_count {
            return self.max_window_height();
        }
        // count < max, so the product stays below max_window_height
        self.min_window_height() + search_result_count as u32 * SEARCH_RESULT_HEIGHT
    }
}

pub fn default_web_searches() -> Vec<WebSearch> {
    vec![
        WebSearch::new("g", "Google", "https://google.com/search?q=", "google"),
        WebSearch::new(
            "gi",
            "Google Images",
            "https://www.google.com/search?tbm=isch&q=",
            "google-images",
        ),
        WebSearch::new("d", "DuckDuckGo", "https://duckduckgo.com/?q=", "duckduckgo"),
        WebSearch::new(
            "yt",
            "YouTube",
            "https://www.youtube.com/results?search_query=",
            "youtube",
        ),
        WebSearch::new(
            "l",
            "Linguee",
            "http://www.linguee.de/deutsch-englisch/search?source=auto&query=",
            "linguee",
        ),
    ]
}

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CONFIG_FILE_NAME)
}

pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn current_major() -> &'static str {
    CURRENT_VERSION.split('.').next().unwrap_or(CURRENT_VERSION)
}

/// Loads the config at `path`, rewriting the file with defaults when it is
/// missing, unparseable, invalid or from another major version.
pub fn load(path: &Path) -> Config {
    load_with_outcome(path).0
}

pub fn load_with_outcome(path: &Path) -> (Config, LoadOutcome) {
    let outcome = match read(path) {
        Ok(config) => {
            info!(path = %path.display(), "loaded config");
            return (config, LoadOutcome::Loaded);
        }
        Err(ConfigError::Io(error)) if error.kind() == std::io::ErrorKind::NotFound => {
            LoadOutcome::Missing
        }
        Err(ConfigError::UnsupportedVersion { .. }) => LoadOutcome::StaleVersion,
        Err(ConfigError::Invalid(_)) => LoadOutcome::Invalid,
        Err(_) => LoadOutcome::Unreadable,
    };

    warn!(path = %path.display(), ?outcome, "falling back to default config");
    let defaults = Config::default();
    if let Err(error) = save(path, &defaults) {
        warn!(path = %path.display(), %error, "failed to write default config");
    }
    (defaults, outcome)
}

pub fn read(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Parses config text. Comments and trailing commas are tolerated; missing
/// fields take their default values but `version` is mandatory.
pub fn parse(content: &str) -> Result<Config, ConfigError> {
    let raw: Value = json5::from_str(content)?;
    let version = raw.get("version").and_then(Value::as_str);
    ensure_current_version(version)?;

    let config: Config = serde_json::from_value(raw)?;
    crate::settings::validate(&config).map_err(ConfigError::Invalid)?;
    Ok(config)
}

pub fn ensure_current_version(version: Option<&str>) -> Result<(), ConfigError> {
    let expected = current_major();
    match version {
        Some(found) if found.split('.').next() == Some(expected) => Ok(()),
        other => Err(ConfigError::UnsupportedVersion {
            found: other.map(str::to_string),
            expected: expected.to_string(),
        }),
    }
}

pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
