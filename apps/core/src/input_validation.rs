use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::{Config, WEB_SEARCH_SEPARATOR};
use crate::discovery::{os_settings_entries, AppIndex};
use crate::icons::IconProvider;
use crate::index_store::UsageStore;
use crate::model::{AppEntry, ExecutionArgumentKind, InternalCommand, SearchResult};
use crate::search::{search_scored, UsageCounts};
use crate::validator;

pub const EMPTY_COMMAND_NAME: &str = "Enter a command";

/// Turns raw input into ranked search results in two phases: direct
/// classification by prefix or shape, then fuzzy ranking when nothing
/// classified directly.
pub struct InputValidationService {
    config: Arc<Config>,
    apps: Arc<dyn AppIndex>,
    icons: Arc<dyn IconProvider>,
    usage: Option<Arc<UsageStore>>,
    os_settings: Vec<AppEntry>,
    dir_separator: char,
}

impl InputValidationService {
    pub fn new(config: Arc<Config>, apps: Arc<dyn AppIndex>, icons: Arc<dyn IconProvider>) -> Self {
        Self {
            config,
            apps,
            icons,
            usage: None,
            os_settings: os_settings_entries(),
            dir_separator: std::path::MAIN_SEPARATOR,
        }
    }

    pub fn with_usage_store(mut self, usage: Arc<UsageStore>) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn with_os_settings(mut self, os_settings: Vec<AppEntry>) -> Self {
        self.os_settings = os_settings;
        self
    }

    pub fn with_directory_separator(mut self, separator: char) -> Self {
        self.dir_separator = separator;
        self
    }

    pub fn get_search_result(&self, raw_input: &str) -> Vec<SearchResult> {
        let input = raw_input.trim();
        if input.is_empty() {
            return Vec::new();
        }

        let mut results = match self.direct_result(input) {
            Some(result) => vec![result],
            None => self.fuzzy_results(input),
        };
        results.truncate(self.config.max_search_result_count);
        debug!(count = results.len(), "resolved input");
        results
    }

    /// Completes `suggestion` for a file path input, appending the directory
    /// separator when it names a directory.
    pub fn auto_complete(&self, user_input: &str, suggestion: &str) -> Option<String> {
        if !validator::is_file_path(user_input.trim()) {
            return None;
        }

        let mut completed = suggestion.to_string();
        let is_dir = std::fs::metadata(&completed)
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if is_dir && !completed.ends_with(self.dir_separator) {
            completed.push(self.dir_separator);
        }
        Some(completed)
    }

    fn direct_result(&self, input: &str) -> Option<SearchResult> {
        let kind = validator::classify(input, &self.config)?;
        let icon = self.icons.icon_for(kind, input);

        let (name, icon) = match kind {
            ExecutionArgumentKind::CommandLine => {
                let body = validator::command_line_body(input).unwrap_or_default();
                let name = if body.is_empty() {
                    EMPTY_COMMAND_NAME.to_string()
                } else {
                    body.to_string()
                };
                (name, icon)
            }
            ExecutionArgumentKind::InternalCommand => {
                let name = match validator::internal_command(input)? {
                    InternalCommand::Reload => "Reload ezr",
                    InternalCommand::Exit => "Exit ezr",
                };
                (name.to_string(), icon)
            }
            ExecutionArgumentKind::OsSetting => {
                let name = self
                    .os_settings
                    .iter()
                    .find(|entry| entry.path == input)
                    .map(|entry| entry.name.clone())
                    .or_else(|| validator::os_setting_uri(input).map(str::to_string))?;
                (name, icon)
            }
            ExecutionArgumentKind::WebSearch => {
                let (search, query) = validator::match_web_search(input, &self.config.web_searches)?;
                (format!("Search {} for '{query}'", search.name), search.icon.clone())
            }
            ExecutionArgumentKind::FilePath => {
                let name = Path::new(input)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| input.to_string());
                (name, icon)
            }
            ExecutionArgumentKind::WebUrl => (input.to_string(), icon),
        };

        Some(SearchResult::new(name, input, icon, kind))
    }

    fn fuzzy_results(&self, input: &str) -> Vec<SearchResult> {
        let limit = self.config.max_search_result_count;
        let usage = self.usage_counts();
        let apps = self.apps.apps();

        let mut ranked: Vec<(ExecutionArgumentKind, i64, &AppEntry)> =
            search_scored(&apps, input, limit, &usage)
                .into_iter()
                .map(|scored| (ExecutionArgumentKind::FilePath, scored.score, scored.entry))
                .collect();
        if self.config.search_operating_system_settings {
            ranked.extend(
                search_scored(&self.os_settings, input, limit, &usage)
                    .into_iter()
                    .map(|scored| (ExecutionArgumentKind::OsSetting, scored.score, scored.entry)),
            );
        }
        // stable: apps stay ahead of settings with the same score
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut results: Vec<SearchResult> = ranked
            .into_iter()
            .map(|(kind, _, entry)| {
                let icon = entry
                    .icon
                    .clone()
                    .unwrap_or_else(|| self.icons.icon_for(kind, &entry.path));
                SearchResult::new(entry.name.clone(), entry.path.clone(), icon, kind)
            })
            .collect();

        let lowered = input.to_lowercase();
        results.extend(
            self.config
                .web_searches
                .iter()
                .filter(|search| search.prefix.to_lowercase().starts_with(&lowered))
                .map(|search| {
                    let trigger = search.trigger(WEB_SEARCH_SEPARATOR);
                    SearchResult::new(
                        format!("{} ({trigger})", search.name),
                        trigger,
                        search.icon.clone(),
                        ExecutionArgumentKind::WebSearch,
                    )
                }),
        );

        results
    }

    fn usage_counts(&self) -> Arc<UsageCounts> {
        self.usage
            .as_ref()
            .map(|store| store.usage_counts())
            .unwrap_or_default()
    }
}
