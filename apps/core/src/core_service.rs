use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::action_executor::{AppCommands, Executors, Shell};
use crate::config::{Config, ConfigError};
use crate::contract::{
    AutoCompleteResponse, CoreRequest, CoreResponse, ExecuteResponse, OpenFileLocationResponse,
    SearchIconResponse, SearchResponse, SettingsResponse,
};
use crate::discovery::{os_settings_entries, AppIndex};
use crate::execution_service::ExecutionService;
use crate::icons::{IconProvider, StaticIcons};
use crate::index_store::UsageStore;
use crate::input_validation::InputValidationService;
use crate::model::AppEntry;
use crate::notification::Notifier;
use crate::settings;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Everything the core consumes from its host.
pub struct Collaborators {
    pub apps: Arc<dyn AppIndex>,
    pub shell: Arc<dyn Shell>,
    pub commands: Arc<dyn AppCommands>,
    pub notifier: Arc<dyn Notifier>,
    pub icons: Arc<dyn IconProvider>,
    pub usage: Option<Arc<UsageStore>>,
    pub os_settings: Vec<AppEntry>,
}

impl Collaborators {
    pub fn new(
        apps: Arc<dyn AppIndex>,
        shell: Arc<dyn Shell>,
        commands: Arc<dyn AppCommands>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            apps,
            shell,
            commands,
            notifier,
            icons: Arc::new(StaticIcons),
            usage: None,
            os_settings: os_settings_entries(),
        }
    }
}

pub struct CoreService {
    config: Arc<Config>,
    config_path: PathBuf,
    icons: Arc<dyn IconProvider>,
    resolver: InputValidationService,
    executor: ExecutionService,
}

impl CoreService {
    pub fn new(
        config: Config,
        config_path: PathBuf,
        collaborators: Collaborators,
    ) -> Result<Self, ServiceError> {
        settings::validate(&config).map_err(|error| ServiceError::Config(ConfigError::Invalid(error)))?;
        let config = Arc::new(config);
        let Collaborators {
            apps,
            shell,
            commands,
            notifier,
            icons,
            usage,
            os_settings,
        } = collaborators;

        let mut resolver = InputValidationService::new(Arc::clone(&config), apps, Arc::clone(&icons))
            .with_os_settings(os_settings);
        let mut executor = ExecutionService::new(
            Arc::clone(&config),
            Executors::new(shell, commands),
            notifier,
        );
        if let Some(usage) = usage {
            resolver = resolver.with_usage_store(Arc::clone(&usage));
            executor = executor.with_usage_store(usage);
        }

        Ok(Self {
            config,
            config_path,
            icons,
            resolver,
            executor,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn search(&self, query: &str) -> SearchResponse {
        let results = self.resolver.get_search_result(query);
        let window_height = self.config.calculate_window_height(results.len());
        SearchResponse {
            results,
            window_height,
        }
    }

    pub fn execute(&self, argument: &str) -> bool {
        self.executor.execute(argument).is_ok()
    }

    pub fn open_file_location(&self, path: &str) -> bool {
        self.executor.open_file_location(path).is_ok()
    }

    pub fn auto_complete(&self, user_input: &str, suggestion: &str) -> Option<String> {
        self.resolver.auto_complete(user_input, suggestion)
    }

    pub fn handle_command(&self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        match request {
            CoreRequest::Search(request) => Ok(CoreResponse::Search(self.search(&request.query))),
            CoreRequest::Execute(request) => Ok(CoreResponse::Execute(ExecuteResponse {
                executed: self.execute(&request.argument),
            })),
            CoreRequest::OpenFileLocation(request) => {
                Ok(CoreResponse::OpenFileLocation(OpenFileLocationResponse {
                    opened: self.open_file_location(&request.path),
                }))
            }
            CoreRequest::AutoComplete(request) => Ok(CoreResponse::AutoComplete(AutoCompleteResponse {
                suggestion: self.auto_complete(&request.user_input, &request.suggestion),
            })),
            CoreRequest::SearchIcon => Ok(CoreResponse::SearchIcon(SearchIconResponse {
                icon: self.icons.search_icon(),
            })),
            CoreRequest::ExportSettings(request) => {
                let folder = non_empty(&request.folder, "folder")?;
                settings::export(&self.config, Path::new(folder))?;
                Ok(settings_response(self.config.as_ref().clone()))
            }
            CoreRequest::ImportSettings(request) => {
                let file = non_empty(&request.file, "file")?;
                let imported = settings::import(Path::new(file), &self.config_path)?;
                Ok(settings_response(imported))
            }
            CoreRequest::ResetSettings => {
                let defaults = settings::reset(&self.config_path)?;
                Ok(settings_response(defaults))
            }
        }
    }
}

fn settings_response(config: Config) -> CoreResponse {
    CoreResponse::Settings(SettingsResponse { config })
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidRequest(format!("{field} is required")));
    }
    Ok(trimmed)
}
