use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::action_executor::{ExecutionError, Executors};
use crate::config::Config;
use crate::index_store::UsageStore;
use crate::model::ExecutionArgumentKind;
use crate::notification::{Notification, Notifier};
use crate::validator;

/// Re-classifies a selected argument and hands it to the matching executor.
/// Failures are logged and surfaced through the notifier; they are also
/// returned so callers can report success to the UI.
pub struct ExecutionService {
    config: Arc<Config>,
    executors: Executors,
    notifier: Arc<dyn Notifier>,
    usage: Option<Arc<UsageStore>>,
}

impl ExecutionService {
    pub fn new(config: Arc<Config>, executors: Executors, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            executors,
            notifier,
            usage: None,
        }
    }

    pub fn with_usage_store(mut self, usage: Arc<UsageStore>) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn execute(&self, execution_argument: &str) -> Result<ExecutionArgumentKind, ExecutionError> {
        let argument = execution_argument.trim();
        let outcome = match validator::classify(argument, &self.config) {
            Some(kind) => self
                .executors
                .execute(kind, argument, &self.config)
                .map(|()| kind),
            None => Err(ExecutionError::NoMatchingExecutor(argument.to_string())),
        };

        match &outcome {
            Ok(kind) => {
                info!(kind = kind.as_str(), "executed argument");
                if matches!(kind, ExecutionArgumentKind::FilePath | ExecutionArgumentKind::OsSetting) {
                    self.record_usage(argument);
                }
            }
            Err(error) => self.report(error),
        }
        outcome
    }

    pub fn open_file_location(&self, path: &str) -> Result<(), ExecutionError> {
        let path = path.trim();
        let outcome = if validator::is_file_path(path) {
            self.executors.open_file_location(path)
        } else {
            Err(ExecutionError::MissingPath(PathBuf::from(path)))
        };

        if let Err(error) = &outcome {
            self.report(error);
        }
        outcome
    }

    fn report(&self, error: &ExecutionError) {
        warn!(%error, "execution failed");
        self.notifier.notify(Notification::error(error.to_string()));
    }

    fn record_usage(&self, argument: &str) {
        let Some(store) = &self.usage else {
            return;
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or(0);
        if let Err(error) = store.record_launch(argument, now) {
            warn!(%error, "failed to record launch");
        }
    }
}
