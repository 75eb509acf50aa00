#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ezr_core::action_executor::{AppCommands, ExecutionError, Shell};
use ezr_core::config::Config;
use ezr_core::core_service::{Collaborators, CoreService};
use ezr_core::discovery::StaticAppIndex;
use ezr_core::model::AppEntry;
use ezr_core::notification::QueuedNotifier;

#[derive(Default)]
pub struct RecordingShell {
    pub opened: Mutex<Vec<String>>,
    pub revealed: Mutex<Vec<PathBuf>>,
    pub spawned: Mutex<Vec<(String, Vec<String>)>>,
    pub fail_with: Option<ExecutionError>,
}

impl RecordingShell {
    pub fn failing(error: ExecutionError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn revealed(&self) -> Vec<PathBuf> {
        self.revealed.lock().unwrap().clone()
    }

    pub fn spawned(&self) -> Vec<(String, Vec<String>)> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn is_untouched(&self) -> bool {
        self.opened().is_empty() && self.revealed().is_empty() && self.spawned().is_empty()
    }

    fn outcome(&self) -> Result<(), ExecutionError> {
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Shell for RecordingShell {
    fn open(&self, target: &str) -> Result<(), ExecutionError> {
        self.opened.lock().unwrap().push(target.to_string());
        self.outcome()
    }

    fn reveal(&self, path: &Path) -> Result<(), ExecutionError> {
        self.revealed.lock().unwrap().push(path.to_path_buf());
        self.outcome()
    }

    fn spawn(&self, program: &str, args: &[String]) -> Result<(), ExecutionError> {
        self.spawned
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        self.outcome()
    }
}

#[derive(Default)]
pub struct RecordingCommands {
    pub reloads: AtomicUsize,
    pub exits: AtomicUsize,
}

impl RecordingCommands {
    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }

    pub fn exits(&self) -> usize {
        self.exits.load(Ordering::SeqCst)
    }
}

impl AppCommands for RecordingCommands {
    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.exits.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub service: CoreService,
    pub shell: Arc<RecordingShell>,
    pub commands: Arc<RecordingCommands>,
    pub notifier: Arc<QueuedNotifier>,
    pub dir: tempfile::TempDir,
}

impl Harness {
    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(ezr_core::config::CONFIG_FILE_NAME)
    }
}

pub fn harness(config: Config, apps: Vec<AppEntry>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let shell = Arc::new(RecordingShell::default());
    let commands = Arc::new(RecordingCommands::default());
    let notifier = Arc::new(QueuedNotifier::default());

    let mut collaborators = Collaborators::new(
        Arc::new(StaticAppIndex::from_apps(apps)),
        shell.clone(),
        commands.clone(),
        notifier.clone(),
    );
    collaborators.os_settings = Vec::new();

    let service = CoreService::new(
        config,
        dir.path().join(ezr_core::config::CONFIG_FILE_NAME),
        collaborators,
    )
    .unwrap();

    Harness {
        service,
        shell,
        commands,
        notifier,
        dir,
    }
}
