use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::action_executor::{AppCommands, SystemShell};
use crate::config;
use crate::core_service::{Collaborators, CoreService, ServiceError};
use crate::discovery::{AppCatalog, DirectoryScanner};
use crate::index_store::UsageStore;
use crate::logging;
use crate::notification::{Notification, Notifier};
use crate::startup::{self, StartupError};
use crate::transport;

const USAGE: &str = "usage: ezr-core [--config <path>] [--no-autostart-sync]";
const USAGE_DB_FILE_NAME: &str = "usage.sqlite3";
const MIN_RESCAN_SECS: u64 = 5;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: PathBuf,
    pub sync_autostart: bool,
    pub show_help: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            config_path: config::default_config_path(),
            sync_autostart: true,
            show_help: false,
        }
    }
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .filter(|value| !value.trim().is_empty())
                    .ok_or_else(|| format!("--config requires a path\n{USAGE}"))?;
                options.config_path = PathBuf::from(path);
            }
            "--no-autostart-sync" => options.sync_autostart = false,
            "-h" | "--help" => options.show_help = true,
            other => return Err(format!("unknown argument '{other}'\n{USAGE}")),
        }
    }

    Ok(options)
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    if options.show_help {
        println!("{USAGE}");
        return Ok(());
    }

    if let Err(error) = logging::init(&logging::logs_dir()) {
        eprintln!("[ezr-core] logging disabled: {error}");
    }

    let config = config::load(&options.config_path);
    info!(
        config_path = %options.config_path.display(),
        max_results = config.max_search_result_count,
        "startup"
    );

    if options.sync_autostart {
        match startup::sync_with_config(config.auto_start_app) {
            Ok(()) => {}
            Err(StartupError::UnsupportedPlatform) => debug!("auto-start not supported here"),
            Err(error) => warn!(%error, "failed to apply auto-start setting"),
        }
    }

    let catalog = Arc::new(AppCatalog::new(DirectoryScanner::platform_default()));
    let indexed = catalog.refresh();
    info!(indexed, "initial app scan finished");

    let stop = Arc::new(AtomicBool::new(false));
    let interval = Duration::from_secs(config.rescan_interval.max(MIN_RESCAN_SECS));
    if let Err(error) = catalog.spawn_rescan(interval, Arc::clone(&stop)) {
        warn!(%error, "app rescans disabled");
    }

    let usage = match UsageStore::open(&config::app_data_dir().join(USAGE_DB_FILE_NAME)) {
        Ok(store) => Some(Arc::new(store)),
        Err(error) => {
            warn!(%error, "usage ranking disabled");
            None
        }
    };

    let host = Arc::new(HostChannel::new(Box::new(std::io::stdout())));
    let mut collaborators = Collaborators::new(
        catalog,
        Arc::new(SystemShell),
        Arc::clone(&host) as Arc<dyn AppCommands>,
        Arc::clone(&host) as Arc<dyn Notifier>,
    );
    collaborators.usage = usage;

    let service = CoreService::new(config, options.config_path, collaborators)?;
    let handled = serve(&service, &host, std::io::stdin().lock());
    stop.store(true, Ordering::Relaxed);
    let handled = handled?;
    info!(handled, "shutting down");
    Ok(())
}

/// Answers newline-delimited JSON requests from `input` until it ends or an
/// exit command runs. Returns the number of requests handled.
pub fn serve<R: BufRead>(
    service: &CoreService,
    host: &HostChannel,
    input: R,
) -> Result<usize, std::io::Error> {
    let mut handled = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = transport::handle_json(service, &line);
        host.write_line(&response)?;
        handled += 1;

        if host.exit_requested() {
            break;
        }
    }
    Ok(handled)
}

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum HostEvent {
    Reload,
    Notification(Notification),
}

/// Output side of the stdio channel. Also receives internal commands and
/// notifications, which it forwards to the UI as event lines.
pub struct HostChannel {
    output: Mutex<Box<dyn Write + Send>>,
    exit_requested: AtomicBool,
}

impl HostChannel {
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(output),
            exit_requested: AtomicBool::new(false),
        }
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested.load(Ordering::SeqCst)
    }

    pub fn write_line(&self, line: &str) -> Result<(), std::io::Error> {
        let mut output = self
            .output
            .lock()
            .map_err(|_| std::io::Error::other("output lock poisoned"))?;
        writeln!(output, "{line}")?;
        output.flush()
    }

    fn emit(&self, event: &HostEvent) {
        if let Err(error) = self.write_line(&transport::encode(event)) {
            warn!(%error, ?event, "failed to emit host event");
        }
    }
}

impl AppCommands for HostChannel {
    fn reload(&self) {
        self.emit(&HostEvent::Reload);
    }

    fn exit(&self) {
        self.exit_requested.store(true, Ordering::SeqCst);
    }
}

impl Notifier for HostChannel {
    fn notify(&self, notification: Notification) {
        self.emit(&HostEvent::Notification(notification));
    }
}
