use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::discovery::{is_desktop_entry, DesktopEntry};
use crate::model::{ExecutionArgumentKind, InternalCommand};
use crate::validator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("empty path")]
    EmptyPath,
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),
    #[error("no command entered")]
    EmptyCommand,
    #[error("unknown internal command: {0}")]
    UnknownInternalCommand(String),
    #[error("no web search configured for: {0}")]
    UnknownWebSearch(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("no executor accepts: {0}")]
    NoMatchingExecutor(String),
    #[error("launch failed: {message}")]
    LaunchFailed { message: String, code: Option<i32> },
}

impl ExecutionError {
    fn launch_failed(error: std::io::Error) -> Self {
        Self::LaunchFailed {
            message: error.to_string(),
            code: error.raw_os_error(),
        }
    }
}

/// OS-level side effects. Every call returns as soon as the action has been
/// handed to the OS; nothing waits for the launched program.
pub trait Shell: Send + Sync {
    /// Opens a file, folder, URL or URI with its default handler.
    fn open(&self, target: &str) -> Result<(), ExecutionError>;
    /// Shows `path` in the platform file manager.
    fn reveal(&self, path: &Path) -> Result<(), ExecutionError>;
    fn spawn(&self, program: &str, args: &[String]) -> Result<(), ExecutionError>;
}

/// Host callbacks for internal commands.
pub trait AppCommands: Send + Sync {
    fn reload(&self);
    fn exit(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn open(&self, target: &str) -> Result<(), ExecutionError> {
        open::that_detached(target).map_err(ExecutionError::launch_failed)
    }

    fn reveal(&self, path: &Path) -> Result<(), ExecutionError> {
        #[cfg(target_os = "windows")]
        {
            let mut command = Command::new("explorer");
            command.arg(format!("/select,{}", path.display()));
            spawn_detached(command)
        }

        #[cfg(target_os = "macos")]
        {
            let mut command = Command::new("open");
            command.arg("-R").arg(path);
            spawn_detached(command)
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let folder = if path.is_dir() {
                path
            } else {
                path.parent().unwrap_or(path)
            };
            open::that_detached(folder).map_err(ExecutionError::launch_failed)
        }
    }

    fn spawn(&self, program: &str, args: &[String]) -> Result<(), ExecutionError> {
        let mut command = Command::new(program);
        command.args(args);
        spawn_detached(command)
    }
}

fn spawn_detached(mut command: Command) -> Result<(), ExecutionError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        use windows_sys::Win32::System::Threading::{CREATE_NEW_PROCESS_GROUP, DETACHED_PROCESS};
        command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // own group, so signals sent to the core's group skip launched apps
        command.process_group(0);
    }

    let mut child = command.spawn().map_err(ExecutionError::launch_failed)?;
    let pid = child.id();
    // reap in the background so finished children do not linger
    std::thread::spawn(move || match child.wait() {
        Ok(status) => debug!(pid, %status, "spawned process exited"),
        Err(error) => debug!(pid, %error, "failed to wait on spawned process"),
    });
    Ok(())
}

/// One executor per [`ExecutionArgumentKind`], sharing the shell and host
/// callbacks they act through.
#[derive(Clone)]
pub struct Executors {
    shell: Arc<dyn Shell>,
    commands: Arc<dyn AppCommands>,
}

impl Executors {
    pub fn new(shell: Arc<dyn Shell>, commands: Arc<dyn AppCommands>) -> Self {
        Self { shell, commands }
    }

    pub fn execute(
        &self,
        kind: ExecutionArgumentKind,
        argument: &str,
        cfg: &Config,
    ) -> Result<(), ExecutionError> {
        match kind {
            ExecutionArgumentKind::CommandLine => self.command_line(argument),
            ExecutionArgumentKind::InternalCommand => self.internal_command(argument),
            ExecutionArgumentKind::OsSetting => self.os_setting(argument),
            ExecutionArgumentKind::WebSearch => self.web_search(argument, cfg),
            ExecutionArgumentKind::FilePath => launch_path(self.shell.as_ref(), argument),
            ExecutionArgumentKind::WebUrl => self.web_url(argument),
        }
    }

    pub fn open_file_location(&self, path: &str) -> Result<(), ExecutionError> {
        let candidate = existing_path(path)?;
        info!(path = %candidate.display(), "revealing file location");
        self.shell.reveal(&candidate)
    }

    fn command_line(&self, argument: &str) -> Result<(), ExecutionError> {
        let body = validator::command_line_body(argument).unwrap_or_default();
        let mut tokens = tokenize_command_line(body).into_iter();
        let program = tokens.next().ok_or(ExecutionError::EmptyCommand)?;
        let args: Vec<String> = tokens.collect();
        info!(%program, arg_count = args.len(), "running command line");
        self.shell.spawn(&program, &args)
    }

    fn internal_command(&self, argument: &str) -> Result<(), ExecutionError> {
        let command = validator::internal_command(argument)
            .ok_or_else(|| ExecutionError::UnknownInternalCommand(argument.to_string()))?;
        info!(command = command.name(), "dispatching internal command");
        match command {
            InternalCommand::Reload => self.commands.reload(),
            InternalCommand::Exit => self.commands.exit(),
        }
        Ok(())
    }

    fn os_setting(&self, argument: &str) -> Result<(), ExecutionError> {
        let uri = validator::os_setting_uri(argument)
            .ok_or_else(|| ExecutionError::InvalidUrl(argument.to_string()))?;
        self.shell.open(uri)
    }

    fn web_search(&self, argument: &str, cfg: &Config) -> Result<(), ExecutionError> {
        let (search, query) = validator::match_web_search(argument, &cfg.web_searches)
            .ok_or_else(|| ExecutionError::UnknownWebSearch(argument.to_string()))?;
        let url = search.url_for(query);
        info!(search = %search.name, "opening web search");
        self.shell.open(&url)
    }

    fn web_url(&self, argument: &str) -> Result<(), ExecutionError> {
        let url = validator::web_url_target(argument)
            .ok_or_else(|| ExecutionError::InvalidUrl(argument.to_string()))?;
        self.shell.open(&url)
    }
}

/// Opens `path` with its default handler. Freedesktop entries are run from
/// their `Exec=` line instead, since handlers treat them as documents.
pub fn launch_path(shell: &dyn Shell, path: &str) -> Result<(), ExecutionError> {
    let candidate = existing_path(path)?;
    if is_desktop_entry(&candidate) {
        if let Some((program, args)) = DesktopEntry::read(&candidate).and_then(|entry| entry.command()) {
            info!(%program, entry = %candidate.display(), "launching desktop entry");
            return shell.spawn(&program, &args);
        }
    }
    shell.open(&candidate.to_string_lossy())
}

fn existing_path(path: &str) -> Result<PathBuf, ExecutionError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ExecutionError::EmptyPath);
    }

    let candidate = Path::new(trimmed);
    if !candidate.exists() {
        return Err(ExecutionError::MissingPath(candidate.to_path_buf()));
    }
    Ok(candidate.to_path_buf())
}

/// Splits a command line on whitespace, keeping double-quoted runs together.
pub fn tokenize_command_line(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted_token = false;

    for ch in input.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            quoted_token = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted_token {
                tokens.push(std::mem::take(&mut current));
            }
            quoted_token = false;
            continue;
        }

        current.push(ch);
    }

    if !current.is_empty() || quoted_token {
        tokens.push(current);
    }

    tokens
}
