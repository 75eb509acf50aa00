use serde::{Deserialize, Serialize};

/// Every interpretation an execution argument can have once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionArgumentKind {
    CommandLine,
    InternalCommand,
    OsSetting,
    WebSearch,
    FilePath,
    WebUrl,
}

impl ExecutionArgumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommandLine => "command_line",
            Self::InternalCommand => "internal_command",
            Self::OsSetting => "os_setting",
            Self::WebSearch => "web_search",
            Self::FilePath => "file_path",
            Self::WebUrl => "web_url",
        }
    }
}

/// Commands handled by the host application rather than the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalCommand {
    Reload,
    Exit,
}

impl InternalCommand {
    pub const ALL: [InternalCommand; 2] = [InternalCommand::Reload, InternalCommand::Exit];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "reload" => Some(Self::Reload),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Reload => "reload",
            Self::Exit => "exit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub name: String,
    pub execution_argument: String,
    pub icon: String,
    pub kind: ExecutionArgumentKind,
}

impl SearchResult {
    pub fn new(
        name: impl Into<String>,
        execution_argument: impl Into<String>,
        icon: impl Into<String>,
        kind: ExecutionArgumentKind,
    ) -> Self {
        Self {
            name: name.into(),
            execution_argument: execution_argument.into(),
            icon: icon.into(),
            kind,
        }
    }
}

/// A configured search shortcut such as `g?cats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearch {
    pub prefix: String,
    pub name: String,
    pub url: String,
    pub icon: String,
}

impl WebSearch {
    pub fn new(prefix: &str, name: &str, url: &str, icon: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            icon: icon.to_string(),
        }
    }

    /// The leading text an argument must carry to address this search.
    pub fn trigger(&self, separator: &str) -> String {
        format!("{}{}", self.prefix, separator)
    }

    pub fn url_for(&self, query: &str) -> String {
        format!("{}{}", self.url, urlencoding::encode(query))
    }
}

/// An installed application as reported by an app index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub name: String,
    pub path: String,
    pub icon: Option<String>,
    normalized_name: String,
}

impl AppEntry {
    pub fn new(name: &str, path: &str) -> Self {
        Self::from_owned(name.to_string(), path.to_string(), None)
    }

    pub fn from_owned(name: String, path: String, icon: Option<String>) -> Self {
        let normalized_name = normalize_for_search(&name);
        Self {
            name,
            path,
            icon,
            normalized_name,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }
}

pub fn normalize_for_search(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}
