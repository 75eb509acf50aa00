//! Predicates deciding whether a raw execution argument qualifies as a given
//! [`ExecutionArgumentKind`]. All of them are side-effect free; the file path
//! check is the only one touching the filesystem and it never fails loudly.

use std::fs;
use std::path::Path;

use url::Url;

use crate::config::{
    Config, COMMAND_LINE_PREFIX, INTERNAL_COMMAND_PREFIX, OS_SETTINGS_PREFIX,
    WEB_SEARCH_SEPARATOR,
};
use crate::model::{ExecutionArgumentKind, InternalCommand, WebSearch};

/// Fixed priority in which direct classifications are tried. The first kind
/// whose predicate accepts an argument wins.
pub const DIRECT_ORDER: [ExecutionArgumentKind; 6] = [
    ExecutionArgumentKind::CommandLine,
    ExecutionArgumentKind::InternalCommand,
    ExecutionArgumentKind::OsSetting,
    ExecutionArgumentKind::WebSearch,
    ExecutionArgumentKind::FilePath,
    ExecutionArgumentKind::WebUrl,
];

pub fn classify(argument: &str, cfg: &Config) -> Option<ExecutionArgumentKind> {
    DIRECT_ORDER
        .into_iter()
        .find(|kind| is_valid_for_execution(*kind, argument, cfg))
}

pub fn is_valid_for_execution(kind: ExecutionArgumentKind, argument: &str, cfg: &Config) -> bool {
    match kind {
        ExecutionArgumentKind::CommandLine => is_command_line(argument),
        ExecutionArgumentKind::InternalCommand => internal_command(argument).is_some(),
        ExecutionArgumentKind::OsSetting => os_setting_uri(argument).is_some(),
        ExecutionArgumentKind::WebSearch => match_web_search(argument, &cfg.web_searches).is_some(),
        ExecutionArgumentKind::FilePath => is_file_path(argument),
        ExecutionArgumentKind::WebUrl => web_url_target(argument).is_some(),
    }
}

pub fn is_command_line(argument: &str) -> bool {
    argument.starts_with(COMMAND_LINE_PREFIX)
}

/// The text after the command line prefix, trimmed. Empty when nothing was
/// typed yet.
pub fn command_line_body(argument: &str) -> Option<&str> {
    argument.strip_prefix(COMMAND_LINE_PREFIX).map(str::trim)
}

pub fn internal_command(argument: &str) -> Option<InternalCommand> {
    argument
        .strip_prefix(INTERNAL_COMMAND_PREFIX)
        .and_then(InternalCommand::parse)
}

pub fn os_setting_uri(argument: &str) -> Option<&str> {
    let uri = argument.strip_prefix(OS_SETTINGS_PREFIX)?.trim();
    if uri.is_empty() {
        None
    } else {
        Some(uri)
    }
}

/// Finds the web search addressed by `argument` and returns it together with
/// the query text. When several triggers match, the longest one is used.
pub fn match_web_search<'a, 'b>(
    argument: &'b str,
    searches: &'a [WebSearch],
) -> Option<(&'a WebSearch, &'b str)> {
    searches
        .iter()
        .filter_map(|search| {
            let trigger = search.trigger(WEB_SEARCH_SEPARATOR);
            argument
                .strip_prefix(trigger.as_str())
                .map(|query| (trigger.len(), search, query))
        })
        .max_by_key(|(trigger_len, _, _)| *trigger_len)
        .map(|(_, search, query)| (search, query.trim()))
}

/// True for absolute paths that can be stat'ed. Relative paths are rejected
/// so bare words never resolve against the working directory.
pub fn is_file_path(argument: &str) -> bool {
    let path = Path::new(argument);
    path.is_absolute() && fs::metadata(path).is_ok()
}

/// The URL to open for `argument`, if it is an http(s) URL or looks like a
/// bare domain such as `example.com/docs`.
///
/// Any dotted word with an alphabetic last label counts as a domain, so
/// `node.js` opens `https://node.js` rather than reaching the app ranking.
pub fn web_url_target(argument: &str) -> Option<String> {
    if argument.is_empty() || argument.chars().any(char::is_whitespace) {
        return None;
    }

    if argument.contains("://") {
        let url = Url::parse(argument).ok()?;
        let has_host = url.host_str().is_some_and(|host| !host.is_empty());
        return (matches!(url.scheme(), "http" | "https") && has_host)
            .then(|| argument.to_string());
    }

    let host = argument.split('/').next().unwrap_or_default();
    if !is_bare_domain(host) {
        return None;
    }
    let candidate = format!("https://{argument}");
    Url::parse(&candidate).ok().map(|_| candidate)
}

fn is_bare_domain(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld = labels[labels.len() - 1];
    labels_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
