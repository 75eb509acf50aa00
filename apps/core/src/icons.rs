use crate::model::ExecutionArgumentKind;

/// Icon lookup used when building search results. Icons are opaque
/// references the UI knows how to render.
pub trait IconProvider: Send + Sync {
    fn icon_for(&self, kind: ExecutionArgumentKind, argument: &str) -> String;
    fn search_icon(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StaticIcons;

impl IconProvider for StaticIcons {
    fn icon_for(&self, kind: ExecutionArgumentKind, argument: &str) -> String {
        let icon = match kind {
            ExecutionArgumentKind::CommandLine => "terminal",
            ExecutionArgumentKind::InternalCommand => "ezr",
            ExecutionArgumentKind::OsSetting => "settings",
            ExecutionArgumentKind::WebSearch => "search",
            ExecutionArgumentKind::WebUrl => "web",
            ExecutionArgumentKind::FilePath if std::path::Path::new(argument).is_dir() => "folder",
            ExecutionArgumentKind::FilePath => "file",
        };
        icon.to_string()
    }

    fn search_icon(&self) -> String {
        "search".to_string()
    }
}
