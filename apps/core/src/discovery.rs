use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::action_executor::tokenize_command_line;
use crate::config::OS_SETTINGS_PREFIX;
use crate::model::AppEntry;

/// Source of installed applications. Implementations own indexing and
/// caching; `apps` is called once per keystroke and must stay cheap.
pub trait AppIndex: Send + Sync {
    fn apps(&self) -> Arc<Vec<AppEntry>>;
}

pub struct StaticAppIndex {
    apps: Arc<Vec<AppEntry>>,
}

impl StaticAppIndex {
    pub fn from_apps(apps: Vec<AppEntry>) -> Self {
        Self {
            apps: Arc::new(apps),
        }
    }

    pub fn empty() -> Self {
        Self::from_apps(Vec::new())
    }
}

impl AppIndex for StaticAppIndex {
    fn apps(&self) -> Arc<Vec<AppEntry>> {
        Arc::clone(&self.apps)
    }
}

/// Walks application folders to a bounded depth.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    roots: Vec<PathBuf>,
    max_depth: usize,
    extensions: Vec<String>,
}

impl DirectoryScanner {
    pub fn new(roots: Vec<PathBuf>, max_depth: usize, extensions: &[&str]) -> Self {
        Self {
            roots,
            max_depth,
            extensions: extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn platform_default() -> Self {
        #[cfg(target_os = "windows")]
        {
            let start_menu = Path::new("Microsoft")
                .join("Windows")
                .join("Start Menu")
                .join("Programs");
            let roots = ["ProgramData", "APPDATA"]
                .iter()
                .filter_map(|var| std::env::var_os(var))
                .map(|base| PathBuf::from(base).join(&start_menu))
                .collect();
            Self::new(roots, 4, &["lnk", "exe", "url"])
        }

        #[cfg(target_os = "macos")]
        {
            let mut roots = vec![
                PathBuf::from("/Applications"),
                PathBuf::from("/System/Applications"),
            ];
            if let Some(home) = dirs::home_dir() {
                roots.push(home.join("Applications"));
            }
            Self::new(roots, 2, &["app"])
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let mut roots = vec![
                PathBuf::from("/usr/share/applications"),
                PathBuf::from("/usr/local/share/applications"),
                PathBuf::from("/var/lib/flatpak/exports/share/applications"),
            ];
            if let Some(data) = dirs::data_dir() {
                roots.push(data.join("applications"));
            }
            Self::new(roots, 2, &["desktop"])
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn scan(&self) -> Vec<AppEntry> {
        let mut seen = BTreeSet::new();
        let mut apps = Vec::new();

        for root in &self.roots {
            let mut walker = WalkDir::new(root)
                .max_depth(self.max_depth)
                .follow_links(false)
                .into_iter();

            while let Some(next) = walker.next() {
                let entry = match next {
                    Ok(entry) => entry,
                    Err(error) => {
                        debug!(root = %root.display(), %error, "skipping unreadable entry");
                        continue;
                    }
                };
                if entry.depth() == 0 || !self.has_app_extension(entry.path()) {
                    continue;
                }
                if entry.file_type().is_dir() {
                    // bundles such as Foo.app are launched whole
                    walker.skip_current_dir();
                }

                let Some(name) = display_name(entry.path()) else {
                    continue;
                };
                let path = entry.path().to_string_lossy().into_owned();
                if seen.insert((name.to_lowercase(), path.clone())) {
                    apps.push(AppEntry::from_owned(name, path, None));
                }
            }
        }

        apps.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.path.cmp(&b.path))
        });
        apps
    }

    fn has_app_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

fn display_name(path: &Path) -> Option<String> {
    if is_desktop_entry(path) {
        return DesktopEntry::read(path).map(|entry| entry.name);
    }

    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

pub fn is_desktop_entry(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("desktop"))
}

/// The `[Desktop Entry]` group of a freedesktop `.desktop` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    pub name: String,
    pub exec: Option<String>,
}

impl DesktopEntry {
    pub fn read(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// `None` for entries marked `NoDisplay` or `Hidden`, or without a name.
    pub fn parse(content: &str) -> Option<Self> {
        let mut name = None;
        let mut exec = None;
        let mut in_main_group = false;

        for line in content.lines().map(str::trim) {
            if line.starts_with('[') {
                in_main_group = line == "[Desktop Entry]";
                continue;
            }
            if !in_main_group {
                continue;
            }
            if line.eq_ignore_ascii_case("NoDisplay=true") || line.eq_ignore_ascii_case("Hidden=true") {
                return None;
            }
            if let Some(value) = line.strip_prefix("Name=") {
                name.get_or_insert_with(|| value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("Exec=") {
                exec.get_or_insert_with(|| value.trim().to_string());
            }
        }

        let name = name.filter(|value| !value.is_empty())?;
        Some(Self {
            name,
            exec: exec.filter(|value| !value.is_empty()),
        })
    }

    /// Program and arguments from `Exec=`, with `%f`-style field codes
    /// removed and `%%` unescaped.
    pub fn command(&self) -> Option<(String, Vec<String>)> {
        let exec = self.exec.as_deref()?;
        let mut tokens = tokenize_command_line(exec)
            .into_iter()
            .filter_map(|token| strip_field_codes(&token))
            .filter(|token| !token.is_empty());
        let program = tokens.next()?;
        Some((program, tokens.collect()))
    }
}

/// `None` when the whole token is a field code such as `%U`.
fn strip_field_codes(token: &str) -> Option<String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    let mut had_code = false;
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(_) => had_code = true,
            None => {}
        }
    }
    (!(had_code && out.is_empty())).then_some(out)
}

/// Refreshable snapshot of scanned applications.
pub struct AppCatalog {
    scanner: DirectoryScanner,
    snapshot: RwLock<Arc<Vec<AppEntry>>>,
}

impl AppCatalog {
    pub fn new(scanner: DirectoryScanner) -> Self {
        Self {
            scanner,
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Rescans and swaps in the new snapshot. Returns the number of apps.
    pub fn refresh(&self) -> usize {
        let apps = self.scanner.scan();
        let count = apps.len();
        match self.snapshot.write() {
            Ok(mut snapshot) => *snapshot = Arc::new(apps),
            Err(_) => warn!("app catalog lock poisoned; keeping previous snapshot"),
        }
        debug!(count, "app catalog refreshed");
        count
    }

    /// Rescans every `interval` on a background thread until `stop` is set.
    pub fn spawn_rescan(
        self: &Arc<Self>,
        interval: Duration,
        stop: Arc<AtomicBool>,
    ) -> std::io::Result<JoinHandle<()>> {
        let catalog = Arc::clone(self);
        info!(interval_secs = interval.as_secs(), "starting app rescan thread");
        std::thread::Builder::new()
            .name("ezr-app-rescan".to_string())
            .spawn(move || loop {
                std::thread::sleep(interval);
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                catalog.refresh();
            })
    }
}

impl AppIndex for AppCatalog {
    fn apps(&self) -> Arc<Vec<AppEntry>> {
        match self.snapshot.read() {
            Ok(snapshot) => Arc::clone(&snapshot),
            Err(_) => Arc::new(Vec::new()),
        }
    }
}

pub const WINDOWS_SETTINGS: &[(&str, &str)] = &[
    ("Display", "ms-settings:display"),
    ("Sound", "ms-settings:sound"),
    ("Notifications & actions", "ms-settings:notifications"),
    ("Power & sleep", "ms-settings:powersleep"),
    ("Storage", "ms-settings:storagesense"),
    ("Bluetooth & other devices", "ms-settings:bluetooth"),
    ("Printers & scanners", "ms-settings:printers"),
    ("Mouse", "ms-settings:mousetouchpad"),
    ("Network status", "ms-settings:network-status"),
    ("Wi-Fi", "ms-settings:network-wifi"),
    ("VPN", "ms-settings:network-vpn"),
    ("Background", "ms-settings:personalization-background"),
    ("Colors", "ms-settings:colors"),
    ("Lock screen", "ms-settings:lockscreen"),
    ("Apps & features", "ms-settings:appsfeatures"),
    ("Default apps", "ms-settings:defaultapps"),
    ("Date & time", "ms-settings:dateandtime"),
    ("Region & language", "ms-settings:regionlanguage"),
    ("Windows Update", "ms-settings:windowsupdate"),
    ("About", "ms-settings:about"),
];

pub fn settings_entries(settings: &[(&str, &str)]) -> Vec<AppEntry> {
    settings
        .iter()
        .map(|(name, uri)| AppEntry::new(name, &format!("{OS_SETTINGS_PREFIX}{uri}")))
        .collect()
}

/// Named OS settings offered in fuzzy search on this platform.
pub fn os_settings_entries() -> Vec<AppEntry> {
    if cfg!(target_os = "windows") {
        settings_entries(WINDOWS_SETTINGS)
    } else {
        Vec::new()
    }
}
