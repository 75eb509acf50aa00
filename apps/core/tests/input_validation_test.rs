use std::sync::Arc;

use ezr_core::config::Config;
use ezr_core::discovery::{settings_entries, StaticAppIndex};
use ezr_core::icons::StaticIcons;
use ezr_core::index_store::UsageStore;
use ezr_core::input_validation::{InputValidationService, EMPTY_COMMAND_NAME};
use ezr_core::model::{AppEntry, ExecutionArgumentKind, SearchResult, WebSearch};

fn resolver_with(config: Config, apps: Vec<AppEntry>) -> InputValidationService {
    InputValidationService::new(
        Arc::new(config),
        Arc::new(StaticAppIndex::from_apps(apps)),
        Arc::new(StaticIcons),
    )
    .with_os_settings(Vec::new())
}

fn resolver(apps: Vec<AppEntry>) -> InputValidationService {
    resolver_with(Config::default(), apps)
}

fn kinds(results: &[SearchResult]) -> Vec<ExecutionArgumentKind> {
    results.iter().map(|result| result.kind).collect()
}

#[test]
fn blank_input_yields_no_results() {
    let service = resolver(vec![AppEntry::new("Code", "/apps/code")]);
    assert!(service.get_search_result("").is_empty());
    assert!(service.get_search_result("   \t").is_empty());
}

#[test]
fn bare_command_prefix_yields_placeholder() {
    let results = resolver(Vec::new()).get_search_result(">");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].kind, ExecutionArgumentKind::CommandLine);
    assert_eq!(results[0].name, EMPTY_COMMAND_NAME);
    assert_eq!(results[0].execution_argument, ">");
}

#[test]
fn command_line_input_is_a_single_result() {
    let apps = vec![AppEntry::new("ls helper", "/apps/ls")];
    let results = resolver(apps).get_search_result("  > ls -la ");

    assert_eq!(kinds(&results), vec![ExecutionArgumentKind::CommandLine]);
    assert_eq!(results[0].name, "ls -la");
    assert_eq!(results[0].execution_argument, "> ls -la");
    assert_eq!(results[0].icon, "terminal");
}

#[test]
fn web_search_trigger_resolves_directly() {
    let results = resolver(Vec::new()).get_search_result("g?cats");

    assert_eq!(kinds(&results), vec![ExecutionArgumentKind::WebSearch]);
    assert_eq!(results[0].name, "Search Google for 'cats'");
    assert_eq!(results[0].execution_argument, "g?cats");
    assert_eq!(results[0].icon, "google");
}

#[test]
fn each_trigger_addresses_its_own_search() {
    let results = resolver(Vec::new()).get_search_result("gi?cats");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Search Google Images for 'cats'");
}

#[test]
fn command_line_outranks_conflicting_web_search_prefix() {
    let mut config = Config::default();
    config
        .web_searches
        .push(WebSearch::new(">", "Shell Docs", "https://example.com/?q=", "web"));

    let results = resolver_with(config, Vec::new()).get_search_result(">?x");

    assert_eq!(kinds(&results), vec![ExecutionArgumentKind::CommandLine]);
}

#[test]
fn internal_commands_resolve_by_name() {
    let service = resolver(Vec::new());

    let reload = service.get_search_result("ezr:reload");
    assert_eq!(kinds(&reload), vec![ExecutionArgumentKind::InternalCommand]);
    assert_eq!(reload[0].name, "Reload ezr");

    let exit = service.get_search_result("ezr:EXIT");
    assert_eq!(exit[0].name, "Exit ezr");
}

#[test]
fn unknown_internal_command_falls_through_to_fuzzy_search() {
    let results = resolver(Vec::new()).get_search_result("ezr:nope");
    assert!(results
        .iter()
        .all(|result| result.kind != ExecutionArgumentKind::InternalCommand));
}

#[test]
fn os_setting_uri_uses_known_display_name() {
    let service = InputValidationService::new(
        Arc::new(Config::default()),
        Arc::new(StaticAppIndex::empty()),
        Arc::new(StaticIcons),
    )
    .with_os_settings(settings_entries(&[("Display", "ms-settings:display")]));

    let results = service.get_search_result("win:ms-settings:display");

    assert_eq!(kinds(&results), vec![ExecutionArgumentKind::OsSetting]);
    assert_eq!(results[0].name, "Display");
}

#[test]
fn absolute_existing_path_resolves_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, b"hello").unwrap();
    let input = file.to_string_lossy().into_owned();

    let results = resolver(Vec::new()).get_search_result(&input);

    assert_eq!(kinds(&results), vec![ExecutionArgumentKind::FilePath]);
    assert_eq!(results[0].name, "notes.txt");
    assert_eq!(results[0].icon, "file");
}

#[test]
fn urls_resolve_directly() {
    let service = resolver(Vec::new());

    let full = service.get_search_result("https://example.com/docs");
    assert_eq!(kinds(&full), vec![ExecutionArgumentKind::WebUrl]);

    let bare = service.get_search_result("example.com");
    assert_eq!(kinds(&bare), vec![ExecutionArgumentKind::WebUrl]);
    assert_eq!(bare[0].execution_argument, "example.com");
}

#[test]
fn fuzzy_results_rank_apps_and_respect_limit() {
    let config = Config {
        max_search_result_count: 2,
        ..Config::default()
    };
    let apps = vec![
        AppEntry::new("Codeium", "/apps/codeium"),
        AppEntry::new("Code", "/apps/code"),
        AppEntry::new("Code Runner", "/apps/runner"),
        AppEntry::new("Calculator", "/apps/calc"),
    ];

    let results = resolver_with(config, apps).get_search_result("code");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].name, "Code");
    assert!(results
        .iter()
        .all(|result| result.kind == ExecutionArgumentKind::FilePath));
}

#[test]
fn fuzzy_phase_suggests_matching_web_searches() {
    let results = resolver(Vec::new()).get_search_result("G");

    let suggestions: Vec<(&str, &str)> = results
        .iter()
        .map(|result| (result.name.as_str(), result.execution_argument.as_str()))
        .collect();
    assert_eq!(
        suggestions,
        vec![("Google (g?)", "g?"), ("Google Images (gi?)", "gi?")]
    );
    assert!(results
        .iter()
        .all(|result| result.kind == ExecutionArgumentKind::WebSearch));
}

#[test]
fn os_settings_join_fuzzy_ranking_when_enabled() {
    let settings = settings_entries(&[("Display", "ms-settings:display")]);
    let apps = vec![AppEntry::new("Display Calibrator", "/apps/calibrate")];

    let enabled = resolver(apps.clone())
        .with_os_settings(settings.clone())
        .get_search_result("display");
    assert_eq!(
        kinds(&enabled),
        vec![ExecutionArgumentKind::OsSetting, ExecutionArgumentKind::FilePath]
    );
    assert_eq!(enabled[0].execution_argument, "win:ms-settings:display");

    let disabled_config = Config {
        search_operating_system_settings: false,
        ..Config::default()
    };
    let disabled = resolver_with(disabled_config, apps)
        .with_os_settings(settings)
        .get_search_result("display");
    assert_eq!(kinds(&disabled), vec![ExecutionArgumentKind::FilePath]);
}

#[test]
fn launch_history_lifts_frequent_apps() {
    let store = Arc::new(UsageStore::open_memory().unwrap());
    for at in 0..5 {
        store.record_launch("/apps/notes-b", at).unwrap();
    }
    let apps = vec![
        AppEntry::new("Notes A", "/apps/notes-a"),
        AppEntry::new("Notes B", "/apps/notes-b"),
    ];

    let results = resolver(apps)
        .with_usage_store(store)
        .get_search_result("notes");

    assert_eq!(results[0].name, "Notes B");
    assert_eq!(results[1].name, "Notes A");
}

#[test]
fn auto_complete_appends_separator_for_directories() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("projects");
    std::fs::create_dir(&sub).unwrap();
    let file = dir.path().join("todo.txt");
    std::fs::write(&file, b"x").unwrap();

    let service = resolver(Vec::new()).with_directory_separator('/');
    let user_input = dir.path().to_string_lossy().into_owned();

    let completed = service
        .auto_complete(&user_input, &sub.to_string_lossy())
        .unwrap();
    assert!(completed.ends_with("projects/"));

    let completed_file = service
        .auto_complete(&user_input, &file.to_string_lossy())
        .unwrap();
    assert_eq!(completed_file, file.to_string_lossy());

    assert_eq!(service.auto_complete("not a path", "whatever"), None);
}

#[test]
fn missing_absolute_path_falls_through_to_fuzzy_search() {
    let apps = vec![AppEntry::new("No Such App", "/apps/nosuchapp")];

    let results = resolver(apps).get_search_result("/nosuchapp");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "No Such App");
    assert_eq!(results[0].kind, ExecutionArgumentKind::FilePath);
    assert_eq!(results[0].execution_argument, "/apps/nosuchapp");
}

#[test]
fn dotted_input_resolves_as_url_before_apps() {
    let apps = vec![AppEntry::new("Node.js", "/apps/node")];

    let results = resolver(apps).get_search_result("node.js");

    assert_eq!(kinds(&results), vec![ExecutionArgumentKind::WebUrl]);
    assert_eq!(results[0].execution_argument, "node.js");
}
