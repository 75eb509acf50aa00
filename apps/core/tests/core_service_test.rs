mod common;

use std::sync::Arc;

use common::{harness, RecordingCommands, RecordingShell};
use ezr_core::config::{self, Config, ConfigError, CURRENT_VERSION};
use ezr_core::contract::{
    CoreRequest, CoreResponse, ExportSettingsRequest, ImportSettingsRequest, SearchRequest,
};
use ezr_core::core_service::{Collaborators, CoreService, ServiceError};
use ezr_core::discovery::StaticAppIndex;
use ezr_core::model::{AppEntry, ExecutionArgumentKind};
use ezr_core::notification::NullNotifier;

#[test]
fn rejects_invalid_config() {
    let config = Config {
        max_search_result_count: 0,
        ..Config::default()
    };
    let collaborators = Collaborators::new(
        Arc::new(StaticAppIndex::empty()),
        Arc::new(RecordingShell::default()),
        Arc::new(RecordingCommands::default()),
        Arc::new(NullNotifier),
    );

    let result = CoreService::new(config, "unused.json".into(), collaborators);

    assert!(matches!(
        result,
        Err(ServiceError::Config(ConfigError::Invalid(_)))
    ));
}

#[test]
fn search_reports_window_height_for_results() {
    let h = harness(Config::default(), vec![AppEntry::new("Code", "/apps/code")]);

    let empty = h.service.search("   ");
    assert!(empty.results.is_empty());
    assert_eq!(empty.window_height, 80);

    let single = h.service.search("g?cats");
    assert_eq!(single.results.len(), 1);
    assert_eq!(single.window_height, 140);
}

#[test]
fn search_never_exceeds_configured_maximum() {
    let config = Config {
        max_search_result_count: 3,
        ..Config::default()
    };
    let apps = (0..10)
        .map(|i| AppEntry::from_owned(format!("Game {i}"), format!("/games/{i}"), None))
        .collect();
    let h = harness(config, apps);

    let response = h.service.search("game");

    assert_eq!(response.results.len(), 3);
    assert_eq!(response.window_height, 80 + 3 * 60);
}

#[test]
fn execute_reports_success_as_bool() {
    let h = harness(Config::default(), Vec::new());

    assert!(h.service.execute("ezr:reload"));
    assert!(!h.service.execute("   "));
    assert_eq!(h.commands.reloads(), 1);
    assert_eq!(h.notifier.drain().len(), 1);
}

#[test]
fn search_then_execute_uses_result_argument() {
    let h = harness(Config::default(), Vec::new());

    let response = h.service.search("yt?rust talks");
    let result = &response.results[0];
    assert_eq!(result.kind, ExecutionArgumentKind::WebSearch);

    assert!(h.service.execute(&result.execution_argument));
    assert_eq!(
        h.shell.opened(),
        vec!["https://www.youtube.com/results?search_query=rust%20talks".to_string()]
    );
}

#[test]
fn export_writes_config_into_folder() {
    let h = harness(Config::default(), Vec::new());
    let target = tempfile::tempdir().unwrap();

    let response = h
        .service
        .handle_command(CoreRequest::ExportSettings(ExportSettingsRequest {
            folder: target.path().to_string_lossy().into_owned(),
        }))
        .unwrap();

    assert!(matches!(response, CoreResponse::Settings(_)));
    let exported = config::read(&target.path().join(config::CONFIG_FILE_NAME)).unwrap();
    assert_eq!(exported, Config::default());
}

#[test]
fn export_rejects_blank_folder() {
    let h = harness(Config::default(), Vec::new());

    let error = h
        .service
        .handle_command(CoreRequest::ExportSettings(ExportSettingsRequest {
            folder: "  ".to_string(),
        }))
        .unwrap_err();

    assert!(matches!(error, ServiceError::InvalidRequest(_)));
}

#[test]
fn import_merges_and_persists_settings() {
    let h = harness(Config::default(), Vec::new());
    let source = h.dir.path().join("backup.json");
    std::fs::write(
        &source,
        format!(r#"{{"version": "{CURRENT_VERSION}", "windowWidth": 640}}"#),
    )
    .unwrap();

    let response = h
        .service
        .handle_command(CoreRequest::ImportSettings(ImportSettingsRequest {
            file: source.to_string_lossy().into_owned(),
        }))
        .unwrap();

    let CoreResponse::Settings(settings) = response else {
        panic!("expected settings response");
    };
    assert_eq!(settings.config.window_width, 640);
    assert_eq!(settings.config.max_search_result_count, 8);
    assert_eq!(config::read(&h.config_path()).unwrap(), settings.config);
}

#[test]
fn import_rejects_other_major_version() {
    let h = harness(Config::default(), Vec::new());
    let source = h.dir.path().join("old.json");
    std::fs::write(&source, r#"{"version": "42.0.0"}"#).unwrap();

    let error = h
        .service
        .handle_command(CoreRequest::ImportSettings(ImportSettingsRequest {
            file: source.to_string_lossy().into_owned(),
        }))
        .unwrap_err();

    assert!(matches!(
        error,
        ServiceError::Config(ConfigError::UnsupportedVersion { .. })
    ));
    assert!(!h.config_path().exists());
}

#[test]
fn reset_writes_defaults() {
    let h = harness(Config::default(), Vec::new());
    std::fs::write(h.config_path(), "{ broken").unwrap();

    let response = h.service.handle_command(CoreRequest::ResetSettings).unwrap();

    assert_eq!(
        response,
        CoreResponse::Settings(ezr_core::contract::SettingsResponse {
            config: Config::default()
        })
    );
    assert_eq!(config::read(&h.config_path()).unwrap(), Config::default());
}

#[test]
fn search_request_round_trips_through_handle_command() {
    let h = harness(Config::default(), Vec::new());

    let response = h
        .service
        .handle_command(CoreRequest::Search(SearchRequest {
            query: "ezr:exit".to_string(),
        }))
        .unwrap();

    let CoreResponse::Search(search) = response else {
        panic!("expected search response");
    };
    assert_eq!(search.results[0].name, "Exit ezr");
    assert_eq!(h.commands.exits(), 0);
}
