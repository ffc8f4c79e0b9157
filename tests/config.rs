//! Resolution of formatter configuration across all sources.

use std::{fs, sync::Arc};

use gherkin_relay::config::{
    ConfigError,
    ConfigResolver,
    EnvJsonConfigResolver,
    FileConfigResolver,
    FormattersConfigProvider,
    HostConfigResolver,
    MapEnvironment,
    PlaceholderResolver,
};
use rstest::{fixture, rstest};
use serde_json::json;
use tempfile::TempDir;

#[fixture]
fn project() -> TempDir { TempDir::new().expect("temp dir") }

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("reqnroll.json");
    fs::write(&path, contents).expect("write config");
    path
}

fn provider(env: MapEnvironment, file: Option<std::path::PathBuf>, host: HostConfigResolver) -> FormattersConfigProvider {
    FormattersConfigProvider::standard(Arc::new(env), file, host)
}

#[rstest]
fn later_source_wins(project: TempDir) {
    let file = write_config(&project, r#"{"formatters":{"html":{"outputFilePath":"a"}}}"#);
    let env = MapEnvironment::new().with("REQNROLL_FORMATTERS", r#"{"html":{"outputFilePath":"b"}}"#);
    let provider = provider(env, Some(file), HostConfigResolver::default());

    let html = provider
        .formatter_configuration("html")
        .expect("resolves")
        .expect("html enabled");
    assert_eq!(html.output_file_path.as_deref(), Some("b"));
}

#[test]
fn two_json_sources_merge_in_precedence_order() {
    let dir = TempDir::new().expect("temp dir");
    let file = write_config(&dir, r#"{"formatters":{"html":{"outputFilePath":"a"}}}"#);
    let env = Arc::new(MapEnvironment::new().with("REQNROLL_FORMATTERS", r#"{"html":{"outputFilePath":"b"}}"#));
    let resolvers: Vec<Box<dyn ConfigResolver>> = vec![
        Box::new(FileConfigResolver::new(file)),
        Box::new(EnvJsonConfigResolver::new(env.clone())),
    ];
    let provider = FormattersConfigProvider::new(
        resolvers,
        env.clone(),
        Arc::new(PlaceholderResolver::from_environment(env)),
    );
    let config = provider.configuration().expect("resolves");
    assert_eq!(config.get("html"), json!({"outputFilePath": "b"}).as_object());
}

#[rstest]
#[case::settings("theme=light", Some(json!("light")))]
#[case::bare_enable("true", None)]
fn later_source_replaces_file_settings(
    project: TempDir,
    #[case] value: &str,
    #[case] theme: Option<serde_json::Value>,
) {
    let file = write_config(
        &project,
        r#"{"formatters":{"html":{"outputFilePath":"report.html","theme":"dark"}}}"#,
    );
    let env = MapEnvironment::new().with("REQNROLL_FORMATTERS_HTML", value);
    let provider = provider(env, Some(file), HostConfigResolver::default());

    let html = provider
        .formatter_configuration("html")
        .expect("resolves")
        .expect("html enabled");
    assert_eq!(html.output_file_path, None);
    assert_eq!(html.setting("theme"), theme.as_ref());
}

#[test]
fn key_value_setting_enables_formatter() {
    let env = MapEnvironment::new().with("REQNROLL_FORMATTERS_HTML", "outputFilePath=out.html");
    let provider = provider(env, None, HostConfigResolver::default());

    assert!(provider.enabled().expect("resolves"));
    let html = provider
        .formatter_configuration("html")
        .expect("resolves")
        .expect("html enabled");
    assert_eq!(html.output_file_path.as_deref(), Some("out.html"));
}

#[rstest]
fn key_value_false_disables_configured_formatter(project: TempDir) {
    let file = write_config(&project, r#"{"formatters":{"html":{},"message":{}}}"#);
    let env = MapEnvironment::new().with("REQNROLL_FORMATTERS_HTML", "false");
    let provider = provider(env, Some(file), HostConfigResolver::default());

    assert!(provider.formatter_configuration("html").expect("resolves").is_none());
    assert!(provider.formatter_configuration("message").expect("resolves").is_some());
}

#[test]
fn malformed_key_value_setting_fails_fast() {
    let env = MapEnvironment::new().with("REQNROLL_FORMATTERS_HTML", "outputFilePath=a.html;verbose");
    let provider = provider(env, None, HostConfigResolver::default());

    let err = provider.enabled().expect_err("malformed setting");
    assert!(matches!(err, ConfigError::MalformedSetting { .. }));
    assert_eq!(provider.formatter_configuration("html").expect_err("memoized"), err);
}

#[test]
fn host_parameters_have_the_last_word() {
    let env = MapEnvironment::new().with("REQNROLL_FORMATTERS_HTML", "outputFilePath=env.html");
    let host = HostConfigResolver::new([("html", r"outputFilePath:host.html")]);
    let provider = provider(env, None, host);

    let html = provider
        .formatter_configuration("html")
        .expect("resolves")
        .expect("html enabled");
    assert_eq!(html.output_file_path.as_deref(), Some("host.html"));
}

#[rstest]
#[case("true", false)]
#[case("TRUE", false)]
#[case("false", true)]
#[case("yes", true)]
fn global_disable_flag(#[case] flag: &str, #[case] expect_enabled: bool) {
    let env = MapEnvironment::new()
        .with("REQNROLL_FORMATTERS_HTML", "true")
        .with("REQNROLL_FORMATTERS_DISABLED", flag);
    let provider = provider(env, None, HostConfigResolver::default());

    assert_eq!(provider.enabled().expect("resolves"), expect_enabled);
    assert_eq!(
        provider.formatter_configuration("html").expect("resolves").is_some(),
        expect_enabled
    );
    assert!(provider.configuration().expect("resolves").get("disabled").is_none());
}

#[rstest]
fn invalid_project_file_is_ignored(project: TempDir) {
    let file = write_config(&project, "{ not json");
    let env = MapEnvironment::new().with("REQNROLL_FORMATTERS_MESSAGE", "true");
    let provider = provider(env, Some(file), HostConfigResolver::default());

    let names: Vec<&str> = provider.configuration().expect("resolves").formatter_names().collect();
    assert_eq!(names, ["message"]);
}
