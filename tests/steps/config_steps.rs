//! Steps for formatter configuration behavioural tests.
use cucumber::{given, then, when};
use gherkin_relay::ConfigError;

use crate::world::ConfigWorld;

#[given(expr = "the environment variable {string} is {string}")]
fn given_var(world: &mut ConfigWorld, name: String, value: String) { world.set_var(&name, &value); }

#[given(expr = "the project file configures formatter {string} with output file path {string}")]
fn given_project_file(world: &mut ConfigWorld, formatter: String, output: String) {
    world.configure_in_file(&formatter, &output);
}

#[given(expr = "the REQNROLL_FORMATTERS variable configures formatter {string} with output file path {string}")]
fn given_json_var(world: &mut ConfigWorld, formatter: String, output: String) {
    let mut section = serde_json::Map::new();
    section.insert(formatter, serde_json::json!({ "outputFilePath": output }));
    world.set_var("REQNROLL_FORMATTERS", &serde_json::Value::Object(section).to_string());
}

#[when("the formatter configuration is resolved")]
fn when_resolved(world: &mut ConfigWorld) { world.resolve(); }

#[then("formatting is enabled")]
fn then_enabled(world: &mut ConfigWorld) { assert!(world.enabled()); }

#[then("formatting is disabled")]
fn then_disabled(world: &mut ConfigWorld) { assert!(!world.enabled()); }

#[then(expr = "formatter {string} has output file path {string}")]
fn then_output(world: &mut ConfigWorld, formatter: String, output: String) {
    let config = world.formatter(&formatter).expect("formatter configured");
    assert_eq!(config.output_file_path.as_deref(), Some(output.as_str()));
}

#[then(expr = "formatter {string} has no output file path")]
fn then_no_output(world: &mut ConfigWorld, formatter: String) {
    let config = world.formatter(&formatter).expect("formatter configured");
    assert_eq!(config.output_file_path, None);
}

#[then(expr = "formatter {string} is not configured")]
fn then_not_configured(world: &mut ConfigWorld, formatter: String) {
    assert!(world.formatter(&formatter).is_none());
}

#[then(expr = "resolution fails with a malformed setting for {string}")]
fn then_malformed(world: &mut ConfigWorld, expected: String) {
    match world.error() {
        ConfigError::MalformedSetting { formatter, .. } => assert_eq!(formatter, expected),
        other => panic!("unexpected error {other}"),
    }
}
