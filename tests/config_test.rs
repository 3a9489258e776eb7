//! Integration tests for Settings loading with layered merge semantics.
//!
//! Files only override the keys they name. Environment variables override
//! files. These tests do not rely on a global config being absent: every
//! asserted key is set by the test itself.

use std::fs;

use tempfile::TempDir;

use shebang::config::{ErrorPolicy, RequiredPolicy, Settings};
use shebang::ShebangError;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("shebang.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn given_partial_file_when_loading_then_overrides_only_named_keys() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
default_command = "main"
error_policy = "print"
"#,
    );

    let settings = Settings::from_file(&path).expect("load settings");

    assert_eq!(settings.default_command, "main");
    assert_eq!(settings.error_policy, ErrorPolicy::Print);
    assert_eq!(settings.default_action, "index");
    assert_eq!(settings.indent, "  ");
    assert_eq!(settings.required_policy, RequiredPolicy::Enforce);
}

#[test]
fn given_custom_heading_when_loading_then_used_for_titles() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "heading = \"== {} ==\\n\"\n");

    let settings = Settings::from_file(&path).unwrap();

    assert_eq!(settings.heading("Options"), "== Options ==\n");
}

#[test]
fn given_unknown_policy_in_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "error_policy = \"explode\"\n");

    let err = Settings::from_file(&path).unwrap_err();

    assert!(matches!(err, ShebangError::Config { .. }));
    assert_eq!(err.exit_code(), shebang::exitcode::CONFIG);
}

#[test]
fn given_missing_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();

    let err = Settings::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();

    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn given_env_override_when_loading_then_env_wins_over_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
default_action = "run"
required_policy = "enforce"
"#,
    );
    std::env::set_var("SHEBANG_REQUIRED_POLICY", "ignore");
    std::env::set_var("SHEBANG_ERROR_POLICY", "print");

    let settings = Settings::load(Some(path.as_path()));
    std::env::remove_var("SHEBANG_REQUIRED_POLICY");
    std::env::remove_var("SHEBANG_ERROR_POLICY");
    let settings = settings.expect("load settings");

    assert_eq!(settings.default_action, "run");
    assert_eq!(settings.required_policy, RequiredPolicy::Ignore);
    assert_eq!(settings.error_policy, ErrorPolicy::Print);
}

#[test]
fn given_effective_settings_when_exported_then_loadable_again() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        indent: "    ".into(),
        ..Settings::default()
    };
    let path = write_config(&dir, &settings.to_toml().unwrap());

    assert_eq!(Settings::from_file(&path).unwrap(), settings);
}
