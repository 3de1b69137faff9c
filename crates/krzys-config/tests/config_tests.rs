// SPDX-FileCopyrightText: 2026 Krzys Comm Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use krzys_config::diagnostic::ConfigError;
use krzys_config::model::KrzysConfig;
use krzys_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[server]
host = "127.0.0.1"
port = 8080
frontend_dir = "/srv/krzys/frontend"

[storage]
database_path = "/tmp/test.db"
wal_mode = false
busy_timeout_ms = 250

[logging]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert_eq!(
        config.server.frontend_dir.as_deref(),
        Some("/srv/krzys/frontend")
    );
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.busy_timeout_ms, 250);
    assert_eq!(config.logging.level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.storage.database_path, "krzys.db");
    assert_eq!(config.logging.level, "info");
}

/// Unknown field in [server] is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_server_produces_error() {
    let toml = r#"
[server]
prot = 9000
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("prot"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[agent]
name = "x"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("agent"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// The diagnostic for a typo carries the suggestion and the valid keys.
#[test]
fn diagnostic_prot_suggests_port() {
    let toml = r#"
[server]
prot = 9000
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "prot"
                && suggestion.as_deref() == Some("port")
                && valid_keys.contains("frontend_dir")
        })
    });
    assert!(found, "expected UnknownKey for `prot`, got: {errors:?}");
}

/// A string where a number is expected is reported as a type error.
#[test]
fn diagnostic_invalid_type() {
    let toml = r#"
[server]
port = "eighty"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))),
        "expected InvalidType for server.port, got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_runs_after_parse() {
    let toml = r#"
[logging]
level = "chatty"
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown level should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("logging.level"))
    }));
}

/// ConfigError renders with miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "prot".to_string(),
        suggestion: Some("port".to_string()),
        valid_keys: "host, port, frontend_dir".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().expect("should have help").to_string();
    assert!(help.contains("did you mean `port`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("prot"));
}

/// An explicit config file is loaded and validated.
#[test]
fn load_and_validate_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("explicit.toml");
    std::fs::write(&path, "[server]\nport = 8123\n").unwrap();

    let config: KrzysConfig = load_and_validate_path(&path).expect("file should validate");
    assert_eq!(config.server.port, 8123);
}

/// An explicit config file that does not exist is an error.
#[test]
fn missing_explicit_file_is_rejected() {
    let errors = load_and_validate_path(std::path::Path::new("/nonexistent/krzys.toml"))
        .expect_err("missing explicit file should fail");
    assert!(matches!(&errors[0], ConfigError::Other(message) if message.contains("does not exist")));
}
