use askuno_widget::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;
use std::time::Duration;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("ASKUNO_SERVER__PORT");
        env::remove_var("ASKUNO_BACKEND__BASE_URL");
        env::remove_var("ASKUNO_WIDGET__ASSISTANT_NAME");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("BACKEND_URL");
        env::remove_var("REQUEST_TIMEOUT_SECS");
        env::remove_var("LOG_JSON");
    }
}

fn load(args: &[&str]) -> AppConfig {
    let mut argv = vec!["askuno-widget"];
    argv.extend_from_slice(args);
    AppConfig::load_from_args(argv).expect("Failed to load config")
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = load(&[]);
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
    assert_eq!(config.backend.chat_path, "/api/chat");
    assert_eq!(config.backend.request_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(config.widget.assistant_name, "Askuno");
    assert!(!config.logging.json);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("ASKUNO_SERVER__PORT", "9090");
        env::set_var("ASKUNO_WIDGET__ASSISTANT_NAME", "Helper");
    }

    let config = load(&[]);
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.widget.assistant_name, "Helper");

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("ASKUNO_SERVER__PORT", "9090");
    }

    let config = load(&[
        "--port",
        "8181",
        "--backend-url",
        "http://backend:8000",
        "--request-timeout-secs",
        "0",
    ]);
    assert_eq!(config.server.port, 8181);
    assert_eq!(config.backend.base_url, "http://backend:8000");
    assert_eq!(config.backend.request_timeout(), None);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("askuno.yaml");
    fs::write(
        &file_path,
        r#"
server:
  port: 7070
backend:
  base_url: "http://search.internal:5000"
widget:
  assistant_name: "Finder"
"#,
    )
    .expect("Failed to write temp config");

    // Tell AppConfig to use this file via Env Var (mocking CLI arg indirectly)
    unsafe {
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = load(&[]);
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.backend.base_url, "http://search.internal:5000");
    assert_eq!(config.widget.assistant_name, "Finder");
    // Untouched keys keep their defaults
    assert_eq!(config.backend.chat_path, "/api/chat");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    clear_env_vars();

    let result =
        AppConfig::load_from_args(["askuno-widget", "--config", "/nonexistent/askuno.yaml"]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_unknown_flag_is_error() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["askuno-widget", "--no-such-flag"]);
    assert!(result.is_err());
}
