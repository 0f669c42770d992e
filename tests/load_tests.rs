//! Integration tests for layered loading.
//!
//! Covers the precedence chain (defaults < file < environment), environment
//! key normalization, the comma hook and failure handling.

use layered_config::{
    DefaultKeyTransform, ErrorCode, KeyTransform, LoadError, LoadOptions, load, load_with_env,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Application {
    name: String,
    port: u16,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct DbOptions {
    max_conn_size: i32,
    max_thread_count: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Db {
    user: String,
    password: String,
    host: String,
    port: u16,
    options: DbOptions,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Config {
    debug: bool,
    application: Application,
    #[serde(rename = "db")]
    database: Db,
}

fn options() -> LoadOptions {
    LoadOptions::new("QUICK_")
        .with_separator("__")
        .with_delimiter(".")
}

fn default_config() -> Config {
    Config {
        debug: true,
        application: Application {
            name: "my app".into(),
            port: 8080,
        },
        database: Db {
            host: "localhost".into(),
            options: DbOptions {
                max_thread_count: 22,
                ..DbOptions::default()
            },
            ..Db::default()
        },
    }
}

fn no_env() -> Vec<(String, String)> {
    Vec::new()
}

/// Write a YAML file into a fresh temp dir.
fn write_yaml(content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("tmp");
    let path = temp.path().join("config.yml");
    fs::write(&path, content).expect("write");
    (temp, path)
}

#[test]
fn test_defaults_only() {
    let mut cfg = Config::default();
    load_with_env(&options(), &mut cfg, Some(&default_config()), no_env()).unwrap();
    assert_eq!(cfg, default_config());
}

#[test]
fn test_file_overrides_defaults() {
    let (_temp, path) = write_yaml(
        r#"debug: false
db:
  host: postgres.quick.club
  options:
    max_thread_count: 35
"#,
    );

    let mut cfg = Config::default();
    load_with_env(
        &options().with_yaml_file(&path),
        &mut cfg,
        Some(&default_config()),
        no_env(),
    )
    .unwrap();

    let mut expected = default_config();
    expected.debug = false;
    expected.database.host = "postgres.quick.club".into();
    expected.database.options.max_thread_count = 35;
    assert_eq!(cfg, expected);
    assert_eq!(cfg.application.name, "my app");
}

#[test]
fn test_environment_overrides_defaults() {
    let mut cfg = Config::default();
    load_with_env(
        &options(),
        &mut cfg,
        Some(&default_config()),
        vec![("QUICK_DB__OPTIONS__MAX_THREAD_COUNT", "65")],
    )
    .unwrap();

    let mut expected = default_config();
    expected.database.options.max_thread_count = 65;
    assert_eq!(cfg, expected);
}

#[test]
fn test_precedence_chain() {
    let (_temp, path) = write_yaml("application:\n  port: 9000\n  name: from file\n");

    let mut cfg = Config::default();
    load_with_env(
        &options().with_yaml_file(&path),
        &mut cfg,
        Some(&default_config()),
        vec![("QUICK_APPLICATION__PORT", "9100")],
    )
    .unwrap();

    // env beats file, file beats defaults
    assert_eq!(cfg.application.port, 9100);
    assert_eq!(cfg.application.name, "from file");
    assert_eq!(cfg.database.host, "localhost");
}

#[test]
fn test_unrelated_variables_ignored() {
    let mut cfg = Config::default();
    load_with_env(
        &options(),
        &mut cfg,
        Some(&default_config()),
        vec![
            ("CHAT_DEBUG", "false"),
            ("quick_debug", "false"),
            ("QUICK_UNKNOWN__FIELD", "whatever"),
        ],
    )
    .unwrap();
    assert_eq!(cfg, default_config());
}

#[test]
fn test_key_normalization() {
    let transform = DefaultKeyTransform::from_options(&options());
    assert_eq!(transform.transform("QUICK_APPLICATION__PORT"), "application.port");
    assert_eq!(
        transform.transform("QUICK_DB__OPTIONS__MAX_THREAD_COUNT"),
        "db.options.max_thread_count"
    );
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Cors {
    allow_origins: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct HttpServer {
    port: u16,
    cors: Cors,
}

#[test]
fn test_comma_hook_round_trip() {
    let mut first = HttpServer::default();
    load_with_env(
        &LoadOptions::new("HTTP_"),
        &mut first,
        None,
        vec![("HTTP_CORS__ALLOW_ORIGINS", "a,b,c")],
    )
    .unwrap();
    assert_eq!(first.cors.allow_origins, vec!["a", "b", "c"]);

    let mut second = HttpServer::default();
    load_with_env(&LoadOptions::new("HTTP_"), &mut second, Some(&first), no_env()).unwrap();
    assert_eq!(second, first);
}

#[test]
fn test_file_sequence_replaces_default_list() {
    let (_temp, path) = write_yaml("cors:\n  allow_origins:\n    - https://quick.club\n");
    let defaults = HttpServer {
        port: 80,
        cors: Cors {
            allow_origins: vec!["*".into(), "localhost".into()],
        },
    };

    let mut server = HttpServer::default();
    load_with_env(
        &LoadOptions::new("HTTP_").with_yaml_file(&path),
        &mut server,
        Some(&defaults),
        no_env(),
    )
    .unwrap();
    assert_eq!(server.cors.allow_origins, vec!["https://quick.club"]);
    assert_eq!(server.port, 80);
}

#[test]
fn test_missing_file_is_fatal_and_target_untouched() {
    let temp = TempDir::new().unwrap();
    let mut cfg = Config::default();
    cfg.application.name = "before".into();

    let err = load_with_env(
        &options().with_yaml_file(temp.path().join("absent.yml")),
        &mut cfg,
        Some(&default_config()),
        no_env(),
    )
    .unwrap_err();

    assert_eq!(err.code(), ErrorCode::FileError);
    assert_eq!(cfg.application.name, "before");
    assert!(!cfg.debug);
}

#[test]
fn test_malformed_file_is_fatal_and_target_untouched() {
    let (_temp, path) = write_yaml("db:\n  host: [unterminated\n");
    let mut cfg = Config::default();

    let err = load_with_env(
        &options().with_yaml_file(&path),
        &mut cfg,
        Some(&default_config()),
        no_env(),
    )
    .unwrap_err();

    assert_eq!(err.code(), ErrorCode::FileError);
    assert_eq!(cfg, Config::default());
}

#[test]
fn test_bad_environment_value_names_key() {
    let mut cfg = Config::default();
    let err = load_with_env(
        &options(),
        &mut cfg,
        Some(&default_config()),
        vec![("QUICK_APPLICATION__PORT", "eighty")],
    )
    .unwrap_err();

    match err {
        LoadError::Decode { key, message } => {
            assert_eq!(key, "application.port");
            assert!(message.contains("eighty"), "{}", message);
        }
        other => panic!("expected decode error, got {:?}", other),
    }
    assert_eq!(cfg, Config::default());
}

#[test]
fn test_weak_typing_from_environment() {
    let mut cfg = Config::default();
    load_with_env(
        &options(),
        &mut cfg,
        Some(&default_config()),
        vec![
            ("QUICK_DEBUG", "0"),
            ("QUICK_DB__PORT", "5432"),
            ("QUICK_DB__OPTIONS__MAX_CONN_SIZE", "-1"),
        ],
    )
    .unwrap();

    assert!(!cfg.debug);
    assert_eq!(cfg.database.port, 5432);
    assert_eq!(cfg.database.options.max_conn_size, -1);
}

#[test]
fn test_process_environment() {
    // Names are unique to this test so parallel tests never observe them.
    // SAFETY: no other test reads or writes these variables.
    unsafe {
        std::env::set_var("LCPROC_APPLICATION__NAME", "from process");
        std::env::set_var("LCPROC_DB__OPTIONS__MAX_THREAD_COUNT", "48");
    }

    let mut cfg = Config::default();
    let result = load(&LoadOptions::new("LCPROC_"), &mut cfg, Some(&default_config()));

    unsafe {
        std::env::remove_var("LCPROC_APPLICATION__NAME");
        std::env::remove_var("LCPROC_DB__OPTIONS__MAX_THREAD_COUNT");
    }

    result.unwrap();
    assert_eq!(cfg.application.name, "from process");
    assert_eq!(cfg.database.options.max_thread_count, 48);
    assert_eq!(cfg.application.port, 8080);
}
