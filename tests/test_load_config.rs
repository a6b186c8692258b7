use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use transfer_intake::load_config::{load_config, parse_config, resolve_config, WORK_ROOT_ENV};
use transfer_intake_core::config::{FetchConfig, IntakeConfig};

/// A complete config file maps every key onto IntakeConfig.
#[test]
#[serial]
fn test_load_config_full_file() {
    let config_yaml = r#"
work_root: /srv/intake/tmp
work_prefix: sg
link_prefix: "https://files.example.net/get/"
keep_work_dir: true
fetch:
  method: helper
  program: /SG/code/getWeTransferFile.R
tools:
  unzip: /usr/bin/unzip
  seven_zip: /usr/bin/7z
  unrar: /usr/bin/unrar
  file: /usr/bin/file
post_processors:
  - /SG/code/process_incoming_files.R
  - /SG/code/motusIncomingFiles.R
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();
    env::remove_var(WORK_ROOT_ENV);

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.work_root, PathBuf::from("/srv/intake/tmp"));
    assert_eq!(config.work_prefix, "sg");
    assert_eq!(config.link_prefix, "https://files.example.net/get/");
    assert!(config.keep_work_dir);
    assert_eq!(
        config.fetch,
        FetchConfig::Helper {
            program: PathBuf::from("/SG/code/getWeTransferFile.R")
        }
    );
    assert_eq!(config.tools.seven_zip, PathBuf::from("/usr/bin/7z"));
    assert_eq!(config.post_processors.len(), 2);
}

/// Missing keys fall back to the built-in defaults.
#[test]
#[serial]
fn test_partial_config_keeps_defaults() {
    let config = parse_config("fetch:\n  method: http\ntools:\n  unrar: /opt/unrar\n")
        .expect("Config should parse");
    let defaults = IntakeConfig::default();

    assert_eq!(config.fetch, FetchConfig::Http);
    assert_eq!(config.tools.unrar, PathBuf::from("/opt/unrar"));
    assert_eq!(config.tools.unzip, defaults.tools.unzip);
    assert_eq!(config.link_prefix, defaults.link_prefix);
    assert_eq!(config.post_processors, defaults.post_processors);
}

#[test]
#[serial]
fn test_helper_without_program_uses_default_helper() {
    let config = parse_config("fetch:\n  method: helper\n").unwrap();
    assert_eq!(config.fetch, IntakeConfig::default().fetch);
}

#[test]
#[serial]
fn test_empty_config_is_all_defaults() {
    assert_eq!(parse_config("  \n").unwrap(), IntakeConfig::default());
}

#[test]
#[serial]
fn test_unknown_fetch_method_is_rejected() {
    let err = parse_config("fetch:\n  method: carrier-pigeon\n").unwrap_err();
    assert!(
        format!("{err:#}").contains("parse"),
        "Parse error expected, got: {err:#}"
    );
}

#[test]
#[serial]
fn test_load_config_errors_for_invalid_file() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"not-yaml: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("parse") || msg.contains("YAML"),
        "Parse error expected, got: {msg}"
    );
}

#[test]
#[serial]
fn test_load_config_errors_for_missing_file() {
    let err = load_config("/definitely/not/here.yaml").unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

/// The environment overrides work_root for both file and default configs.
#[test]
#[serial]
fn test_work_root_env_override() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "work_root: /from/file\n").unwrap();

    env::set_var(WORK_ROOT_ENV, "/from/env");
    let from_file = load_config(config_file.path()).unwrap();
    let from_defaults = resolve_config(None).unwrap();
    env::remove_var(WORK_ROOT_ENV);

    assert_eq!(from_file.work_root, PathBuf::from("/from/env"));
    assert_eq!(from_defaults.work_root, PathBuf::from("/from/env"));

    let without_env = resolve_config(None).unwrap();
    assert_eq!(without_env.work_root, IntakeConfig::default().work_root);
}
