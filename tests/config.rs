use clap::Parser;
use nexora::cli::Args;
use nexora::config::{
    validate, Config, JsonConfig, DEFAULT_API_ENDPOINT, DEFAULT_BACKUP_MODEL,
    DEFAULT_PRIMARY_MODEL,
};
use nexora::NexoraError;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

#[test]
fn test_defaults_without_any_source() {
    let config = Config::resolve(&Args::default(), JsonConfig::default(), lookup_from(&[]));

    assert!(config.api_key.is_none());
    assert!(config.api_key().is_err());
    assert_eq!(config.api_endpoint, DEFAULT_API_ENDPOINT);
    assert_eq!(config.primary_model, DEFAULT_PRIMARY_MODEL);
    assert_eq!(config.backup_model, DEFAULT_BACKUP_MODEL);
    assert_eq!(config.context_window, 16);
    assert!(config.speech.is_none());
    assert!(config.auth.is_none());
    assert!(config.system_prompt.contains("Current date:"));
}

#[test]
fn test_yaml_file_with_env_expansion() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".nexora.yaml");
    fs::write(
        &path,
        r#"
api:
  api_key: "${TEST_KEY}"
  endpoint: "http://localhost:11434/v1"
model:
  backup_model: "small-model"
  context_window: 8
speech:
  api_key: "${MISSING_SPEECH_KEY}"
"#,
    )
    .unwrap();

    let json_config = JsonConfig::load_from(&path).unwrap();
    let config = Config::resolve(
        &Args::default(),
        json_config,
        lookup_from(&[("TEST_KEY", "sk-from-env")]),
    );

    assert_eq!(config.api_key().unwrap(), "sk-from-env");
    assert_eq!(config.api_endpoint, "http://localhost:11434/v1/chat/completions");
    assert_eq!(config.backup_model, "small-model");
    assert_eq!(config.context_window, 8);
    // an unresolved reference does not enable the feature
    assert!(config.speech.is_none());
}

#[test]
fn test_precedence_cli_over_env_over_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nexora.json");
    fs::write(
        &path,
        r#"{ "model": { "primary_model": "file-model", "backup_model": "file-backup" } }"#,
    )
    .unwrap();
    let json_config = JsonConfig::load_from(&path).unwrap();
    let env = lookup_from(&[
        ("NEXORA_PRIMARY_MODEL", "env-model"),
        ("NEXORA_BACKUP_MODEL", "env-backup"),
        ("GOOGLE_CLIENT_ID", "client-123"),
    ]);

    let args = Args::parse_from(["nexora", "--model", "cli-model", "hello"]);
    let config = Config::resolve(&args, json_config.clone(), &env);
    assert_eq!(config.primary_model, "cli-model");
    assert_eq!(config.backup_model, "env-backup");
    assert_eq!(config.auth.as_ref().unwrap().client_id, "client-123");

    let config = Config::resolve(&Args::default(), json_config, &env);
    assert_eq!(config.primary_model, "env-model");
}

#[test]
fn test_invalid_file_is_a_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".nexora.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(JsonConfig::load_from(&path).is_err());
}

#[test]
fn test_unset_key_placeholder_still_loads_for_local_commands() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(".nexora.yaml");
    fs::write(&path, "api:\n  api_key: \"${NEXORA_KEY}\"\n").unwrap();

    let json_config = JsonConfig::load_from(&path).unwrap();
    let config = Config::resolve(&Args::default(), json_config, lookup_from(&[]));

    assert!(validate(&config).is_ok());
    assert!(config.api_key.is_none());
    match config.api_key() {
        Err(NexoraError::ConfigError(message)) => assert!(message.contains("${NEXORA_KEY}")),
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
fn test_blank_key_counts_as_missing() {
    let config = Config::resolve(
        &Args::default(),
        JsonConfig::default(),
        lookup_from(&[("NEXORA_API_KEY", "   ")]),
    );
    assert!(validate(&config).is_ok());
    assert!(config.api_key.is_none());
}
