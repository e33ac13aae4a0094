//! Tests for config functionality.

use crate::capabilities::{
    Capability, ConfigBackend, ContainerSettings, Orchestrator, configure_container_settings,
    get_container_settings, get_infrastructure_settings,
};
use crate::config::{Config, FileOrchestrator};
use serde_json::json;
use std::path::PathBuf;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert!(config.capability_service);
    assert!(config.capabilities.is_empty());
    assert!(config.legacy.is_empty());
    assert_eq!(config.working_dir, None);
    assert_eq!(config.events_log, None);
    assert_eq!(config.max_output_chars, 4096);
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
capability_service: false
working_dir: infra
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert!(!config.capability_service);
    assert_eq!(config.working_dir, Some(PathBuf::from("infra")));
    assert_eq!(config.max_output_chars, 4096);
}

#[test]
fn test_parse_capability_tables() {
    let yaml = r#"
capabilities:
  container_config:
    runtime: podman
    max_image_size_mb: 500
legacy:
  safety_config:
    deployment:
      enable_rollback: false
events_log: .opsgate/events.ndjson
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.capabilities["container_config"]["runtime"], json!("podman"));
    assert_eq!(
        config.capabilities["container_config"]["max_image_size_mb"],
        json!(500)
    );
    assert_eq!(
        config.legacy["safety_config"]["deployment"]["enable_rollback"],
        json!(false)
    );
    assert_eq!(
        config.events_log,
        Some(PathBuf::from(".opsgate/events.ndjson"))
    );
}

#[test]
fn test_parse_yaml_with_unknown_fields() {
    let yaml = r#"
max_output_chars: 100
future_field: whatever
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.max_output_chars, 100);
}

#[test]
fn test_validate_zero_max_output_chars() {
    let result = Config::from_yaml("max_output_chars: 0");
    assert!(result.is_err());
    assert!(
        result
            .unwrap_err()
            .to_string()
            .contains("max_output_chars must be greater than 0")
    );
}

#[test]
fn test_validate_empty_working_dir() {
    let result = Config::from_yaml("working_dir: \"\"");
    assert!(result.unwrap_err().to_string().contains("working_dir"));
}

#[test]
fn test_validate_unknown_capability_config() {
    let yaml = r#"
capabilities:
  mlops_config:
    tracker: mlflow
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("unknown capability config 'mlops_config'"));
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("capabilities: [1, 2").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_config_load_missing_file() {
    let result = Config::load("/nonexistent/path/opsgate.yaml");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("failed to read"));
}

#[test]
fn test_load_or_default_missing_file() {
    let temp = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(temp.path().join("opsgate.yaml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_and_reload() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nested").join("opsgate.yaml");

    let mut config = Config::default();
    config.max_output_chars = 512;
    config.capabilities.insert(
        "cicd_config".to_string(),
        Capability::CicdSettings.defaults(),
    );
    config.save(&path).unwrap();

    let reloaded = Config::load(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_file_orchestrator_service_mode() {
    let mut orchestrator = FileOrchestrator::new(Config::default());
    assert!(orchestrator.config_service().is_some());

    let backend = configure_container_settings(
        &mut orchestrator,
        &ContainerSettings {
            runtime: "podman".to_string(),
            ..ContainerSettings::default()
        },
    );
    assert_eq!(backend, ConfigBackend::ServiceBacked);

    let config = orchestrator.into_config();
    assert_eq!(config.capabilities["container_config"]["runtime"], json!("podman"));
    assert!(config.legacy.is_empty());
}

#[test]
fn test_file_orchestrator_legacy_mode() {
    let config = Config::from_yaml(
        r#"
capability_service: false
capabilities:
  infrastructure_config:
    iac_tool: opentofu
legacy:
  infra_config:
    iac_tool: terraform
"#,
    )
    .unwrap();
    let mut orchestrator = FileOrchestrator::new(config);
    assert!(orchestrator.config_service().is_none());
    assert_eq!(get_infrastructure_settings(&orchestrator).iac_tool, "terraform");

    configure_container_settings(&mut orchestrator, &ContainerSettings::default());
    let config = orchestrator.into_config();

    assert_eq!(config.legacy["container_config"]["runtime"], json!("docker"));
    assert_eq!(
        config.capabilities["infrastructure_config"]["iac_tool"],
        json!("opentofu"),
        "service table is left alone while the service is disabled"
    );
    assert_eq!(
        get_container_settings(&FileOrchestrator::new(config)),
        ContainerSettings::default()
    );
}
