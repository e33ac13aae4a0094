//! Implementation of the `opsgate config show` and `opsgate config set` commands.

use super::event_log;
use crate::cli::{ConfigSetArgs, ConfigShowArgs};
use opsgate::capabilities::{
    Capability, CapabilityProvider, ConfigBackend, Settings, lookup_capability, merge_settings,
};
use opsgate::config::{Config, FileOrchestrator};
use opsgate::error::{OpsError, Result};
use opsgate::events::{Event, EventAction};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::Path;

/// Execute the `opsgate config show` command.
///
/// Prints effective settings (stored values over defaults) as YAML, keyed by
/// capability name.
pub fn cmd_config_show(config_path: &Path, args: ConfigShowArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let orchestrator = FileOrchestrator::new(config);

    let capabilities = match &args.capability {
        Some(name) => vec![lookup_capability(name)?],
        None => Capability::ALL.to_vec(),
    };

    let shown: BTreeMap<&str, Settings> = capabilities
        .iter()
        .map(|capability| (capability.name(), capability.current(&orchestrator)))
        .collect();

    println!("# backend: {}", ConfigBackend::probe(&orchestrator));
    print!("{}", serde_yaml::to_string(&shown)?);
    Ok(())
}

/// Execute the `opsgate config set` command.
///
/// Assignments are layered over the capability's current settings and stored
/// through whichever backend the config file exposes.
pub fn cmd_config_set(config_path: &Path, args: ConfigSetArgs) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let capability = lookup_capability(&args.capability)?;

    let mut assignments = Settings::new();
    for raw in &args.assignments {
        let (key, value) = parse_assignment(raw)?;
        assignments.insert(key, value);
    }

    let mut orchestrator = FileOrchestrator::new(config);
    let settings = merge_settings(&capability.current(&orchestrator), &assignments);
    let backend = CapabilityProvider::new().apply(&mut orchestrator, capability, &settings)?;

    let config = orchestrator.into_config();
    config.save(config_path)?;

    event_log(&config).record(
        &Event::new(EventAction::CapabilityConfigured).with_details(json!({
            "capability": capability.name(),
            "backend": backend.as_str(),
            "keys": assignments.keys().collect::<Vec<_>>(),
        })),
    )?;

    println!(
        "{} stored via {} backend in {}",
        capability,
        backend,
        config_path.display()
    );
    Ok(())
}

/// Split `key=value`; the value is read as JSON when it parses, text otherwise.
fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(OpsError::UserError(format!(
            "invalid assignment '{}'\nFix: use key=value, e.g. runtime=podman",
            raw
        )));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(OpsError::UserError(format!(
            "invalid assignment '{}': empty key",
            raw
        )));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_assignment_values() {
        assert_eq!(
            parse_assignment("runtime=podman").unwrap(),
            ("runtime".to_string(), json!("podman"))
        );
        assert_eq!(
            parse_assignment("max_image_size_mb=500").unwrap(),
            ("max_image_size_mb".to_string(), json!(500))
        );
        assert_eq!(
            parse_assignment("enable_rollback=false").unwrap().1,
            json!(false)
        );
        assert_eq!(parse_assignment("state_backend=null").unwrap().1, Value::Null);
        assert_eq!(
            parse_assignment(r#"protected_environments=["prod"]"#).unwrap().1,
            json!(["prod"])
        );
        assert_eq!(parse_assignment("tag=a=b").unwrap().1, json!("a=b"));
        assert!(parse_assignment("runtime").is_err());
        assert!(parse_assignment("=podman").is_err());
    }

    #[test]
    fn set_writes_service_table_and_keeps_other_keys() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("opsgate.yaml");

        cmd_config_set(
            &config_path,
            ConfigSetArgs {
                capability: "container_settings".to_string(),
                assignments: vec!["runtime=podman".to_string()],
            },
        )
        .unwrap();
        cmd_config_set(
            &config_path,
            ConfigSetArgs {
                capability: "container_settings".to_string(),
                assignments: vec!["max_image_size_mb=500".to_string()],
            },
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        let stored = &config.capabilities["container_config"];
        assert_eq!(stored["runtime"], json!("podman"));
        assert_eq!(stored["max_image_size_mb"], json!(500));
        assert!(config.legacy.is_empty());
    }

    #[test]
    fn set_without_service_writes_legacy_attribute() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("opsgate.yaml");
        std::fs::write(&config_path, "capability_service: false\n").unwrap();

        cmd_config_set(
            &config_path,
            ConfigSetArgs {
                capability: "deployment_safety".to_string(),
                assignments: vec!["enable_rollback=false".to_string()],
            },
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert!(config.capabilities.is_empty());
        assert_eq!(
            config.legacy["safety_config"]["deployment"]["enable_rollback"],
            json!(false)
        );
    }

    #[test]
    fn set_rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("opsgate.yaml");

        let err = cmd_config_set(
            &config_path,
            ConfigSetArgs {
                capability: "cicd_settings".to_string(),
                assignments: vec!["colour=blue".to_string()],
            },
        )
        .unwrap_err();

        assert!(err.to_string().contains("unknown setting 'colour'"));
        assert!(!config_path.exists());
    }
}
