use super::*;
use serde_json::{Value, json};
use std::collections::BTreeMap;

fn settings_of(value: Value) -> Settings {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[test]
fn select_backend_prefers_service() {
    assert_eq!(select_backend(true), ConfigBackend::ServiceBacked);
    assert_eq!(select_backend(false), ConfigBackend::AttributeBacked);
}

#[test]
fn probe_follows_service_presence() {
    assert_eq!(
        ConfigBackend::probe(&LocalOrchestrator::service_backed()),
        ConfigBackend::ServiceBacked
    );
    assert_eq!(
        ConfigBackend::probe(&LocalOrchestrator::legacy()),
        ConfigBackend::AttributeBacked
    );
}

#[test]
fn service_store_never_touches_legacy_attribute() {
    let mut attributes = BTreeMap::new();
    attributes.insert(
        "container_config".to_string(),
        settings_of(json!({"runtime": "old"})),
    );
    let mut orchestrator = LocalOrchestrator::service_backed().with_attributes(attributes);

    let backend = configure_container_settings(
        &mut orchestrator,
        &ContainerSettings {
            runtime: "podman".to_string(),
            ..ContainerSettings::default()
        },
    );

    assert_eq!(backend, ConfigBackend::ServiceBacked);
    assert_eq!(
        orchestrator.attributes()["container_config"],
        settings_of(json!({"runtime": "old"}))
    );
    let stored = orchestrator
        .service()
        .and_then(|service| service.get_config("container_config"))
        .unwrap();
    assert_eq!(stored["runtime"], json!("podman"));
}

#[test]
fn legacy_store_writes_full_merged_dict() {
    let mut orchestrator = LocalOrchestrator::legacy();
    let overrides = settings_of(json!({"iac_tool": "opentofu"}));
    let defaults = InfrastructureSettings::default().to_settings();

    let backend = store(
        &mut orchestrator,
        "infrastructure_config",
        &overrides,
        &defaults,
        Some(&LegacyTarget::attribute("infra_config")),
    );

    assert_eq!(backend, ConfigBackend::AttributeBacked);
    assert_eq!(
        orchestrator.attributes()["infra_config"],
        settings_of(json!({
            "iac_tool": "opentofu",
            "auto_approve_non_destructive": false,
            "require_plan_before_apply": true,
            "state_backend": null
        }))
    );
}

#[test]
fn legacy_store_without_fallback_uses_capability_name() {
    let mut orchestrator = LocalOrchestrator::legacy();
    store(
        &mut orchestrator,
        "custom",
        &settings_of(json!({"a": 1})),
        &settings_of(json!({"a": 0, "b": 2})),
        None,
    );
    assert_eq!(
        orchestrator.attributes()["custom"],
        settings_of(json!({"a": 1, "b": 2}))
    );
}

#[test]
fn deployment_safety_uses_nested_key_in_legacy_mode() {
    let mut attributes = BTreeMap::new();
    attributes.insert(
        "safety_config".to_string(),
        settings_of(json!({"other": {"keep": true}})),
    );
    let mut orchestrator = LocalOrchestrator::legacy().with_attributes(attributes);

    configure_deployment_safety(
        &mut orchestrator,
        &DeploymentSafetySettings {
            enable_rollback: false,
            ..DeploymentSafetySettings::default()
        },
    );

    let safety = &orchestrator.attributes()["safety_config"];
    assert_eq!(safety["other"], json!({"keep": true}));
    assert_eq!(safety["deployment"]["enable_rollback"], json!(false));
    assert_eq!(
        safety["deployment"]["protected_environments"],
        json!(["production", "staging"])
    );
    assert!(!get_deployment_safety(&orchestrator).enable_rollback);
}

#[test]
fn load_returns_defaults_when_nothing_stored() {
    let defaults = settings_of(json!({"a": 1}));
    assert_eq!(
        load(&LocalOrchestrator::legacy(), "missing", &defaults, None),
        defaults
    );
    assert_eq!(
        load(&LocalOrchestrator::service_backed(), "missing", &defaults, None),
        defaults
    );
}

#[test]
fn load_overlays_stored_values_on_defaults() {
    let mut service = InMemoryConfigService::new();
    service.set_config("cicd_config", settings_of(json!({"platform": "gitlab_ci"})));
    let orchestrator = LocalOrchestrator::service_backed().with_service(service);

    let loaded = load(
        &orchestrator,
        "cicd_config",
        &CicdSettings::default().to_settings(),
        None,
    );
    assert_eq!(loaded["platform"], json!("gitlab_ci"));
    assert_eq!(loaded["run_tests_before_deploy"], json!(true));
}

#[test]
fn service_load_ignores_legacy_attribute() {
    let mut attributes = BTreeMap::new();
    attributes.insert(
        "monitoring_config".to_string(),
        settings_of(json!({"metrics_backend": "datadog"})),
    );
    let orchestrator = LocalOrchestrator::service_backed().with_attributes(attributes);
    assert_eq!(
        get_monitoring_settings(&orchestrator).metrics_backend,
        "prometheus"
    );
}

#[test]
fn malformed_stored_settings_fall_back_to_defaults() {
    let mut service = InMemoryConfigService::new();
    service.set_config(
        "container_config",
        settings_of(json!({"max_image_size_mb": "huge"})),
    );
    let orchestrator = LocalOrchestrator::service_backed().with_service(service);
    assert_eq!(get_container_settings(&orchestrator), ContainerSettings::default());
}

#[test]
fn mistyped_field_keeps_other_stored_values() {
    let mut service = InMemoryConfigService::new();
    service.set_config(
        "container_config",
        settings_of(json!({"runtime": "podman", "max_image_size_mb": 1500.5})),
    );
    let orchestrator = LocalOrchestrator::service_backed().with_service(service);

    let settings = get_container_settings(&orchestrator);
    assert_eq!(settings.runtime, "podman");
    assert_eq!(settings.max_image_size_mb, 2000);
    assert!(settings.security_scan_enabled);
}

#[test]
fn empty_protected_environments_store_the_default_list() {
    let mut orchestrator = LocalOrchestrator::service_backed();
    configure_deployment_safety(
        &mut orchestrator,
        &DeploymentSafetySettings {
            protected_environments: Vec::new(),
            ..DeploymentSafetySettings::default()
        },
    );

    assert_eq!(
        get_deployment_safety(&orchestrator).protected_environments,
        vec!["production".to_string(), "staging".to_string()]
    );

    configure_deployment_safety(
        &mut orchestrator,
        &DeploymentSafetySettings {
            protected_environments: vec!["prod-eu".to_string()],
            ..DeploymentSafetySettings::default()
        },
    );
    assert_eq!(
        get_deployment_safety(&orchestrator).protected_environments,
        vec!["prod-eu".to_string()]
    );
}

#[test]
fn default_tables_match_documented_values() {
    let configs = default_capability_configs();
    assert_eq!(configs.len(), 5);
    assert_eq!(
        Value::Object(configs["deployment_safety"].clone()),
        json!({
            "require_approval_for_production": true,
            "require_backup_before_deploy": true,
            "enable_rollback": true,
            "protected_environments": ["production", "staging"]
        })
    );
    assert_eq!(
        Value::Object(configs["container_config"].clone()),
        json!({
            "runtime": "docker",
            "default_registry": null,
            "security_scan_enabled": true,
            "max_image_size_mb": 2000
        })
    );
    assert_eq!(
        Value::Object(configs["infrastructure_config"].clone()),
        json!({
            "iac_tool": "terraform",
            "auto_approve_non_destructive": false,
            "require_plan_before_apply": true,
            "state_backend": null
        })
    );
    assert_eq!(
        Value::Object(configs["cicd_config"].clone()),
        json!({
            "platform": "github_actions",
            "run_tests_before_deploy": true,
            "require_passing_checks": true,
            "enable_security_scan": true
        })
    );
    assert_eq!(
        Value::Object(configs["monitoring_config"].clone()),
        json!({
            "metrics_backend": "prometheus",
            "logging_backend": "loki",
            "alerting_enabled": true,
            "dashboard_tool": "grafana"
        })
    );
}

#[test]
fn capability_metadata() {
    let monitoring = Capability::MonitoringSettings.metadata();
    assert_eq!(monitoring.version, "1.0");
    assert_eq!(monitoring.dependencies, &["deployment_safety"]);
    assert_eq!(monitoring.kind, CapabilityKind::Tool);
    assert_eq!(
        Capability::DeploymentSafety.metadata().kind,
        CapabilityKind::Safety
    );
    assert_eq!(
        Capability::from_name("infra_config"),
        None,
        "legacy attribute names are not capability names"
    );
    assert_eq!(
        Capability::from_name("infrastructure_config"),
        Some(Capability::InfrastructureSettings)
    );
    assert!(lookup_capability("nope").is_err());
}

#[test]
fn provider_apply_tracks_applied_set() {
    let mut provider = CapabilityProvider::new();
    let mut orchestrator = LocalOrchestrator::service_backed();

    let backend = provider
        .apply(
            &mut orchestrator,
            Capability::ContainerSettings,
            &settings_of(json!({"runtime": "podman"})),
        )
        .unwrap();
    assert_eq!(backend, ConfigBackend::ServiceBacked);
    assert!(provider.is_applied(Capability::ContainerSettings));
    assert_eq!(get_container_settings(&orchestrator).runtime, "podman");

    provider.apply_all(&mut orchestrator).unwrap();
    assert_eq!(provider.applied(), Capability::ALL.to_vec());
    assert_eq!(get_container_settings(&orchestrator).runtime, "docker");
}

#[test]
fn provider_rejects_unknown_or_mistyped_settings() {
    let mut provider = CapabilityProvider::new();
    let mut orchestrator = LocalOrchestrator::legacy();

    let err = provider
        .apply(
            &mut orchestrator,
            Capability::CicdSettings,
            &settings_of(json!({"colour": "blue"})),
        )
        .unwrap_err();
    assert!(err.to_string().contains("unknown setting 'colour'"));

    let err = provider
        .apply(
            &mut orchestrator,
            Capability::CicdSettings,
            &settings_of(json!({"run_tests_before_deploy": "yes"})),
        )
        .unwrap_err();
    assert!(err.to_string().contains("invalid settings"));
    assert!(provider.applied().is_empty());
    assert!(orchestrator.attributes().is_empty());
}
