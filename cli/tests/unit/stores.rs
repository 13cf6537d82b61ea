//! File-backed stores exercised through the application services.

#![allow(clippy::expect_used)]

use podctl::application::ports::{ConfigStore, ManagedPodStore};
use podctl::application::services::config_service;
use podctl::application::services::pod_admin;
use podctl::application::services::registry::terminate_and_forget;
use podctl::domain::config::DEFAULT_IMAGE;
use podctl::domain::{ConfigError, PodError, PodStatus, ResourceOverrides};
use podctl::infra::config::{YamlConfigStore, YamlPresetStore};
use podctl::infra::paths::{CONFIG_FILE, PRESETS_FILE, REGISTRY_FILE};
use podctl::infra::registry_store::JsonRegistryStore;

use crate::mocks::{InMemoryProvider, pod};

struct Home {
    dir: tempfile::TempDir,
}

impl Home {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn config(&self) -> YamlConfigStore {
        YamlConfigStore::with_path(self.dir.path().join(CONFIG_FILE))
    }

    fn presets(&self) -> YamlPresetStore {
        YamlPresetStore::with_path(self.dir.path().join(PRESETS_FILE))
    }

    fn registry(&self) -> JsonRegistryStore {
        JsonRegistryStore::with_path(self.dir.path().join(REGISTRY_FILE))
    }
}

// ── Config ───────────────────────────────────────────────────────────────────

#[test]
fn config_set_survives_reload() {
    let home = Home::new();
    config_service::set_config_value(&home.config(), "gpu_count", "4").expect("set");
    config_service::set_config_value(&home.config(), "api_key", "  rpa_secret  ").expect("set");

    let loaded = home.config().load().expect("load");
    assert_eq!(loaded.defaults.gpu_count, Some(4));
    assert_eq!(loaded.api_key.as_deref(), Some("rpa_secret"));
}

#[test]
fn config_set_rejects_bad_value_without_writing() {
    let home = Home::new();
    let err = config_service::set_config_value(&home.config(), "gpu_count", "zero")
        .expect_err("must fail");
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::InvalidValue { .. })
    ));
    assert!(!home.dir.path().join(CONFIG_FILE).exists());
}

#[test]
fn env_api_key_beats_config_file() {
    let home = Home::new();
    config_service::set_config_value(&home.config(), "api_key", "from-file").expect("set");
    let config = home.config().load().expect("load");

    let key = config_service::resolve_api_key(&config, Some("from-env".to_string()))
        .expect("key");
    assert_eq!(key, "from-env");
    let key = config_service::resolve_api_key(&config, Some(String::new())).expect("key");
    assert_eq!(key, "from-file");
}

// ── Presets ──────────────────────────────────────────────────────────────────

#[test]
fn workload_spec_layers_config_preset_and_flags() {
    let home = Home::new();
    config_service::set_config_value(&home.config(), "gpu_type", "A40").expect("set");
    config_service::set_config_value(&home.config(), "timeout_minutes", "30").expect("set");
    config_service::save_preset(
        &home.presets(),
        "big",
        ResourceOverrides {
            gpu_type: Some("H100".to_string()),
            gpu_count: Some(2),
            ..ResourceOverrides::default()
        },
    )
    .expect("save");

    let config = home.config().load().expect("load");
    let explicit = ResourceOverrides {
        gpu_count: Some(8),
        ..ResourceOverrides::default()
    };
    let resolved =
        config_service::resolve_workload_spec(&config, &home.presets(), Some("big"), &explicit)
            .expect("resolve");

    assert_eq!(resolved.resources.gpu_type, "H100");
    assert_eq!(resolved.resources.gpu_count, 8);
    assert_eq!(resolved.resources.image, DEFAULT_IMAGE);
    assert_eq!(resolved.timeout_minutes, 30);
}

#[test]
fn preset_save_replace_delete_cycle() {
    let home = Home::new();
    let store = home.presets();
    let small = ResourceOverrides {
        gpu_count: Some(1),
        ..ResourceOverrides::default()
    };

    assert!(!config_service::save_preset(&store, "small", small.clone()).expect("save"));
    assert!(config_service::save_preset(&store, "small", small.clone()).expect("save"));
    assert_eq!(config_service::get_preset(&store, "small").expect("get"), small);

    config_service::delete_preset(&store, "small").expect("delete");
    let err = config_service::get_preset(&store, "small").expect_err("gone");
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::UnknownPreset(_))
    ));
    assert!(config_service::list_presets(&store).expect("list").is_empty());
}

#[test]
fn unknown_preset_fails_resolution() {
    let home = Home::new();
    let config = home.config().load().expect("load");
    let err = config_service::resolve_workload_spec(
        &config,
        &home.presets(),
        Some("missing"),
        &ResourceOverrides::default(),
    )
    .expect_err("must fail");
    assert!(err.to_string().contains("missing"));
}

// ── Registry ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn terminate_and_forget_rewrites_registry_file() {
    let home = Home::new();
    let registry = home.registry();
    registry.register("a").expect("register");
    registry.register("b").expect("register");
    let api = InMemoryProvider::without_capacity()
        .with_pod(pod("a", PodStatus::Running))
        .with_pod(pod("b", PodStatus::Running));

    terminate_and_forget(&api, &registry, "a")
        .await
        .expect("terminate");

    let reopened = home.registry();
    assert_eq!(
        reopened.list().expect("list").into_iter().collect::<Vec<_>>(),
        vec!["b".to_string()]
    );
}

#[tokio::test]
async fn kill_of_vanished_pod_drops_stale_registry_entry() {
    let home = Home::new();
    let registry = home.registry();
    registry.register("ghost").expect("register");
    let api = InMemoryProvider::without_capacity();

    let err = pod_admin::kill_pod(&api, &registry, "ghost")
        .await
        .expect_err("not found");
    assert_eq!(
        err.downcast_ref::<PodError>(),
        Some(&PodError::NotFound("ghost".to_string()))
    );
    assert!(registry.list().expect("list").is_empty());
}
