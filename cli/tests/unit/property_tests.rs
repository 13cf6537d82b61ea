//! Property-based tests for the registry set semantics and spec merging.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use std::collections::BTreeSet;

use proptest::prelude::*;

use podctl::application::ports::ManagedPodStore;
use podctl::domain::config::{mask_secret, resolve_spec, validate_preset_name};
use podctl::domain::{ResourceOverrides, ResourceSpec};
use podctl::infra::registry_store::JsonRegistryStore;

fn id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{4,12}"
}

fn overrides_strategy() -> impl Strategy<Value = ResourceOverrides> {
    (
        proptest::option::of("[A-Z0-9 ]{1,12}"),
        proptest::option::of(1u32..8),
        proptest::option::of(1u64..600),
    )
        .prop_map(|(gpu_type, gpu_count, timeout_minutes)| ResourceOverrides {
            gpu_type,
            gpu_count,
            timeout_minutes,
            ..ResourceOverrides::default()
        })
}

// ============================================================================
// JsonRegistryStore
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// The file always holds exactly the model set after any op sequence.
    #[test]
    fn prop_registry_matches_set_model(
        ops in proptest::collection::vec((proptest::bool::ANY, id_strategy()), 1..20)
    ) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonRegistryStore::with_path(dir.path().join("managed_pods.json"));
        let mut model = BTreeSet::new();
        for (add, id) in &ops {
            if *add {
                store.register(id).expect("register");
                model.insert(id.clone());
            } else {
                store.unregister(id).expect("unregister");
                model.remove(id);
            }
        }
        prop_assert_eq!(store.list().expect("list"), model);
    }

    /// Registering twice, or unregistering an unknown id, changes nothing.
    #[test]
    fn prop_registry_ops_are_idempotent(id in id_strategy(), other in id_strategy()) {
        prop_assume!(id != other);
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonRegistryStore::with_path(dir.path().join("managed_pods.json"));
        store.register(&id).expect("register");
        store.register(&id).expect("register");
        store.unregister(&other).expect("unregister");
        prop_assert_eq!(store.list().expect("list").into_iter().collect::<Vec<_>>(), vec![id]);
    }
}

// ============================================================================
// resolve_spec() precedence
// ============================================================================

proptest! {
    /// Explicit options always win; otherwise preset, then config, then built-in.
    #[test]
    fn prop_resolve_spec_precedence(
        config in overrides_strategy(),
        preset in proptest::option::of(overrides_strategy()),
        explicit in overrides_strategy(),
    ) {
        let resolved = resolve_spec(&config, preset.as_ref(), &explicit);
        let builtin = ResourceSpec::default();

        let expected_count = explicit
            .gpu_count
            .or(preset.as_ref().and_then(|p| p.gpu_count))
            .or(config.gpu_count)
            .unwrap_or(builtin.gpu_count);
        prop_assert_eq!(resolved.resources.gpu_count, expected_count);

        let expected_type = explicit
            .gpu_type
            .clone()
            .or(preset.as_ref().and_then(|p| p.gpu_type.clone()))
            .or(config.gpu_type.clone())
            .unwrap_or(builtin.gpu_type);
        prop_assert_eq!(resolved.resources.gpu_type, expected_type);

        if let Some(t) = explicit.timeout_minutes {
            prop_assert_eq!(resolved.timeout_minutes, t);
        }
    }

    /// Resolving with nothing set yields the built-in spec.
    #[test]
    fn prop_empty_layers_yield_builtin(_seed in 0u8..4) {
        let empty = ResourceOverrides::default();
        let resolved = resolve_spec(&empty, Some(&empty), &empty);
        prop_assert_eq!(resolved.resources, ResourceSpec::default());
    }
}

// ============================================================================
// Validation and masking
// ============================================================================

proptest! {
    /// Names with uppercase letters are always rejected.
    #[test]
    fn prop_uppercase_preset_names_rejected(name in "[a-z0-9]{0,5}[A-Z][a-zA-Z0-9]{0,5}") {
        prop_assert!(validate_preset_name(&name).is_err(), "accepted {name}");
    }

    /// Well-formed names are accepted.
    #[test]
    fn prop_wellformed_preset_names_accepted(name in "[a-z0-9][a-z0-9_-]{0,31}") {
        prop_assert!(validate_preset_name(&name).is_ok(), "rejected {name}");
    }

    /// Masking never leaks more than the last four characters.
    #[test]
    fn prop_mask_secret_hides_prefix(secret in "[A-Za-z0-9_]{5,40}") {
        let masked = mask_secret(&secret);
        prop_assert!(masked.starts_with("****"));
        prop_assert!(secret.ends_with(&masked[4..]));
        prop_assert_eq!(masked.len(), 8);
    }
}
