//! Layered settings merging
//!
//! Overrides are an explicit ordered list folded left-to-right; a later
//! layer wins only for the fields it explicitly sets. The fold is a pure
//! function of its inputs and is idempotent.

use crate::settings::BuildSettings;

/// Merge override layers onto a base layer.
///
/// Each later layer's set fields replace earlier ones; unset fields never
/// override. Missing overrides behave as empty layers.
pub fn merge(base: &BuildSettings, overrides: &[BuildSettings]) -> BuildSettings {
    let mut merged = base.clone();
    for layer in overrides {
        overlay(&mut merged, layer);
    }
    merged
}

fn overlay(merged: &mut BuildSettings, layer: &BuildSettings) {
    macro_rules! take_set {
        ($($field:ident),+ $(,)?) => {
            $(
                if let Some(value) = &layer.$field {
                    merged.$field = Some(value.clone());
                }
            )+
        };
    }

    take_set!(
        application_id,
        namespace,
        min_sdk,
        target_sdk,
        compile_sdk,
        version_code,
        version_name,
        ndk_version,
        source_compatibility,
        target_compatibility,
        kotlin_jvm_target,
        core_library_desugaring,
        signing_config,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::JavaVersion;
    use proptest::prelude::*;

    fn base() -> BuildSettings {
        BuildSettings {
            application_id: Some("com.example.besinova".to_string()),
            min_sdk: Some(23),
            target_sdk: Some(34),
            compile_sdk: Some(34),
            version_code: Some(1),
            version_name: Some("1.0.0".to_string()),
            source_compatibility: Some(JavaVersion::V11),
            ..Default::default()
        }
    }

    #[test]
    fn test_later_layer_wins() {
        let release = BuildSettings {
            signing_config: Some("debug".to_string()),
            min_sdk: Some(24),
            ..Default::default()
        };

        let merged = merge(&base(), &[release]);
        assert_eq!(merged.min_sdk, Some(24));
        assert_eq!(merged.signing_config.as_deref(), Some("debug"));
        // untouched fields survive
        assert_eq!(merged.target_sdk, Some(34));
    }

    #[test]
    fn test_unset_fields_never_override() {
        let empty_override = BuildSettings::default();
        let merged = merge(&base(), &[empty_override]);
        assert_eq!(merged, base());
    }

    #[test]
    fn test_declaration_order_last_writer_wins() {
        let first = BuildSettings {
            min_sdk: Some(21),
            ..Default::default()
        };
        let second = BuildSettings {
            min_sdk: Some(26),
            ..Default::default()
        };

        let merged = merge(&base(), &[first, second]);
        assert_eq!(merged.min_sdk, Some(26));
    }

    #[test]
    fn test_no_overrides_is_identity() {
        assert_eq!(merge(&base(), &[]), base());
    }

    proptest! {
        // merge(base, [x]) applied twice equals applied once
        #[test]
        fn test_merge_idempotent(
            min in proptest::option::of(1u32..40),
            target in proptest::option::of(1u32..40),
            signing in proptest::option::of("[a-z]{1,8}"),
        ) {
            let layer = BuildSettings {
                min_sdk: min,
                target_sdk: target,
                signing_config: signing,
                ..Default::default()
            };

            let once = merge(&base(), &[layer.clone()]);
            let twice = merge(&once, &[layer]);
            prop_assert_eq!(once, twice);
        }
    }
}
