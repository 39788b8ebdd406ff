//! Build descriptor ingestion
//!
//! The descriptor is the declarative document the packaging toolchain
//! hands us: plugin list, platform/SDK settings, compiler compatibility
//! levels, signing configurations, per-build-type override layers, and
//! dependency declarations. TOML on disk, typed here.

use crate::error::{BuildCfgError, Result};
use crate::settings::{BuildSettings, DependencyManifestRef, SigningConfig};
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Standard locations probed when no descriptor path is given
pub const DESCRIPTOR_CANDIDATES: &[&str] = &[
    "besinova-build.toml",
    "android/besinova-build.toml",
    ".config/besinova-build.toml",
];

/// Dependency declarations of a descriptor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencySection {
    /// Version manifest (BoM) consulted for unpinned names
    #[serde(default)]
    pub manifest: Option<DependencyManifestRef>,
    /// Names pinned to an exact version in the descriptor
    #[serde(default)]
    pub pins: BTreeMap<String, Version>,
    /// Names left for the manifest to version
    #[serde(default)]
    pub requested: Vec<String>,
}

/// A parsed build descriptor
#[derive(Debug, Clone, Deserialize)]
pub struct BuildDescriptor {
    /// Build plugins the toolchain applies, in declaration order
    #[serde(default)]
    pub plugins: Vec<String>,
    /// Base settings layer
    pub android: BuildSettings,
    /// Named signing configurations
    #[serde(default)]
    pub signing_configs: BTreeMap<String, SigningConfig>,
    /// Per-build-type override layers
    #[serde(default)]
    pub build_types: BTreeMap<String, BuildSettings>,
    /// Dependency declarations
    #[serde(default)]
    pub dependencies: DependencySection,
}

impl BuildDescriptor {
    /// Load a descriptor from an explicit path or the standard locations.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => find_descriptor_file().ok_or_else(|| {
                BuildCfgError::DescriptorNotFound(DESCRIPTOR_CANDIDATES.join(", "))
            })?,
        };

        if !path.exists() {
            return Err(BuildCfgError::DescriptorNotFound(
                path.display().to_string(),
            ));
        }

        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content).map_err(|err| match err {
            BuildCfgError::Parse { reason, .. } => BuildCfgError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse a descriptor from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut descriptor: Self = toml::from_str(content).map_err(|e| BuildCfgError::Parse {
            path: "<descriptor>".to_string(),
            reason: e.to_string(),
        })?;
        descriptor.apply_defaults();
        Ok(descriptor)
    }

    // The toolchain guarantees a debug keystore and the two standard build
    // types even when the descriptor doesn't spell them out.
    fn apply_defaults(&mut self) {
        self.signing_configs
            .entry("debug".to_string())
            .or_insert_with(|| SigningConfig {
                store_file: Some("debug.keystore".to_string()),
                key_alias: Some("androiddebugkey".to_string()),
            });

        self.build_types.entry("debug".to_string()).or_default();
        self.build_types.entry("release".to_string()).or_default();
    }

    /// Declared build type names, in stable order.
    pub fn build_type_names(&self) -> Vec<String> {
        self.build_types.keys().cloned().collect()
    }

    /// Override layer for a build type.
    pub fn build_type_layer(&self, build_type: &str) -> Result<&BuildSettings> {
        self.build_types
            .get(build_type)
            .ok_or_else(|| BuildCfgError::UnknownBuildType(build_type.to_string()))
    }

    /// Every dependency name the descriptor declares: the requested list
    /// plus the pinned names, deduplicated, in declaration-then-name order.
    pub fn requested_dependencies(&self) -> Vec<String> {
        let mut names = self.dependencies.requested.clone();
        for pinned in self.dependencies.pins.keys() {
            if !names.contains(pinned) {
                names.push(pinned.clone());
            }
        }
        names
    }
}

fn find_descriptor_file() -> Option<std::path::PathBuf> {
    DESCRIPTOR_CANDIDATES
        .iter()
        .map(|candidate| std::path::PathBuf::from(*candidate))
        .find(|candidate| candidate.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::JavaVersion;

    /// Descriptor matching the besinova android application
    const SAMPLE: &str = r#"
        plugins = [
            "com.android.application",
            "kotlin-android",
            "com.google.gms.google-services",
            "dev.flutter.flutter-gradle-plugin",
        ]

        [android]
        application_id = "com.example.besinova"
        namespace = "com.example.besinova"
        compile_sdk = 34
        min_sdk = 23
        target_sdk = 34
        version_code = 1
        version_name = "1.0.0"
        ndk_version = "27.0.12077973"
        source_compatibility = "11"
        target_compatibility = "11"
        kotlin_jvm_target = "11"
        core_library_desugaring = true

        [build_types.release]
        signing_config = "debug"

        [dependencies]
        manifest = { platform = "com.google.firebase", name = "firebase-bom", version = "32.7.4" }
        requested = ["firebase-auth", "firebase-messaging"]

        [dependencies.pins]
        desugar_jdk_libs = "2.0.4"
    "#;

    #[test]
    fn test_parse_sample_descriptor() {
        let descriptor = BuildDescriptor::from_toml_str(SAMPLE).unwrap();
        assert_eq!(descriptor.plugins.len(), 4);
        assert_eq!(
            descriptor.android.application_id.as_deref(),
            Some("com.example.besinova")
        );
        assert_eq!(descriptor.android.min_sdk, Some(23));
        assert_eq!(
            descriptor.android.source_compatibility,
            Some(JavaVersion::V11)
        );
        assert_eq!(descriptor.android.ndk_version.as_deref(), Some("27.0.12077973"));

        let manifest = descriptor.dependencies.manifest.as_ref().unwrap();
        assert_eq!(manifest.version, "32.7.4");
    }

    #[test]
    fn test_debug_defaults_injected() {
        let descriptor = BuildDescriptor::from_toml_str(SAMPLE).unwrap();
        assert!(descriptor.signing_configs.contains_key("debug"));
        assert_eq!(descriptor.build_type_names(), vec!["debug", "release"]);
        assert!(descriptor.build_type_layer("debug").unwrap().is_empty());
    }

    #[test]
    fn test_release_layer_keeps_signing_override() {
        let descriptor = BuildDescriptor::from_toml_str(SAMPLE).unwrap();
        let release = descriptor.build_type_layer("release").unwrap();
        assert_eq!(release.signing_config.as_deref(), Some("debug"));
    }

    #[test]
    fn test_requested_includes_pins() {
        let descriptor = BuildDescriptor::from_toml_str(SAMPLE).unwrap();
        let requested = descriptor.requested_dependencies();
        assert_eq!(
            requested,
            vec!["firebase-auth", "firebase-messaging", "desugar_jdk_libs"]
        );
    }

    #[test]
    fn test_unknown_build_type() {
        let descriptor = BuildDescriptor::from_toml_str(SAMPLE).unwrap();
        assert!(matches!(
            descriptor.build_type_layer("profile"),
            Err(BuildCfgError::UnknownBuildType(_))
        ));
    }

    #[test]
    fn test_parse_error_carries_diagnostic() {
        let err = BuildDescriptor::from_toml_str("[android\nmin_sdk = 23").unwrap_err();
        assert!(matches!(err, BuildCfgError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = BuildDescriptor::load(Some(Path::new("/nonexistent/build.toml"))).unwrap_err();
        assert!(matches!(err, BuildCfgError::DescriptorNotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();

        let descriptor = BuildDescriptor::load(Some(file.path())).unwrap();
        assert_eq!(descriptor.android.version_code, Some(1));
    }
}
