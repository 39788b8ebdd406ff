//! Build settings data model
//!
//! `BuildSettings` is a draft layer: every field is optional so layers can
//! be stacked by the merger without unset fields clobbering earlier ones.
//! `ValidatedSettings` is the immutable, fully-populated record the
//! validator produces; nothing downstream ever sees a draft.

use crate::error::{BuildCfgError, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Java/Kotlin language compatibility level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JavaVersion {
    /// Java 8 (1.8)
    V1_8,
    /// Java 11
    V11,
    /// Java 17
    V17,
    /// Java 21
    V21,
}

impl JavaVersion {
    /// Parse a compatibility level from descriptor notation.
    ///
    /// Accepts both the bare level (`"11"`) and the Gradle enum spelling
    /// (`"VERSION_11"`).
    pub fn parse(value: &str) -> Result<Self> {
        let normalized = value.trim().trim_start_matches("VERSION_").replace('_', ".");
        match normalized.as_str() {
            "8" | "1.8" => Ok(Self::V1_8),
            "11" => Ok(Self::V11),
            "17" => Ok(Self::V17),
            "21" => Ok(Self::V21),
            _ => Err(BuildCfgError::InvalidValue {
                key: "java_version".to_string(),
                reason: format!("unsupported compatibility level `{value}`"),
            }),
        }
    }

    /// Level as it appears in descriptor files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1_8 => "1.8",
            Self::V11 => "11",
            Self::V17 => "17",
            Self::V21 => "21",
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for JavaVersion {
    type Error = BuildCfgError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<JavaVersion> for String {
    fn from(version: JavaVersion) -> Self {
        version.as_str().to_string()
    }
}

/// One layer of build settings; all fields optional
///
/// A descriptor's `[android]` section, a build-type override block, and a
/// set of command-line overrides are all instances of this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Application package identity (reverse-DNS)
    pub application_id: Option<String>,
    /// Code namespace; defaults to the application id when unset
    pub namespace: Option<String>,
    /// Lowest supported platform API level
    pub min_sdk: Option<u32>,
    /// API level the application behaviorally targets
    pub target_sdk: Option<u32>,
    /// API level compiled against
    pub compile_sdk: Option<u32>,
    /// Monotonic integer build number
    pub version_code: Option<u32>,
    /// Human-readable version string
    pub version_name: Option<String>,
    /// Native toolchain version, when native code is built
    pub ndk_version: Option<String>,
    /// Java source level
    pub source_compatibility: Option<JavaVersion>,
    /// Java bytecode level
    pub target_compatibility: Option<JavaVersion>,
    /// Kotlin JVM bytecode level
    pub kotlin_jvm_target: Option<JavaVersion>,
    /// Whether newer-JDK library APIs are backported at build time
    pub core_library_desugaring: Option<bool>,
    /// Named signing configuration this layer selects
    pub signing_config: Option<String>,
}

impl BuildSettings {
    /// True when no field in this layer is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Read a field back by its settings key.
    ///
    /// Fails with [`BuildCfgError::MissingKey`] when the field is unset,
    /// which is how required-key absence surfaces after merging.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "application_id" => self.application_id.clone(),
            "namespace" => self.namespace.clone(),
            "min_sdk" => self.min_sdk.map(|v| v.to_string()),
            "target_sdk" => self.target_sdk.map(|v| v.to_string()),
            "compile_sdk" => self.compile_sdk.map(|v| v.to_string()),
            "version_code" => self.version_code.map(|v| v.to_string()),
            "version_name" => self.version_name.clone(),
            "ndk_version" => self.ndk_version.clone(),
            "source_compatibility" => self.source_compatibility.map(|v| v.to_string()),
            "target_compatibility" => self.target_compatibility.map(|v| v.to_string()),
            "kotlin_jvm_target" => self.kotlin_jvm_target.map(|v| v.to_string()),
            "core_library_desugaring" => self.core_library_desugaring.map(|v| v.to_string()),
            "signing_config" => self.signing_config.clone(),
            _ => {
                return Err(BuildCfgError::InvalidValue {
                    key: key.to_string(),
                    reason: "unknown settings key".to_string(),
                })
            }
        };
        value.ok_or_else(|| BuildCfgError::MissingKey(key.to_string()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "application_id" => self.application_id = Some(value.to_string()),
            "namespace" => self.namespace = Some(value.to_string()),
            "min_sdk" => self.min_sdk = Some(parse_u32(key, value)?),
            "target_sdk" => self.target_sdk = Some(parse_u32(key, value)?),
            "compile_sdk" => self.compile_sdk = Some(parse_u32(key, value)?),
            "version_code" => self.version_code = Some(parse_u32(key, value)?),
            "version_name" => self.version_name = Some(value.to_string()),
            "ndk_version" => self.ndk_version = Some(value.to_string()),
            "source_compatibility" => self.source_compatibility = Some(JavaVersion::parse(value)?),
            "target_compatibility" => self.target_compatibility = Some(JavaVersion::parse(value)?),
            "kotlin_jvm_target" => self.kotlin_jvm_target = Some(JavaVersion::parse(value)?),
            "core_library_desugaring" => {
                self.core_library_desugaring =
                    Some(value.parse::<bool>().map_err(|_| BuildCfgError::InvalidValue {
                        key: key.to_string(),
                        reason: format!("expected true/false, got `{value}`"),
                    })?);
            }
            "signing_config" => self.signing_config = Some(value.to_string()),
            _ => {
                return Err(BuildCfgError::InvalidValue {
                    key: key.to_string(),
                    reason: "unknown settings key".to_string(),
                })
            }
        }
        Ok(())
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| BuildCfgError::InvalidValue {
            key: key.to_string(),
            reason: format!("expected a non-negative integer, got `{value}`"),
        })
}

/// Settings store built from an ordered sequence of raw `(key, value)` pairs
///
/// Detects conflicting duplicate keys within the layer; a key repeated with
/// an identical value is tolerated (the original descriptors do this).
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    layer: BuildSettings,
    seen: Vec<(String, String)>,
}

impl SettingsStore {
    /// Load raw entries into a typed settings layer.
    pub fn load<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut store = Self::default();
        for (key, value) in entries {
            store.insert(key.as_ref(), value.as_ref())?;
        }
        Ok(store)
    }

    fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some((_, first)) = self.seen.iter().find(|(k, _)| k == key) {
            if first != value {
                return Err(BuildCfgError::DuplicateKey {
                    key: key.to_string(),
                    first: first.clone(),
                    second: value.to_string(),
                });
            }
            return Ok(());
        }
        self.layer.set(key, value)?;
        self.seen.push((key.to_string(), value.to_string()));
        Ok(())
    }

    /// Read a loaded value back by key.
    pub fn get(&self, key: &str) -> Result<String> {
        self.layer.get(key)
    }

    /// Consume the store, yielding the settings layer it built.
    pub fn into_layer(self) -> BuildSettings {
        self.layer
    }
}

/// A named signing configuration declared by the descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Keystore file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<String>,
    /// Key alias within the keystore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_alias: Option<String>,
}

/// The signing decision the validator reached for one build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningPolicy {
    /// Build type this policy applies to
    pub build_type: String,
    /// Resolved signing configuration name
    pub signing_config: String,
}

/// Reference to a versioned dependency manifest (BoM)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyManifestRef {
    /// Ecosystem/group identifier, e.g. `com.google.firebase`
    pub platform: String,
    /// Manifest artifact name, e.g. `firebase-bom`
    pub name: String,
    /// Manifest version, e.g. `32.7.4`
    pub version: String,
}

impl fmt::Display for DependencyManifestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.platform, self.name, self.version)
    }
}

/// Where a resolved dependency's version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    /// Pinned directly in the descriptor
    ExplicitPin,
    /// Taken from the referenced version manifest
    Manifest,
    /// Taken from the built-in tooling default table
    Default,
}

/// One dependency with its resolved version; produced by the resolver only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDependency {
    /// Dependency name as requested
    pub name: String,
    /// Version the resolver settled on
    pub resolved_version: Version,
    /// Provenance of the version
    pub source_of_version: VersionSource,
}

/// Immutable settings record produced by validation
///
/// Every field required by the packaging toolchain is concrete here;
/// optional toolchain extras stay optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedSettings {
    /// Application package identity
    pub application_id: String,
    /// Code namespace
    pub namespace: String,
    /// Lowest supported platform API level
    pub min_sdk: u32,
    /// API level the application behaviorally targets
    pub target_sdk: u32,
    /// API level compiled against
    pub compile_sdk: u32,
    /// Monotonic integer build number
    pub version_code: u32,
    /// Human-readable version string
    pub version_name: String,
    /// Native toolchain version, when declared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ndk_version: Option<String>,
    /// Java source level
    pub source_compatibility: JavaVersion,
    /// Java bytecode level
    pub target_compatibility: JavaVersion,
    /// Kotlin JVM bytecode level
    pub kotlin_jvm_target: JavaVersion,
    /// Whether newer-JDK library APIs are backported
    pub core_library_desugaring: bool,
    /// Signing decision for this variant
    pub signing: SigningPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_version_parse_bare() {
        assert_eq!(JavaVersion::parse("11").unwrap(), JavaVersion::V11);
        assert_eq!(JavaVersion::parse("1.8").unwrap(), JavaVersion::V1_8);
        assert_eq!(JavaVersion::parse("8").unwrap(), JavaVersion::V1_8);
    }

    #[test]
    fn test_java_version_parse_gradle_spelling() {
        assert_eq!(JavaVersion::parse("VERSION_11").unwrap(), JavaVersion::V11);
        assert_eq!(JavaVersion::parse("VERSION_1_8").unwrap(), JavaVersion::V1_8);
    }

    #[test]
    fn test_java_version_parse_unsupported() {
        assert!(matches!(
            JavaVersion::parse("7"),
            Err(BuildCfgError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_store_load_typed_fields() {
        let store = SettingsStore::load([
            ("application_id", "com.example.besinova"),
            ("min_sdk", "23"),
            ("source_compatibility", "11"),
            ("core_library_desugaring", "true"),
        ])
        .unwrap();

        let layer = store.into_layer();
        assert_eq!(layer.application_id.as_deref(), Some("com.example.besinova"));
        assert_eq!(layer.min_sdk, Some(23));
        assert_eq!(layer.source_compatibility, Some(JavaVersion::V11));
        assert_eq!(layer.core_library_desugaring, Some(true));
    }

    #[test]
    fn test_store_duplicate_key_conflict() {
        let err = SettingsStore::load([("min_sdk", "21"), ("min_sdk", "23")]).unwrap_err();
        assert!(matches!(err, BuildCfgError::DuplicateKey { ref key, .. } if key == "min_sdk"));
    }

    #[test]
    fn test_store_duplicate_key_same_value_tolerated() {
        let store = SettingsStore::load([("min_sdk", "23"), ("min_sdk", "23")]).unwrap();
        assert_eq!(store.into_layer().min_sdk, Some(23));
    }

    #[test]
    fn test_store_unknown_key() {
        let err = SettingsStore::load([("mim_sdk", "23")]).unwrap_err();
        assert!(matches!(err, BuildCfgError::InvalidValue { ref key, .. } if key == "mim_sdk"));
    }

    #[test]
    fn test_store_get_missing_key() {
        let store = SettingsStore::load([("min_sdk", "23")]).unwrap();
        assert!(matches!(
            store.get("application_id"),
            Err(BuildCfgError::MissingKey(ref key)) if key == "application_id"
        ));
    }

    #[test]
    fn test_store_invalid_integer() {
        let err = SettingsStore::load([("target_sdk", "latest")]).unwrap_err();
        assert!(matches!(err, BuildCfgError::InvalidValue { ref key, .. } if key == "target_sdk"));
    }

    #[test]
    fn test_manifest_ref_display() {
        let manifest = DependencyManifestRef {
            platform: "com.google.firebase".to_string(),
            name: "firebase-bom".to_string(),
            version: "32.7.4".to_string(),
        };
        assert_eq!(manifest.to_string(), "com.google.firebase:firebase-bom:32.7.4");
    }

    #[test]
    fn test_empty_layer() {
        assert!(BuildSettings::default().is_empty());
        let mut layer = BuildSettings::default();
        layer.min_sdk = Some(23);
        assert!(!layer.is_empty());
    }
}
