//! Consistency validation for merged build settings
//!
//! Checks run in a fixed order and fail fast on the first violation: a
//! build descriptor is accepted or rejected wholesale, never partially.
//! Non-fatal findings (weak signing, bytecode-level drift) are collected as
//! warnings alongside a successful validation.

use crate::error::{BuildCfgError, Result};
use crate::settings::{
    BuildSettings, JavaVersion, SigningConfig, SigningPolicy, ValidatedSettings,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reverse-DNS package identity, at least two segments
static APPLICATION_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$")
        .expect("static application-id pattern")
});

/// The debug keystore fallback every project carries
pub const DEBUG_SIGNING_CONFIG: &str = "debug";

/// Non-fatal validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Field the finding concerns
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// Stable code for programmatic handling
    pub code: String,
}

/// Outcome of a successful validation pass
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    /// The immutable, fully-populated settings record
    pub settings: ValidatedSettings,
    /// Non-fatal findings collected during the pass
    pub warnings: Vec<ValidationWarning>,
}

/// Validate merged settings for one build type.
///
/// Check order: required identity fields, SDK-level ordering, signing
/// resolution. The first violation aborts validation with
/// [`BuildCfgError::Validation`] naming the offending field.
pub fn validate(
    settings: &BuildSettings,
    build_type: &str,
    signing_configs: &BTreeMap<String, SigningConfig>,
) -> Result<Validation> {
    let mut warnings = Vec::new();

    // (a) identity
    let application_id = require_string("application_id", settings.application_id.as_deref())?;
    if !APPLICATION_ID_RE.is_match(&application_id) {
        return Err(BuildCfgError::Validation {
            field: "application_id".to_string(),
            reason: format!(
                "`{application_id}` is not a dot-separated package identifier"
            ),
        });
    }
    let version_name = require_string("version_name", settings.version_name.as_deref())?;
    let version_code = require_field("version_code", settings.version_code)?;
    if version_code == 0 {
        return Err(BuildCfgError::Validation {
            field: "version_code".to_string(),
            reason: "must be a positive integer".to_string(),
        });
    }

    // (b) SDK-level ordering: min <= target <= compile
    let min_sdk = require_field("min_sdk", settings.min_sdk)?;
    let target_sdk = require_field("target_sdk", settings.target_sdk)?;
    let compile_sdk = require_field("compile_sdk", settings.compile_sdk)?;
    if target_sdk < min_sdk {
        return Err(BuildCfgError::Validation {
            field: "target_sdk".to_string(),
            reason: format!("target SDK {target_sdk} is below minimum SDK {min_sdk}"),
        });
    }
    if compile_sdk < target_sdk {
        return Err(BuildCfgError::Validation {
            field: "compile_sdk".to_string(),
            reason: format!("compile SDK {compile_sdk} is below target SDK {target_sdk}"),
        });
    }

    // (c) signing: every build type must resolve to a declared config
    let signing_ref = match (&settings.signing_config, build_type) {
        (Some(name), _) => name.clone(),
        (None, DEBUG_SIGNING_CONFIG) => DEBUG_SIGNING_CONFIG.to_string(),
        (None, _) => {
            return Err(BuildCfgError::Validation {
                field: "signing_config".to_string(),
                reason: format!("build type `{build_type}` selects no signing configuration"),
            })
        }
    };
    if !signing_configs.contains_key(&signing_ref) {
        return Err(BuildCfgError::Validation {
            field: "signing_config".to_string(),
            reason: format!(
                "build type `{build_type}` references undeclared signing configuration `{signing_ref}`"
            ),
        });
    }
    if build_type != DEBUG_SIGNING_CONFIG && signing_ref == DEBUG_SIGNING_CONFIG {
        // permitted, never silently dropped
        warnings.push(ValidationWarning {
            field: "signing_config".to_string(),
            message: format!(
                "build type `{build_type}` is signed with the debug keystore; artifacts are not distributable"
            ),
            code: "WEAK_SIGNING".to_string(),
        });
    }

    let source_compatibility = settings.source_compatibility.unwrap_or(JavaVersion::V11);
    let target_compatibility = settings.target_compatibility.unwrap_or(JavaVersion::V11);
    let kotlin_jvm_target = settings.kotlin_jvm_target.unwrap_or(target_compatibility);
    if kotlin_jvm_target != target_compatibility {
        warnings.push(ValidationWarning {
            field: "kotlin_jvm_target".to_string(),
            message: format!(
                "Kotlin JVM target {kotlin_jvm_target} differs from Java target compatibility {target_compatibility}"
            ),
            code: "JVM_TARGET_MISMATCH".to_string(),
        });
    }

    let settings = ValidatedSettings {
        namespace: settings
            .namespace
            .clone()
            .unwrap_or_else(|| application_id.clone()),
        application_id,
        min_sdk,
        target_sdk,
        compile_sdk,
        version_code,
        version_name,
        ndk_version: settings.ndk_version.clone(),
        source_compatibility,
        target_compatibility,
        kotlin_jvm_target,
        core_library_desugaring: settings.core_library_desugaring.unwrap_or(false),
        signing: SigningPolicy {
            build_type: build_type.to_string(),
            signing_config: signing_ref,
        },
    };

    Ok(Validation { settings, warnings })
}

fn require_field<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| BuildCfgError::Validation {
        field: field.to_string(),
        reason: "required field is missing".to_string(),
    })
}

fn require_string(field: &str, value: Option<&str>) -> Result<String> {
    let value = require_field(field, value)?;
    if value.trim().is_empty() {
        return Err(BuildCfgError::Validation {
            field: field.to_string(),
            reason: "required field is empty".to_string(),
        });
    }
    Ok(value.to_string())
}
