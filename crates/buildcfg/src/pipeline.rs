//! The resolution pipeline
//!
//! Linear flow per build type: base settings → override layers → validation
//! → dependency resolution. Each variant is independent and side-effect
//! free; a failure anywhere rejects the variant with no partial output.

use crate::descriptor::BuildDescriptor;
use crate::error::Result;
use crate::manifest::ManifestLookup;
use crate::merge::merge;
use crate::resolve::resolve;
use crate::settings::{BuildSettings, ResolvedDependency};
use crate::validate::{validate, ValidationWarning};
use serde::Serialize;
use std::collections::BTreeMap;

/// Fully resolved output for one build type
///
/// This is the record the external packaging toolchain consumes: flattened
/// validated settings plus the resolved dependency version table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedVariant {
    /// Build type this variant was resolved for
    pub build_type: String,
    /// Flattened, validated settings
    pub settings: crate::settings::ValidatedSettings,
    /// Resolved dependency table, keyed by name
    pub dependencies: BTreeMap<String, ResolvedDependency>,
    /// Non-fatal validation findings
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
}

/// Resolve one build type of a descriptor.
///
/// `extra_layers` are applied after the build-type layer, in order;
/// command-line overrides land here.
pub fn resolve_variant(
    descriptor: &BuildDescriptor,
    build_type: &str,
    extra_layers: &[BuildSettings],
    lookup: &dyn ManifestLookup,
) -> Result<ResolvedVariant> {
    let mut layers: Vec<BuildSettings> = Vec::with_capacity(extra_layers.len() + 1);
    layers.push(descriptor.build_type_layer(build_type)?.clone());
    layers.extend_from_slice(extra_layers);

    let merged = merge(&descriptor.android, &layers);
    let validation = validate(&merged, build_type, &descriptor.signing_configs)?;

    let dependencies = resolve(
        &descriptor.requested_dependencies(),
        &descriptor.dependencies.pins,
        descriptor.dependencies.manifest.as_ref(),
        lookup,
    )?;

    Ok(ResolvedVariant {
        build_type: build_type.to_string(),
        settings: validation.settings,
        dependencies,
        warnings: validation.warnings,
    })
}

/// Resolve every build type the descriptor declares, in stable order.
///
/// Fails on the first variant that does not validate or resolve; no
/// partial list is returned.
pub fn resolve_all(
    descriptor: &BuildDescriptor,
    extra_layers: &[BuildSettings],
    lookup: &dyn ManifestLookup,
) -> Result<Vec<ResolvedVariant>> {
    descriptor
        .build_type_names()
        .iter()
        .map(|build_type| resolve_variant(descriptor, build_type, extra_layers, lookup))
        .collect()
}
