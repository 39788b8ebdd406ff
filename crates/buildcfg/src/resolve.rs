//! Dependency version resolution
//!
//! Stateless request/response: each call folds the requested names through
//! the precedence chain explicit pin > referenced manifest > built-in
//! default table. Output is keyed by name in a `BTreeMap`, so the same
//! request against the same manifest reference always yields the same
//! table.

use crate::error::{BuildCfgError, Result};
use crate::manifest::ManifestLookup;
use crate::settings::{DependencyManifestRef, ResolvedDependency, VersionSource};
use once_cell::sync::Lazy;
use semver::Version;
use std::collections::BTreeMap;

/// Tooling dependencies with a known-good fallback version
///
/// Mirrors the versions the packaging toolchain would otherwise hard-code;
/// consulted only when a name has neither a pin nor a manifest entry.
static DEFAULT_VERSIONS: Lazy<BTreeMap<&'static str, Version>> = Lazy::new(|| {
    [("desugar_jdk_libs", "2.0.4")]
        .into_iter()
        .map(|(name, version)| (name, Version::parse(version).expect("static default version")))
        .collect()
});

/// Resolve a version for every requested dependency name.
///
/// Explicit pins always win; unpinned names consult the referenced
/// manifest, then the default table. A name absent from all three fails
/// the whole resolution with [`BuildCfgError::UnresolvedDependency`];
/// no partial table is ever returned.
pub fn resolve(
    requested: &[String],
    pins: &BTreeMap<String, Version>,
    manifest: Option<&DependencyManifestRef>,
    lookup: &dyn ManifestLookup,
) -> Result<BTreeMap<String, ResolvedDependency>> {
    let mut resolved = BTreeMap::new();

    for name in requested {
        if resolved.contains_key(name) {
            // same name requested twice resolves identically; skip
            continue;
        }
        let dependency = resolve_one(name, pins, manifest, lookup)?;
        resolved.insert(name.clone(), dependency);
    }

    Ok(resolved)
}

fn resolve_one(
    name: &str,
    pins: &BTreeMap<String, Version>,
    manifest: Option<&DependencyManifestRef>,
    lookup: &dyn ManifestLookup,
) -> Result<ResolvedDependency> {
    if let Some(version) = pins.get(name) {
        return Ok(ResolvedDependency {
            name: name.to_string(),
            resolved_version: version.clone(),
            source_of_version: VersionSource::ExplicitPin,
        });
    }

    if let Some(manifest) = manifest {
        if let Some(version) = lookup.lookup(manifest, name) {
            return Ok(ResolvedDependency {
                name: name.to_string(),
                resolved_version: version,
                source_of_version: VersionSource::Manifest,
            });
        }
    }

    if let Some(version) = DEFAULT_VERSIONS.get(name) {
        return Ok(ResolvedDependency {
            name: name.to_string(),
            resolved_version: version.clone(),
            source_of_version: VersionSource::Default,
        });
    }

    Err(BuildCfgError::UnresolvedDependency {
        name: name.to_string(),
        manifest: manifest.map_or_else(|| "no manifest".to_string(), ToString::to_string),
    })
}
