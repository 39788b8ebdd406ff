//! Version manifest (BoM) lookup
//!
//! A manifest is a versioned table mapping dependency names to a mutually
//! compatible set of versions. How a manifest's data is sourced is an
//! external concern; the resolver only sees the [`ManifestLookup`]
//! capability, so tests substitute fake tables freely.

use crate::error::{BuildCfgError, Result};
use crate::settings::DependencyManifestRef;
use once_cell::sync::Lazy;
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Lookup capability over version manifests
///
/// The same `(manifest, name)` query must always yield the same answer;
/// implementations hold no hidden mutable state.
pub trait ManifestLookup {
    /// Version the given manifest pins `name` to, if the manifest knows it.
    fn lookup(&self, manifest: &DependencyManifestRef, name: &str) -> Option<Version>;
}

type ManifestKey = (String, String, String);

/// In-memory manifest table keyed by `(platform, name, version)`
#[derive(Debug, Clone, Default)]
pub struct ManifestTable {
    tables: BTreeMap<ManifestKey, BTreeMap<String, Version>>,
}

impl ManifestTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-loaded with the manifests this tool ships
    pub fn with_builtin() -> Self {
        BUILTIN.clone()
    }

    /// Register a manifest's dependency table.
    pub fn insert(&mut self, manifest: &DependencyManifestRef, entries: BTreeMap<String, Version>) {
        self.tables.insert(key_of(manifest), entries);
    }

    /// Absorb all manifests from another table; `other` wins on overlap.
    pub fn extend(&mut self, other: ManifestTable) {
        self.tables.extend(other.tables);
    }

    /// True when the table holds the referenced manifest.
    pub fn contains(&self, manifest: &DependencyManifestRef) -> bool {
        self.tables.contains_key(&key_of(manifest))
    }

    /// References of every manifest in the table, in stable order.
    pub fn manifest_refs(&self) -> Vec<DependencyManifestRef> {
        self.tables
            .keys()
            .map(|(platform, name, version)| DependencyManifestRef {
                platform: platform.clone(),
                name: name.clone(),
                version: version.clone(),
            })
            .collect()
    }

    /// Number of dependency entries in the referenced manifest.
    pub fn entry_count(&self, manifest: &DependencyManifestRef) -> usize {
        self.tables.get(&key_of(manifest)).map_or(0, BTreeMap::len)
    }

    /// Load manifest tables from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|err| match err {
            BuildCfgError::Parse { reason, .. } => BuildCfgError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Parse manifest tables from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ManifestFile = toml::from_str(content).map_err(|e| BuildCfgError::Parse {
            path: "<manifest>".to_string(),
            reason: e.to_string(),
        })?;

        let mut table = Self::new();
        for entry in file.manifest {
            let manifest = DependencyManifestRef {
                platform: entry.platform,
                name: entry.name,
                version: entry.version,
            };
            table.insert(&manifest, entry.dependencies);
        }
        Ok(table)
    }
}

impl ManifestLookup for ManifestTable {
    fn lookup(&self, manifest: &DependencyManifestRef, name: &str) -> Option<Version> {
        self.tables.get(&key_of(manifest))?.get(name).cloned()
    }
}

fn key_of(manifest: &DependencyManifestRef) -> ManifestKey {
    (
        manifest.platform.clone(),
        manifest.name.clone(),
        manifest.version.clone(),
    )
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    manifest: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    platform: String,
    name: String,
    version: String,
    #[serde(default)]
    dependencies: BTreeMap<String, Version>,
}

/// Firebase BoM tables the besinova descriptors reference
static BUILTIN: Lazy<ManifestTable> = Lazy::new(|| {
    let mut table = ManifestTable::new();
    table.insert(
        &firebase_bom("32.7.4"),
        firebase_entries(&[
            ("firebase-analytics", "21.5.1"),
            ("firebase-auth", "22.3.1"),
            ("firebase-config", "21.6.1"),
            ("firebase-crashlytics", "18.6.2"),
            ("firebase-firestore", "24.10.3"),
            ("firebase-messaging", "23.4.1"),
        ]),
    );
    table.insert(
        &firebase_bom("33.13.0"),
        firebase_entries(&[
            ("firebase-analytics", "22.4.0"),
            ("firebase-auth", "23.2.1"),
            ("firebase-config", "22.1.2"),
            ("firebase-crashlytics", "19.4.3"),
            ("firebase-firestore", "25.1.4"),
            ("firebase-messaging", "24.1.1"),
        ]),
    );
    table
});

fn firebase_bom(version: &str) -> DependencyManifestRef {
    DependencyManifestRef {
        platform: "com.google.firebase".to_string(),
        name: "firebase-bom".to_string(),
        version: version.to_string(),
    }
}

fn firebase_entries(pairs: &[(&str, &str)]) -> BTreeMap<String, Version> {
    pairs
        .iter()
        .map(|(name, version)| {
            (
                (*name).to_string(),
                Version::parse(version).expect("static manifest version"),
            )
        })
        .collect()
}
