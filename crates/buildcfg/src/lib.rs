//! Build-configuration resolution core for the Besinova Android app
//!
//! Validates and merges declarative build settings and resolves a
//! consistent set of dependency versions through a Bill-of-Materials (BoM)
//! indirection:
//!
//! - **Settings**: typed settings layers loaded from descriptor files or
//!   raw key/value pairs, with duplicate-key conflict detection
//! - **Merging**: explicit ordered override layers, last-writer-wins per
//!   field, pure and idempotent
//! - **Validation**: fail-fast consistency checks (identity, SDK-level
//!   ordering, signing resolution) with a warning channel for permitted
//!   but flagged configurations
//! - **Resolution**: explicit pin > manifest > default precedence over an
//!   injected manifest lookup, deterministic output
//!
//! # Example
//!
//! ```rust,no_run
//! use besinova_buildcfg::descriptor::BuildDescriptor;
//! use besinova_buildcfg::manifest::ManifestTable;
//! use besinova_buildcfg::pipeline::resolve_all;
//!
//! let descriptor = BuildDescriptor::load(None).expect("descriptor");
//! let manifests = ManifestTable::with_builtin();
//! for variant in resolve_all(&descriptor, &[], &manifests).expect("resolution") {
//!     println!("{}: {} dependencies", variant.build_type, variant.dependencies.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod pipeline;
pub mod resolve;
pub mod settings;
pub mod validate;

pub use error::{BuildCfgError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::descriptor::BuildDescriptor;
    pub use crate::error::{exit_codes, BuildCfgError, Result};
    pub use crate::manifest::{ManifestLookup, ManifestTable};
    pub use crate::merge::merge;
    pub use crate::pipeline::{resolve_all, resolve_variant, ResolvedVariant};
    pub use crate::resolve::resolve;
    pub use crate::settings::{
        BuildSettings, DependencyManifestRef, JavaVersion, ResolvedDependency, SettingsStore,
        SigningConfig, SigningPolicy, ValidatedSettings, VersionSource,
    };
    pub use crate::validate::{validate, Validation, ValidationWarning};
}
