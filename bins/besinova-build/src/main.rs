//! Besinova build-configuration CLI
//!
//! Validates build descriptors and resolves dependency versions for the
//! Besinova Android app.

mod output;

use besinova_buildcfg::descriptor::BuildDescriptor;
use besinova_buildcfg::error::{exit_codes, BuildCfgError};
use besinova_buildcfg::manifest::ManifestTable;
use besinova_buildcfg::merge::merge;
use besinova_buildcfg::pipeline::{resolve_all, resolve_variant, ResolvedVariant};
use besinova_buildcfg::settings::{BuildSettings, SettingsStore};
use besinova_buildcfg::validate::validate;
use clap::{Parser, Subcommand};
use output::{print_variant, print_warnings, Status};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "besinova-build")]
#[command(about = "Build-configuration validation and dependency resolution for Besinova")]
#[command(version)]
struct Cli {
    /// Build descriptor path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate merged settings without resolving dependencies
    Validate {
        /// Build type to validate (all declared types when omitted)
        #[arg(long)]
        build_type: Option<String>,

        /// Settings override, key=value; may repeat
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Run the full pipeline: merge, validate, resolve
    Resolve {
        /// Build type to resolve (all declared types when omitted)
        #[arg(long)]
        build_type: Option<String>,

        /// Emit the resolution report as JSON
        #[arg(long)]
        json: bool,

        /// Additional manifest table file; may repeat
        #[arg(long = "manifest", value_name = "PATH")]
        manifest: Vec<PathBuf>,

        /// Settings override, key=value; may repeat
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// List the version manifests the resolver knows about
    Manifests {
        /// Additional manifest table file; may repeat
        #[arg(long = "manifest", value_name = "PATH")]
        manifest: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    let exit_code = match cli.command {
        Commands::Validate { ref build_type, ref set } => run_validate(
            cli.config.as_deref(),
            build_type.as_deref(),
            set,
            cli.verbose,
            cli.quiet,
        ),
        Commands::Resolve { ref build_type, json, ref manifest, ref set } => run_resolve(
            cli.config.as_deref(),
            build_type.as_deref(),
            json,
            manifest,
            set,
            cli.verbose,
            cli.quiet,
        ),
        Commands::Manifests { ref manifest } => run_manifests(manifest),
    };

    std::process::exit(exit_code);
}

fn run_validate(
    config: Option<&std::path::Path>,
    build_type: Option<&str>,
    set: &[String],
    verbose: u8,
    quiet: bool,
) -> i32 {
    let descriptor = match BuildDescriptor::load(config) {
        Ok(descriptor) => descriptor,
        Err(e) => return fail(&e),
    };
    let overrides = match parse_overrides(set) {
        Ok(overrides) => overrides,
        Err(e) => return fail(&e),
    };

    let build_types = match build_type {
        Some(name) => vec![name.to_string()],
        None => descriptor.build_type_names(),
    };

    if verbose > 0 {
        Status::info(&format!(
            "validating build types: {}",
            build_types.join(", ")
        ));
    }

    for name in &build_types {
        let layer = match descriptor.build_type_layer(name) {
            Ok(layer) => layer.clone(),
            Err(e) => return fail(&e),
        };
        let mut layers = vec![layer];
        layers.extend_from_slice(&overrides);
        let merged = merge(&descriptor.android, &layers);

        match validate(&merged, name, &descriptor.signing_configs) {
            Ok(validation) => {
                print_warnings(name, &validation.warnings);
                if !quiet {
                    Status::success(&format!("{name}: settings are consistent"));
                }
            }
            Err(e) => return fail(&e),
        }
    }

    exit_codes::SUCCESS
}

fn run_resolve(
    config: Option<&std::path::Path>,
    build_type: Option<&str>,
    json: bool,
    manifest_paths: &[PathBuf],
    set: &[String],
    verbose: u8,
    quiet: bool,
) -> i32 {
    let descriptor = match BuildDescriptor::load(config) {
        Ok(descriptor) => descriptor,
        Err(e) => return fail(&e),
    };
    let overrides = match parse_overrides(set) {
        Ok(overrides) => overrides,
        Err(e) => return fail(&e),
    };
    let manifests = match load_manifests(manifest_paths) {
        Ok(manifests) => manifests,
        Err(e) => return fail(&e),
    };

    if verbose > 0 {
        Status::info(&format!(
            "consulting {} version manifest(s)",
            manifests.manifest_refs().len()
        ));
    }

    let variants: Vec<ResolvedVariant> = match build_type {
        Some(name) => match resolve_variant(&descriptor, name, &overrides, &manifests) {
            Ok(variant) => vec![variant],
            Err(e) => return fail(&e),
        },
        None => match resolve_all(&descriptor, &overrides, &manifests) {
            Ok(variants) => variants,
            Err(e) => return fail(&e),
        },
    };

    if json {
        match serde_json::to_string_pretty(&variants) {
            Ok(report) => println!("{report}"),
            Err(e) => {
                Status::error(&format!("failed to serialize report: {e}"));
                return exit_codes::FAILURE;
            }
        }
        return exit_codes::SUCCESS;
    }

    for variant in &variants {
        if quiet {
            print_warnings(&variant.build_type, &variant.warnings);
        } else {
            print_variant(variant);
        }
    }
    if !quiet {
        println!();
        Status::success(&format!("resolved {} build type(s)", variants.len()));
    }

    exit_codes::SUCCESS
}

fn run_manifests(manifest_paths: &[PathBuf]) -> i32 {
    let manifests = match load_manifests(manifest_paths) {
        Ok(manifests) => manifests,
        Err(e) => return fail(&e),
    };

    Status::header("Known version manifests");
    for manifest in manifests.manifest_refs() {
        println!(
            "  {}  ({} dependencies)",
            manifest,
            manifests.entry_count(&manifest)
        );
    }

    exit_codes::SUCCESS
}

/// Build one override layer from repeated `--set key=value` flags.
///
/// Conflicting repeats of the same key are rejected by the settings store.
fn parse_overrides(set: &[String]) -> Result<Vec<BuildSettings>, BuildCfgError> {
    if set.is_empty() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::with_capacity(set.len());
    for pair in set {
        let (key, value) = pair.split_once('=').ok_or_else(|| BuildCfgError::InvalidValue {
            key: pair.clone(),
            reason: "expected key=value".to_string(),
        })?;
        entries.push((key.trim().to_string(), value.trim().to_string()));
    }

    let store = SettingsStore::load(entries)?;
    Ok(vec![store.into_layer()])
}

fn load_manifests(paths: &[PathBuf]) -> Result<ManifestTable, BuildCfgError> {
    let mut manifests = ManifestTable::with_builtin();
    for path in paths {
        manifests.extend(ManifestTable::load(path)?);
    }
    Ok(manifests)
}

fn fail(error: &BuildCfgError) -> i32 {
    Status::error(&error.to_string());
    error.exit_code()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides_layer() {
        let layer = parse_overrides(&["min_sdk=24".to_string(), "signing_config=upload".to_string()])
            .unwrap();
        assert_eq!(layer.len(), 1);
        assert_eq!(layer[0].min_sdk, Some(24));
        assert_eq!(layer[0].signing_config.as_deref(), Some("upload"));
    }

    #[test]
    fn test_parse_overrides_rejects_bare_key() {
        let err = parse_overrides(&["min_sdk".to_string()]).unwrap_err();
        assert!(matches!(err, BuildCfgError::InvalidValue { .. }));
    }

    #[test]
    fn test_parse_overrides_rejects_conflicting_repeats() {
        let err = parse_overrides(&["min_sdk=24".to_string(), "min_sdk=26".to_string()])
            .unwrap_err();
        assert!(matches!(err, BuildCfgError::DuplicateKey { .. }));
    }

    #[test]
    fn test_no_overrides_means_no_layer() {
        assert!(parse_overrides(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_global_flags_parse() {
        let cli =
            Cli::try_parse_from(["besinova-build", "-vv", "--no-color", "validate"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_global_flags_default_off() {
        let cli = Cli::try_parse_from(["besinova-build", "resolve"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.no_color);
    }
}
