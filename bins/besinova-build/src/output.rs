//! Terminal output for resolution results

use besinova_buildcfg::pipeline::ResolvedVariant;
use besinova_buildcfg::settings::VersionSource;
use besinova_buildcfg::validate::ValidationWarning;
use owo_colors::OwoColorize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.len()));
    }
}

/// Print validation warnings for one build type.
pub fn print_warnings(build_type: &str, warnings: &[ValidationWarning]) {
    for warning in warnings {
        Status::warning(&format!(
            "[{}] {} ({})",
            build_type, warning.message, warning.code
        ));
    }
}

/// Print a resolved variant as a human-readable report.
pub fn print_variant(variant: &ResolvedVariant) {
    Status::header(&format!("Build type: {}", variant.build_type));

    let s = &variant.settings;
    println!("  application id  {}", s.application_id);
    println!("  version         {} ({})", s.version_name, s.version_code);
    println!(
        "  SDK levels      min {} / target {} / compile {}",
        s.min_sdk, s.target_sdk, s.compile_sdk
    );
    println!(
        "  Java / Kotlin   source {} / target {} / jvm {}",
        s.source_compatibility, s.target_compatibility, s.kotlin_jvm_target
    );
    if let Some(ndk) = &s.ndk_version {
        println!("  NDK             {ndk}");
    }
    println!("  signing         {}", s.signing.signing_config);
    if s.core_library_desugaring {
        println!("  desugaring      enabled");
    }

    if !variant.dependencies.is_empty() {
        println!();
        let width = variant
            .dependencies
            .keys()
            .map(String::len)
            .max()
            .unwrap_or(0);
        for dependency in variant.dependencies.values() {
            println!(
                "  {:width$}  {}  {}",
                dependency.name,
                dependency.resolved_version,
                format_source(dependency.source_of_version).dimmed(),
            );
        }
    }

    print_warnings(&variant.build_type, &variant.warnings);
}

/// Short label for a version's provenance
pub fn format_source(source: VersionSource) -> &'static str {
    match source {
        VersionSource::ExplicitPin => "(pinned)",
        VersionSource::Manifest => "(manifest)",
        VersionSource::Default => "(default)",
    }
}
