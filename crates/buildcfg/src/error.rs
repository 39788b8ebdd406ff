//! Error types for build-configuration resolution
//!
//! Every error is terminal for the current resolution attempt: all inputs
//! are local declarative data, so nothing is retried internally.

use thiserror::Error;

/// Result type alias used across the crate
pub type Result<T> = std::result::Result<T, BuildCfgError>;

/// Errors raised while loading, merging, validating, or resolving a build
/// descriptor.
#[derive(Error, Debug)]
pub enum BuildCfgError {
    /// The same settings key appeared twice in one layer with conflicting values.
    #[error("duplicate key `{key}`: `{first}` conflicts with `{second}`")]
    DuplicateKey {
        /// Offending settings key
        key: String,
        /// Value seen first
        first: String,
        /// Conflicting value seen later
        second: String,
    },

    /// A required key was absent after all layers were merged.
    #[error("missing required key `{0}`")]
    MissingKey(String),

    /// A settings value could not be parsed into its typed field.
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue {
        /// Offending settings key
        key: String,
        /// What made the value unacceptable
        reason: String,
    },

    /// The merged settings failed a consistency check.
    #[error("validation failed on `{field}`: {reason}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// What the check expected
        reason: String,
    },

    /// A requested dependency had no pin, no manifest entry, and no default.
    #[error("unresolved dependency `{name}` ({manifest})")]
    UnresolvedDependency {
        /// Dependency name as requested
        name: String,
        /// Manifest reference consulted, or "no manifest"
        manifest: String,
    },

    /// A build type was requested that the descriptor does not declare.
    #[error("unknown build type `{0}`")]
    UnknownBuildType(String),

    /// The build descriptor file could not be found.
    #[error("build descriptor not found: {0}")]
    DescriptorNotFound(String),

    /// Underlying filesystem failure while reading descriptor or manifest files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A descriptor or manifest file was not valid TOML for its schema.
    #[error("failed to parse {path}: {reason}")]
    Parse {
        /// File that failed to parse
        path: String,
        /// Parser diagnostic
        reason: String,
    },
}

impl BuildCfgError {
    /// Exit code the CLI should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => exit_codes::VALIDATION_ERROR,
            Self::DuplicateKey { .. }
            | Self::MissingKey(_)
            | Self::InvalidValue { .. }
            | Self::UnknownBuildType(_)
            | Self::DescriptorNotFound(_)
            | Self::Parse { .. } => exit_codes::CONFIG_ERROR,
            Self::UnresolvedDependency { .. } => exit_codes::RESOLUTION_ERROR,
            Self::Io(_) => exit_codes::FAILURE,
        }
    }
}

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Descriptor validated and resolved cleanly
    pub const SUCCESS: i32 = 0;
    /// Generic failure
    pub const FAILURE: i32 = 1;
    /// Merged settings failed a consistency check
    pub const VALIDATION_ERROR: i32 = 2;
    /// Descriptor missing, unparseable, or internally inconsistent
    pub const CONFIG_ERROR: i32 = 3;
    /// A dependency could not be given a version
    pub const RESOLUTION_ERROR: i32 = 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_exit_code() {
        let err = BuildCfgError::Validation {
            field: "target_sdk".to_string(),
            reason: "out of order".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::VALIDATION_ERROR);
    }

    #[test]
    fn test_unresolved_dependency_exit_code() {
        let err = BuildCfgError::UnresolvedDependency {
            name: "firebase-auth".to_string(),
            manifest: "no manifest".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::RESOLUTION_ERROR);
    }

    #[test]
    fn test_duplicate_key_display() {
        let err = BuildCfgError::DuplicateKey {
            key: "min_sdk".to_string(),
            first: "21".to_string(),
            second: "23".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate key `min_sdk`: `21` conflicts with `23`"
        );
    }
}
