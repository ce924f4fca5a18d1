//! Error types for exocomp-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while locating, loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file at any of the searched locations.
    #[error("configuration file not found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },

    /// Underlying I/O failure while reading the file.
    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error with the file path and serde_yaml line context.
    #[error("failed to parse configuration at {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A field is present but unusable.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
