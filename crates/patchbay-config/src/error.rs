//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, saving, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The configuration parsed but breaks a constraint.
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;
    use std::error::Error;

    fn mock_io_err() -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "mock")
    }

    #[test]
    fn io_variants_keep_path_and_source() {
        let err = ConfigError::read_file("/etc/patchbay/server.toml", mock_io_err());
        let msg = err.to_string();
        assert!(msg.contains("failed to read file"), "got: {msg}");
        assert!(msg.contains("/etc/patchbay/server.toml"), "got: {msg}");
        assert!(err.source().is_some());

        let err = ConfigError::write_file("/tmp/x.toml", mock_io_err());
        assert!(matches!(err, ConfigError::WriteFile { .. }));
        assert!(err.source().is_some());

        let err = ConfigError::create_dir("/tmp/dir", mock_io_err());
        assert!(err.to_string().contains("failed to create directory"));
    }

    #[test]
    fn toml_parse_converts() {
        let parse_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: ConfigError = parse_err.into();
        assert!(err.to_string().starts_with("failed to parse TOML"));
    }

    #[test]
    fn validation_converts() {
        let err: ConfigError = ValidationError::InvalidValue {
            field: "limits.max_aliases".into(),
            reason: "too many".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "validation failed: invalid value for 'limits.max_aliases': too many"
        );
        assert!(err.source().is_some());
    }
}
