//! Failures while reading, writing or checking `wavecap.toml`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationError;

/// Anything that can go wrong between disk and a validated [`AnalyzerConfig`].
///
/// [`AnalyzerConfig`]: crate::AnalyzerConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("cannot read config '{path}': {source}")]
    ReadFile {
        /// File that was opened.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: io::Error,
    },

    /// Config file could not be written.
    #[error("cannot write config '{path}': {source}")]
    WriteFile {
        /// File that was written.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: io::Error,
    },

    /// Parent directory could not be created.
    #[error("cannot create config directory '{path}': {source}")]
    CreateDir {
        /// Directory that was created.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: io::Error,
    },

    /// Text is not valid TOML for this format.
    #[error("invalid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Configuration could not be rendered as TOML.
    #[error("cannot render TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Values parsed but are unusable.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    /// [`ConfigError::ReadFile`] for `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::WriteFile`] for `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// [`ConfigError::CreateDir`] for `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn not_found() -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, "gone")
    }

    #[test]
    fn read_error_names_the_file() {
        let err = ConfigError::read_file("/etc/wavecap.toml", not_found());
        let msg = err.to_string();
        assert!(msg.starts_with("cannot read config"), "{msg}");
        assert!(msg.contains("/etc/wavecap.toml"), "{msg}");
        assert!(err.source().is_some());
    }

    #[test]
    fn create_dir_keeps_path() {
        let err = ConfigError::create_dir("/dir", not_found());
        assert!(
            matches!(err, ConfigError::CreateDir { ref path, .. } if path == std::path::Path::new("/dir"))
        );
    }

    #[test]
    fn validation_wraps() {
        let err = ConfigError::from(ValidationError::InvalidChannel(9));
        assert_eq!(err.to_string(), "validation failed: capture.channel 9 is not in 0..=7");
        assert!(err.source().is_some());
    }
}
