//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

use crate::environment;

/// The errors that can be thrown when parsing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {}:{line}:{column}: {message}", file_path.display())]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("I/O error reading {}: {source}", file_path.display())]
    IoError {
        file_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The errors that can be thrown when writing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum WriteParsedConfigurationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("could not serialize the configuration: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// The errors that can be thrown when resolving a parsed configuration into the
/// configuration used at runtime.
#[derive(Debug, thiserror::Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("cannot resolve {setting}: {source}")]
    MissingEnvironmentVariable {
        setting: &'static str,
        #[source]
        source: environment::Error,
    },
    #[error("invalid value for {setting}: {message}")]
    InvalidValue {
        setting: &'static str,
        message: String,
    },
}
