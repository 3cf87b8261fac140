// filepath: src/error.rs
//! Error types for unlock-indicator
//!
//! The drawing core itself is total; only the edges that touch files,
//! fonts, images or the display can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Shared `Result` alias for the crate.
pub type Result<T> = std::result::Result<T, IndicatorError>;

#[derive(Debug, Error)]
pub enum IndicatorError {
    #[error("invalid color {value:?}: expected 6 hex digits")]
    InvalidColor { value: String },

    #[error("invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration parse failure: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("configuration serialization failure: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("failed to decode background image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to load font {path}: {details}")]
    Font { path: PathBuf, details: String },

    #[error("display failure: {details}")]
    Display { details: String },
}

impl IndicatorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn display(details: impl Into<String>) -> Self {
        Self::Display {
            details: details.into(),
        }
    }
}
