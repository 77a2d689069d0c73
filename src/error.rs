//! Error types for the platform library.

use thiserror::Error;

/// Errors raised while loading configuration or reading sensor input
#[derive(Debug, Error)]
pub enum Error {
    /// Platform geometry failed validation
    #[error("invalid platform geometry: {0}")]
    Geometry(String),

    /// Extension bounds do not fit the 16-bit wire format
    #[error("invalid extension bounds: min {min}, max {max} (need 0 <= min <= max <= 65535)")]
    ExtensionBounds {
        /// Requested lower bound
        min: i64,
        /// Requested upper bound
        max: i64,
    },

    /// A replay line could not be parsed
    #[error("replay line {line}: {source}")]
    Replay {
        /// 1-based line number in the replay stream
        line: usize,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Geometry file could not be parsed
    #[error("geometry file: {0}")]
    GeometryFile(#[from] serde_json::Error),

    /// Reading a file or the replay stream failed
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
