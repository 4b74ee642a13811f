use std::path::PathBuf;

use crate::foundation::core::GridBox;
use crate::track::parse::TrackParseError;

/// Result alias used across sandtable.
pub type SandResult<T> = Result<T, SandError>;

/// Top-level error type for simulation, track loading, rendering and encoding.
#[derive(thiserror::Error, Debug)]
pub enum SandError {
    /// Invalid parameters or option combinations.
    #[error("validation error: {0}")]
    Validation(String),

    /// A track line could not be parsed into a waypoint.
    #[error("parse error: {0}")]
    Parse(#[from] TrackParseError),

    /// A file could not be read or written.
    #[error("io error: '{}': {source}", path.display())]
    Io {
        /// Path involved in the failed operation.
        path: PathBuf,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Relaxation hit the sweep cap before reaching a fixed point.
    #[error("relax error: sand did not settle after {sweeps} sweeps in {region}")]
    Unsettled {
        /// Number of sweeps performed.
        sweeps: u32,
        /// Grid region that was being relaxed.
        region: GridBox,
    },

    /// Height field rasterization or image IO failure.
    #[error("render error: {0}")]
    Render(String),

    /// Frame sink or ffmpeg failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Context-wrapped failure from a collaborator.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SandError {
    /// Build a [`SandError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SandError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SandError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`SandError::Io`] value for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
