//! Error types for pixel operations.

use gorgon_core::BufferFormat;
use thiserror::Error;

/// Error type for pixel operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Planes have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// The converter has no encoding for this format.
    #[error("pixel format {0} is not supported by the converter")]
    UnsupportedFormat(BufferFormat),

    /// The converter cannot convert between these formats.
    #[error("cannot convert {from} to {to}")]
    UnsupportedConversion {
        /// Source format.
        from: BufferFormat,
        /// Destination format.
        to: BufferFormat,
    },

    /// Error from the image model.
    #[error(transparent)]
    Core(#[from] gorgon_core::Error),
}

/// Result type for pixel operations.
pub type OpsResult<T> = Result<T, OpsError>;

impl OpsError {
    /// Returns `true` for errors caused by a format the converter lacks.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::UnsupportedConversion { .. }
        ) || matches!(self, Self::Core(e) if e.is_format_error())
    }
}
