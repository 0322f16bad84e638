//! Error types for image data and codec operations.
//!
//! Wraps the image model and converter errors and adds the failures only
//! the I/O layer can see: streams, codecs and texture targets.

use std::io;

use gorgon_core::{BufferFormat, ImageKind};
use gorgon_ops::OpsError;
use thiserror::Error;

/// Image data, codec or texture error.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Stream I/O error, including truncated reads.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream is not a file the codec understands.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    Decode(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    Encode(String),

    /// No registered codec handles the file.
    #[error("no codec for {0}")]
    NoCodec(String),

    /// Image and texture formats differ.
    #[error("format mismatch: image is {image}, texture is {texture}")]
    FormatMismatch {
        /// Image format.
        image: BufferFormat,
        /// Texture format.
        texture: BufferFormat,
    },

    /// Image and texture kinds differ.
    #[error("kind mismatch: image is {image}, texture is {texture}")]
    KindMismatch {
        /// Image kind.
        image: ImageKind,
        /// Texture kind.
        texture: ImageKind,
    },

    /// The texture cannot be written after creation.
    #[error("texture is immutable")]
    ImmutableTarget,

    /// The image was disposed.
    #[error("image data has been disposed")]
    Disposed,

    /// Error from the image model.
    #[error(transparent)]
    Core(#[from] gorgon_core::Error),

    /// Error from the pixel converter.
    #[error(transparent)]
    Ops(#[from] OpsError),
}

/// Result type for image data and codec operations.
pub type ImageResult<T> = Result<T, ImageError>;

impl ImageError {
    /// Returns `true` when a format could not be processed.
    pub fn is_unsupported(&self) -> bool {
        match self {
            Self::Core(e) => e.is_format_error(),
            Self::Ops(e) => e.is_unsupported(),
            _ => false,
        }
    }

    /// Returns `true` for mip, array or depth indices out of range.
    pub fn is_range_error(&self) -> bool {
        match self {
            Self::Core(e) => e.is_range_error(),
            Self::Ops(OpsError::Core(e)) => e.is_range_error(),
            _ => false,
        }
    }

    /// Returns `true` when a seed buffer or plane was too small.
    pub fn is_size_mismatch(&self) -> bool {
        matches!(self, Self::Core(gorgon_core::Error::SizeMismatch { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err: ImageError = gorgon_core::Error::unsupported_format(BufferFormat::Unknown).into();
        assert!(err.is_unsupported());
        assert!(!err.is_range_error());

        let err: ImageError = OpsError::UnsupportedFormat(BufferFormat::Bc1UNorm).into();
        assert!(err.is_unsupported());

        let err: ImageError = gorgon_core::Error::out_of_range("mip level", 4, 3).into();
        assert!(err.is_range_error());

        let err: ImageError = gorgon_core::Error::size_mismatch(16, 8).into();
        assert!(err.is_size_mismatch());
    }

    #[test]
    fn test_io_error_converts() {
        let err: ImageError = io::Error::new(io::ErrorKind::UnexpectedEof, "short").into();
        assert!(matches!(err, ImageError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
        assert!(err.to_string().starts_with("I/O error"));
    }
}
