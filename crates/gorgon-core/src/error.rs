//! Error types for gorgon-core operations.
//!
//! Every failure the image model can detect while describing an image
//! (before any pixel is touched) is reported through [`Error`]:
//!
//! - **Configuration errors**: unknown or unsupported pixel formats, bad
//!   dimensions, seed buffers that are too small
//! - **Range errors**: mip level, array index or depth slice out of bounds
//!
//! # Usage
//!
//! ```rust
//! use gorgon_core::{Error, Result};
//!
//! fn check_mip(mip: u32, mip_count: u32) -> Result<()> {
//!     if mip >= mip_count {
//!         return Err(Error::out_of_range("mip level", mip, mip_count));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_mip(3, 2).unwrap_err().is_range_error());
//! ```

use thiserror::Error;

use crate::format::BufferFormat;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while describing, sizing or addressing an image.
///
/// # Categories
///
/// - **Format errors**: [`UnsupportedFormat`](Error::UnsupportedFormat), [`CannotCreate`](Error::CannotCreate),
///   [`FormatMismatch`](Error::FormatMismatch)
/// - **Dimension errors**: [`InvalidDimensions`](Error::InvalidDimensions)
/// - **Range errors**: [`OutOfRange`](Error::OutOfRange), [`InvalidRegion`](Error::InvalidRegion)
/// - **Size errors**: [`SizeMismatch`](Error::SizeMismatch)
#[derive(Debug, Error)]
pub enum Error {
    /// The pixel format has no usable descriptor (zero size).
    #[error("pixel format {format} is not supported")]
    UnsupportedFormat {
        /// Offending format.
        format: BufferFormat,
    },

    /// The image cannot be created with the requested settings.
    ///
    /// Raised for the `Unknown` format and for settings that can never
    /// describe an image.
    #[error("cannot create image: {reason}")]
    CannotCreate {
        /// Why creation was refused.
        reason: String,
    },

    /// Width, height, depth or array count is invalid.
    #[error("invalid dimensions {width}x{height}x{depth}: {reason}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Requested depth.
        depth: u32,
        /// Why the dimensions were rejected.
        reason: String,
    },

    /// An index (mip level, array index, depth slice) is out of bounds.
    #[error("{what} {value} is out of range (count {count})")]
    OutOfRange {
        /// Name of the indexed axis.
        what: &'static str,
        /// Requested index.
        value: u32,
        /// Number of valid entries.
        count: u32,
    },

    /// A rectangle or region does not fit the plane it addresses.
    #[error("region ({x}, {y}, {width}x{height}) exceeds plane {plane_width}x{plane_height}")]
    InvalidRegion {
        /// Region X origin.
        x: u32,
        /// Region Y origin.
        y: u32,
        /// Region width.
        width: u32,
        /// Region height.
        height: u32,
        /// Plane width.
        plane_width: u32,
        /// Plane height.
        plane_height: u32,
    },

    /// Two planes that must share a format do not.
    #[error("format mismatch: expected {expected}, found {actual}")]
    FormatMismatch {
        /// Format required by the operation.
        expected: BufferFormat,
        /// Format supplied.
        actual: BufferFormat,
    },

    /// A byte buffer is smaller than the layout requires.
    #[error("buffer holds {actual} bytes but {expected} are required")]
    SizeMismatch {
        /// Required size in bytes.
        expected: usize,
        /// Size supplied.
        actual: usize,
    },
}

impl Error {
    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: BufferFormat) -> Self {
        Self::UnsupportedFormat { format }
    }

    /// Creates an [`Error::CannotCreate`] error.
    #[inline]
    pub fn cannot_create(reason: impl Into<String>) -> Self {
        Self::CannotCreate {
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, depth: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            depth,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::OutOfRange`] error.
    #[inline]
    pub fn out_of_range(what: &'static str, value: u32, count: u32) -> Self {
        Self::OutOfRange { what, value, count }
    }

    /// Creates an [`Error::FormatMismatch`] error.
    #[inline]
    pub fn format_mismatch(expected: BufferFormat, actual: BufferFormat) -> Self {
        Self::FormatMismatch { expected, actual }
    }

    /// Creates an [`Error::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        Self::SizeMismatch { expected, actual }
    }

    /// Returns `true` for index and region errors.
    #[inline]
    pub fn is_range_error(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::InvalidRegion { .. })
    }

    /// Returns `true` for format errors.
    #[inline]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::CannotCreate { .. } | Self::FormatMismatch { .. }
        )
    }
}
