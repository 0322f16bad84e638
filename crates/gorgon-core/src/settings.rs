//! Image dimensions, kind and mip chain settings.
//!
//! [`ImageSettings`] describes the shape of an image before any memory is
//! allocated. Settings coming from callers or codecs go through
//! [`ImageSettings::sanitize`], which derives the values the layout relies
//! on (full mip chain, cube array rounding, forced axes per kind).
//!
//! # Example
//!
//! ```rust
//! use gorgon_core::format::BufferFormat;
//! use gorgon_core::settings::{ImageKind, ImageSettings};
//!
//! let settings = ImageSettings::new_2d(256, 256, BufferFormat::R8G8B8A8UNorm)
//!     .with_mip_count(0)
//!     .sanitize()
//!     .unwrap();
//! assert_eq!(settings.mip_count, 9);
//!
//! let cube = ImageSettings::new_2d(64, 64, BufferFormat::R8G8B8A8UNorm)
//!     .with_kind(ImageKind::ImageCube)
//!     .with_array_count(4)
//!     .sanitize()
//!     .unwrap();
//! assert_eq!(cube.array_count, 6);
//! ```

use std::fmt;

use crate::format::{BufferFormat, FormatInfo};
use crate::{Error, Result};

/// Shape class of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum ImageKind {
    /// One row of pixels; height and depth are always 1.
    Image1D = 1,
    /// Flat image, optionally an array.
    #[default]
    Image2D = 2,
    /// Cube map; array count is a multiple of 6 (one face per element).
    ImageCube = 3,
    /// Volume texture; array count is always 1.
    Image3D = 4,
}

impl ImageKind {
    /// Converts a stored discriminant back to a kind.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::Image1D),
            2 => Some(Self::Image2D),
            3 => Some(Self::ImageCube),
            4 => Some(Self::Image3D),
            _ => None,
        }
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Image1D => "1d",
            Self::Image2D => "2d",
            Self::ImageCube => "cube",
            Self::Image3D => "3d",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of mip levels produced by halving every axis until all reach 1.
///
/// ```rust
/// use gorgon_core::settings::max_mip_count;
///
/// assert_eq!(max_mip_count(256, 256, 1), 9);
/// assert_eq!(max_mip_count(1, 1, 1), 1);
/// assert_eq!(max_mip_count(300, 2, 17), 9);
/// ```
pub fn max_mip_count(width: u32, height: u32, depth: u32) -> u32 {
    let largest = width.max(height).max(depth).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Size of an axis at a mip level (floor halving, minimum 1).
#[inline]
pub const fn mip_extent(extent: u32, mip: u32) -> u32 {
    let shifted = if mip >= u32::BITS { 0 } else { extent >> mip };
    if shifted == 0 { 1 } else { shifted }
}

/// Dimensions, format and mip chain of an image.
///
/// `array_count` counts cube faces for [`ImageKind::ImageCube`] (so a
/// single cube has 6). A `mip_count` of 0 requests the full chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSettings {
    /// Shape class.
    pub kind: ImageKind,
    /// Pixel format.
    pub format: BufferFormat,
    /// Width of mip 0 in pixels.
    pub width: u32,
    /// Height of mip 0 in pixels.
    pub height: u32,
    /// Depth of mip 0 (3D only).
    pub depth: u32,
    /// Number of array elements (1D, 2D and cube only).
    pub array_count: u32,
    /// Number of mip levels; 0 means full chain.
    pub mip_count: u32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            kind: ImageKind::Image2D,
            format: BufferFormat::Unknown,
            width: 1,
            height: 1,
            depth: 1,
            array_count: 1,
            mip_count: 1,
        }
    }
}

impl ImageSettings {
    /// One-mip 1D image.
    pub fn new_1d(width: u32, format: BufferFormat) -> Self {
        Self {
            kind: ImageKind::Image1D,
            format,
            width,
            ..Self::default()
        }
    }

    /// One-mip 2D image.
    pub fn new_2d(width: u32, height: u32, format: BufferFormat) -> Self {
        Self {
            format,
            width,
            height,
            ..Self::default()
        }
    }

    /// One-mip cube map (6 faces).
    pub fn new_cube(size: u32, format: BufferFormat) -> Self {
        Self {
            kind: ImageKind::ImageCube,
            format,
            width: size,
            height: size,
            array_count: 6,
            ..Self::default()
        }
    }

    /// One-mip volume.
    pub fn new_3d(width: u32, height: u32, depth: u32, format: BufferFormat) -> Self {
        Self {
            kind: ImageKind::Image3D,
            format,
            width,
            height,
            depth,
            ..Self::default()
        }
    }

    /// Returns a copy with a different kind.
    pub fn with_kind(mut self, kind: ImageKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns a copy with a different format.
    pub fn with_format(mut self, format: BufferFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns a copy with a different mip count.
    pub fn with_mip_count(mut self, mip_count: u32) -> Self {
        self.mip_count = mip_count;
        self
    }

    /// Returns a copy with a different array count.
    pub fn with_array_count(mut self, array_count: u32) -> Self {
        self.array_count = array_count;
        self
    }

    /// Returns a copy with a different depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Maximum mip count for these dimensions.
    pub fn max_mip_count(&self) -> u32 {
        let depth = if self.kind == ImageKind::Image3D { self.depth } else { 1 };
        max_mip_count(self.width, self.height, depth)
    }

    /// Width at `mip`.
    #[inline]
    pub fn mip_width(&self, mip: u32) -> u32 {
        mip_extent(self.width, mip)
    }

    /// Height at `mip`.
    #[inline]
    pub fn mip_height(&self, mip: u32) -> u32 {
        mip_extent(self.height, mip)
    }

    /// Depth at `mip` (always 1 unless 3D).
    #[inline]
    pub fn mip_depth(&self, mip: u32) -> u32 {
        if self.kind == ImageKind::Image3D {
            mip_extent(self.depth, mip)
        } else {
            1
        }
    }

    /// Descriptor of the format.
    #[inline]
    pub fn format_info(&self) -> &'static FormatInfo {
        FormatInfo::lookup(self.format)
    }

    /// Validates the settings and derives the values the layout relies on.
    ///
    /// # Errors
    ///
    /// - [`Error::CannotCreate`] for [`BufferFormat::Unknown`]
    /// - [`Error::UnsupportedFormat`] for formats without a descriptor
    /// - [`Error::InvalidDimensions`] for zero width, height, depth or
    ///   array count
    pub fn sanitize(&self) -> Result<ImageSettings> {
        if self.format == BufferFormat::Unknown {
            return Err(Error::cannot_create("format is Unknown"));
        }
        if !self.format_info().is_supported() {
            return Err(Error::unsupported_format(self.format));
        }

        let mut s = *self;
        if s.kind == ImageKind::Image1D {
            s.height = 1;
        }
        if s.kind != ImageKind::Image3D {
            s.depth = 1;
        }

        if s.width == 0 || s.height == 0 || s.depth == 0 {
            return Err(Error::invalid_dimensions(
                s.width,
                s.height,
                s.depth,
                "width, height and depth must be at least 1",
            ));
        }

        match s.kind {
            ImageKind::Image3D => s.array_count = 1,
            _ if s.array_count == 0 => {
                return Err(Error::invalid_dimensions(
                    s.width,
                    s.height,
                    s.depth,
                    "array count must be at least 1",
                ));
            }
            ImageKind::ImageCube => {
                s.array_count = s.array_count.checked_next_multiple_of(6).ok_or_else(|| {
                    Error::invalid_dimensions(s.width, s.height, s.depth, "too many cube faces")
                })?;
            }
            _ => {}
        }

        let max = s.max_mip_count();
        if s.mip_count == 0 || s.mip_count > max {
            s.mip_count = max;
        }
        Ok(s)
    }
}

impl fmt::Display for ImageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.kind, self.width, self.height)?;
        if self.kind == ImageKind::Image3D {
            write!(f, "x{}", self.depth)?;
        }
        if self.array_count > 1 {
            write!(f, " [{}]", self.array_count)?;
        }
        write!(f, " {} mip(s) {}", self.mip_count, self.format)
    }
}
