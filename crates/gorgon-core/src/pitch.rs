//! Row and slice pitch calculation.
//!
//! A pitch is the number of bytes between the start of consecutive rows
//! (row pitch) or consecutive 2D planes (slice pitch). Block formats are
//! measured in whole blocks, pixel formats in bits rounded up to bytes.
//!
//! ```rust
//! use gorgon_core::format::BufferFormat;
//! use gorgon_core::pitch::{compute_pitch, PitchFlags};
//!
//! let p = compute_pitch(10, 10, BufferFormat::Bc1UNorm, PitchFlags::None).unwrap();
//! assert_eq!(p.row_pitch, 3 * 8);
//! assert_eq!(p.slice_pitch, 3 * 3 * 8);
//!
//! let p = compute_pitch(3, 2, BufferFormat::R8G8B8A8UNorm, PitchFlags::None).unwrap();
//! assert_eq!((p.row_pitch, p.slice_pitch), (12, 24));
//! ```

use crate::format::{BufferFormat, FormatInfo};
use crate::{Error, Result};

/// Options altering row pitch alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PitchFlags {
    /// Tightly packed rows.
    #[default]
    None,
    /// Round uncompressed row pitches up to a multiple of the given byte
    /// count. Block formats ignore the alignment.
    LegacyDword(u32),
}

impl PitchFlags {
    /// Legacy DWORD alignment (4 bytes).
    pub const fn legacy_dword() -> Self {
        Self::LegacyDword(4)
    }
}

/// Row and slice pitch of one 2D plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pitch {
    /// Bytes per row (per row of blocks for block formats).
    pub row_pitch: usize,
    /// Bytes per 2D plane.
    pub slice_pitch: usize,
}

impl Pitch {
    /// Number of rows stored in one plane (block rows for block formats).
    #[inline]
    pub fn rows(&self) -> usize {
        if self.row_pitch == 0 {
            0
        } else {
            self.slice_pitch / self.row_pitch
        }
    }
}

/// Computes the pitch of a `width x height` plane in `format`.
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] when the format descriptor has zero size,
/// [`Error::InvalidDimensions`] when the plane size does not fit in `usize`.
pub fn compute_pitch(width: u32, height: u32, format: BufferFormat, flags: PitchFlags) -> Result<Pitch> {
    let info = FormatInfo::lookup(format);
    if !info.is_supported() {
        return Err(Error::unsupported_format(format));
    }
    pitch_for(info, width, height, flags).ok_or_else(|| too_large(width, height))
}

pub(crate) fn too_large(width: u32, height: u32) -> Error {
    Error::invalid_dimensions(width, height, 1, "plane size overflows the address space")
}

/// Pitch for an already validated descriptor; `None` on overflow.
pub(crate) fn pitch_for(info: &FormatInfo, width: u32, height: u32, flags: PitchFlags) -> Option<Pitch> {
    if info.is_block_format() {
        let blocks_wide = width.div_ceil(info.block_width).max(1) as usize;
        let blocks_high = height.div_ceil(info.block_height).max(1) as usize;
        let row_pitch = blocks_wide.checked_mul(info.block_bytes as usize)?;
        return Some(Pitch {
            row_pitch,
            slice_pitch: row_pitch.checked_mul(blocks_high)?,
        });
    }

    let bits = (width as usize).checked_mul(info.bits_per_pixel as usize)?;
    let mut row_pitch = bits.div_ceil(8);
    if let PitchFlags::LegacyDword(align) = flags {
        if align > 1 {
            row_pitch = row_pitch.checked_next_multiple_of(align as usize)?;
        }
    }
    Some(Pitch {
        row_pitch,
        slice_pitch: row_pitch.checked_mul(height as usize)?,
    })
}

/// Number of block rows (or pixel rows) a plane of `height` occupies.
pub fn row_count(format: BufferFormat, height: u32) -> usize {
    let info = FormatInfo::lookup(format);
    if info.is_block_format() {
        height.div_ceil(info.block_height).max(1) as usize
    } else {
        height as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncompressed_pitch() {
        let p = compute_pitch(256, 128, BufferFormat::R16G16B16A16Float, PitchFlags::None).unwrap();
        assert_eq!(p.row_pitch, 256 * 8);
        assert_eq!(p.slice_pitch, 256 * 8 * 128);
        assert_eq!(p.rows(), 128);
    }

    #[test]
    fn test_block_pitch_rounds_up_to_whole_blocks() {
        let p = compute_pitch(1, 1, BufferFormat::Bc3UNorm, PitchFlags::None).unwrap();
        assert_eq!(p.row_pitch, 16);
        assert_eq!(p.slice_pitch, 16);

        let p = compute_pitch(17, 9, BufferFormat::Bc7UNorm, PitchFlags::None).unwrap();
        assert_eq!(p.row_pitch, 5 * 16);
        assert_eq!(p.slice_pitch, 5 * 16 * 3);
        assert_eq!(p.rows(), 3);
    }

    #[test]
    fn test_packed_pair_pitch() {
        let p = compute_pitch(5, 3, BufferFormat::G8R8G8B8UNorm, PitchFlags::None).unwrap();
        assert_eq!(p.row_pitch, 3 * 4);
        assert_eq!(p.slice_pitch, 3 * 4 * 3);
    }

    #[test]
    fn test_one_bit_format() {
        let p = compute_pitch(13, 2, BufferFormat::R1UNorm, PitchFlags::None).unwrap();
        assert_eq!(p.row_pitch, 2);
        assert_eq!(p.slice_pitch, 4);
    }

    #[test]
    fn test_legacy_dword_alignment() {
        let p = compute_pitch(3, 2, BufferFormat::R8UNorm, PitchFlags::legacy_dword()).unwrap();
        assert_eq!(p.row_pitch, 4);
        assert_eq!(p.slice_pitch, 8);

        let p = compute_pitch(3, 2, BufferFormat::R8UNorm, PitchFlags::LegacyDword(16)).unwrap();
        assert_eq!(p.row_pitch, 16);

        // Block formats are already block aligned.
        let p = compute_pitch(4, 4, BufferFormat::Bc1UNorm, PitchFlags::LegacyDword(16)).unwrap();
        assert_eq!(p.row_pitch, 8);
    }

    #[test]
    fn test_unknown_format_fails() {
        let err = compute_pitch(4, 4, BufferFormat::Unknown, PitchFlags::None).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_huge_plane_is_an_error() {
        let err = compute_pitch(u32::MAX, u32::MAX, BufferFormat::R32G32B32A32Float, PitchFlags::None).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));

        let p = compute_pitch(u32::MAX, 1, BufferFormat::R32G32B32A32Float, PitchFlags::None).unwrap();
        assert_eq!(p.row_pitch, u32::MAX as usize * 16);
    }

    #[test]
    fn test_row_count() {
        assert_eq!(row_count(BufferFormat::Bc1UNorm, 9), 3);
        assert_eq!(row_count(BufferFormat::Bc1UNorm, 1), 1);
        assert_eq!(row_count(BufferFormat::R8UNorm, 9), 9);
    }
}
