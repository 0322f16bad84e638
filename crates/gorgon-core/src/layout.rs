//! Flat buffer table for every plane of an image.
//!
//! All mip levels, array elements and depth slices of an image live in
//! one allocation. [`BufferLayout`] walks array elements (outer) and mip
//! levels (inner); for volume images an extra inner loop emits one slot
//! per depth slice of the level. Each [`BufferSlot`] covers exactly one
//! 2D plane and records where it starts.
//!
//! ```text
//! 2D array, 3 mips:          3D, depth 4, 3 mips:
//! [a0 m0][a0 m1][a0 m2]      [m0 d0][m0 d1][m0 d2][m0 d3]
//! [a1 m0][a1 m1][a1 m2]      [m1 d0][m1 d1]
//!                            [m2 d0]
//! ```

use std::ops::Range;

use crate::format::FormatInfo;
use crate::pitch::{PitchFlags, pitch_for, too_large};
use crate::settings::{ImageKind, ImageSettings, mip_extent};
use crate::{Error, Result};

/// One plane of the buffer table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferSlot {
    /// Mip level of the plane.
    pub mip_level: u32,
    /// Array index, or depth slice for 3D images.
    pub index: u32,
    /// Width at this mip.
    pub width: u32,
    /// Height at this mip.
    pub height: u32,
    /// Depth of the mip level this plane belongs to.
    pub depth: u32,
    /// Bytes per row.
    pub row_pitch: usize,
    /// Bytes in this plane.
    pub slice_pitch: usize,
    /// Byte offset of the plane inside the owning allocation.
    pub offset: usize,
}

impl BufferSlot {
    /// Byte length of the plane.
    #[inline]
    pub fn len(&self) -> usize {
        self.slice_pitch
    }

    /// Returns `true` for a zero-byte plane (never produced by a layout).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slice_pitch == 0
    }

    /// Byte range of the plane inside the allocation.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.slice_pitch
    }
}

/// Precomputed slot table for a set of sanitized settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferLayout {
    settings: ImageSettings,
    flags: PitchFlags,
    slots: Vec<BufferSlot>,
    /// `(first slot, slot count)` per `array * mip_count + mip`.
    lookup: Vec<(usize, u32)>,
    size: usize,
}

impl BufferLayout {
    /// Builds the table. `settings` are sanitized first.
    pub fn new(settings: &ImageSettings, flags: PitchFlags) -> Result<Self> {
        let settings = settings.sanitize()?;
        let info = settings.format_info();
        let size = checked_size(&settings, info, flags)?;

        let entries = (settings.array_count as usize)
            .checked_mul(settings.mip_count as usize)
            .ok_or_else(|| table_too_large(&settings))?;
        let slot_count = match settings.kind {
            ImageKind::Image3D => total_depth_slices(settings.depth, settings.mip_count) as usize,
            _ => entries,
        };
        let mut slots = Vec::new();
        slots.try_reserve_exact(slot_count).map_err(|_| table_too_large(&settings))?;
        let mut lookup = Vec::new();
        lookup.try_reserve_exact(entries).map_err(|_| table_too_large(&settings))?;
        let mut offset = 0usize;

        for array in 0..settings.array_count {
            for mip in 0..settings.mip_count {
                let width = mip_extent(settings.width, mip);
                let height = mip_extent(settings.height, mip);
                let depth = settings.mip_depth(mip);
                let pitch = pitch_for(info, width, height, flags).ok_or_else(|| too_large(width, height))?;

                let planes = if settings.kind == ImageKind::Image3D { depth } else { 1 };
                lookup.push((slots.len(), planes));
                for plane in 0..planes {
                    slots.push(BufferSlot {
                        mip_level: mip,
                        index: if settings.kind == ImageKind::Image3D { plane } else { array },
                        width,
                        height,
                        depth,
                        row_pitch: pitch.row_pitch,
                        slice_pitch: pitch.slice_pitch,
                        offset,
                    });
                    offset += pitch.slice_pitch;
                }
            }
        }

        debug_assert_eq!(offset, size);
        tracing::trace!(
            slots = slots.len(),
            bytes = offset,
            "built buffer layout for {settings}"
        );

        Ok(Self {
            settings,
            flags,
            slots,
            lookup,
            size: offset,
        })
    }

    /// Sanitized settings the table was built from.
    #[inline]
    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    /// Pitch flags the table was built with.
    #[inline]
    pub fn flags(&self) -> PitchFlags {
        self.flags
    }

    /// Total bytes covered by the table.
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.size
    }

    /// All slots in layout order.
    #[inline]
    pub fn slots(&self) -> &[BufferSlot] {
        &self.slots
    }

    /// Slot for `mip` and `index` (array index, or depth slice for 3D).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when either index is past the end.
    pub fn slot(&self, mip: u32, index: u32) -> Result<&BufferSlot> {
        let s = &self.settings;
        if mip >= s.mip_count {
            return Err(Error::out_of_range("mip level", mip, s.mip_count));
        }
        let (array, plane) = match s.kind {
            ImageKind::Image3D => (0, index),
            _ => (index, 0),
        };
        if array >= s.array_count {
            return Err(Error::out_of_range("array index", index, s.array_count));
        }
        let (first, count) = self.lookup[array as usize * s.mip_count as usize + mip as usize];
        if plane >= count {
            return Err(Error::out_of_range("depth slice", index, count));
        }
        Ok(&self.slots[first + plane as usize])
    }

    /// Number of depth slices at `mip` (1 unless 3D, 0 past the chain).
    pub fn depth_slice_count(&self, mip: u32) -> u32 {
        if mip >= self.settings.mip_count {
            return 0;
        }
        self.settings.mip_depth(mip)
    }

    /// Number of planes addressable with [`slot`](Self::slot) at `mip`:
    /// depth slices for 3D images, array elements otherwise.
    pub fn plane_count(&self, mip: u32) -> u32 {
        match self.settings.kind {
            ImageKind::Image3D => self.depth_slice_count(mip),
            _ => self.settings.array_count,
        }
    }
}

/// Sum over mips of `max(1, depth >> mip)`.
///
/// ```rust
/// use gorgon_core::layout::total_depth_slices;
///
/// assert_eq!(total_depth_slices(8, 4), 8 + 4 + 2 + 1);
/// assert_eq!(total_depth_slices(1, 5), 5);
/// ```
pub fn total_depth_slices(depth: u32, mip_count: u32) -> u32 {
    (0..mip_count).fold(0u32, |total, mip| total.saturating_add(mip_extent(depth, mip)))
}

/// Bytes needed for an image with `settings`, without building the table.
///
/// Always equals [`BufferLayout::size_in_bytes`] for the same arguments.
///
/// # Errors
///
/// Any error of [`ImageSettings::sanitize`], or
/// [`Error::InvalidDimensions`] when the total does not fit in `usize`.
pub fn size_in_bytes(settings: &ImageSettings, flags: PitchFlags) -> Result<usize> {
    let s = settings.sanitize()?;
    checked_size(&s, s.format_info(), flags)
}

/// Total size of sanitized settings, checked for overflow.
fn checked_size(s: &ImageSettings, info: &FormatInfo, flags: PitchFlags) -> Result<usize> {
    let overflow = || Error::invalid_dimensions(s.width, s.height, s.depth, "image size overflows the address space");
    let mut per_array = 0usize;
    for mip in 0..s.mip_count {
        let (width, height) = (s.mip_width(mip), s.mip_height(mip));
        let pitch = pitch_for(info, width, height, flags).ok_or_else(|| too_large(width, height))?;
        let level = pitch.slice_pitch.checked_mul(s.mip_depth(mip) as usize).ok_or_else(overflow)?;
        per_array = per_array.checked_add(level).ok_or_else(overflow)?;
    }
    per_array.checked_mul(s.array_count as usize).ok_or_else(overflow)
}

fn table_too_large(s: &ImageSettings) -> Error {
    Error::invalid_dimensions(s.width, s.height, s.depth, "buffer table cannot be allocated")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::BufferFormat;

    const RGBA8: BufferFormat = BufferFormat::R8G8B8A8UNorm;

    #[test]
    fn test_2d_single_mip() {
        let layout = BufferLayout::new(&ImageSettings::new_2d(4, 2, RGBA8), PitchFlags::None).unwrap();
        assert_eq!(layout.slots().len(), 1);
        let slot = layout.slot(0, 0).unwrap();
        assert_eq!((slot.row_pitch, slot.slice_pitch, slot.offset), (16, 32, 0));
        assert_eq!(layout.size_in_bytes(), 32);
    }

    #[test]
    fn test_array_outer_mip_inner() {
        let settings = ImageSettings::new_2d(4, 4, RGBA8).with_array_count(2).with_mip_count(3);
        let layout = BufferLayout::new(&settings, PitchFlags::None).unwrap();
        let order: Vec<_> = layout.slots().iter().map(|s| (s.index, s.mip_level)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);

        let per_array = 64 + 16 + 4;
        assert_eq!(layout.slot(0, 1).unwrap().offset, per_array);
        assert_eq!(layout.slot(2, 1).unwrap().offset, per_array + 64 + 16);
        assert_eq!(layout.size_in_bytes(), per_array * 2);
    }

    #[test]
    fn test_3d_slot_per_depth_slice() {
        let settings = ImageSettings::new_3d(4, 4, 4, RGBA8).with_mip_count(0);
        let layout = BufferLayout::new(&settings, PitchFlags::None).unwrap();
        assert_eq!(layout.settings().mip_count, 3);
        assert_eq!(layout.slots().len(), 4 + 2 + 1);
        assert_eq!(layout.depth_slice_count(0), 4);
        assert_eq!(layout.depth_slice_count(1), 2);
        assert_eq!(layout.depth_slice_count(2), 1);

        let slice = layout.slot(1, 1).unwrap();
        assert_eq!((slice.width, slice.height, slice.depth), (2, 2, 2));
        assert_eq!(slice.offset, 4 * 64 + 16);
        assert!(layout.slot(1, 2).unwrap_err().is_range_error());
        assert_eq!(layout.size_in_bytes(), 4 * 64 + 2 * 16 + 4);
    }

    #[test]
    fn test_cube_layout() {
        let settings = ImageSettings::new_cube(8, RGBA8).with_array_count(4).with_mip_count(0);
        let layout = BufferLayout::new(&settings, PitchFlags::None).unwrap();
        assert_eq!(layout.settings().array_count, 6);
        assert_eq!(layout.slots().len(), 6 * 4);
        assert_eq!(layout.plane_count(0), 6);
        assert_eq!(layout.depth_slice_count(0), 1);
    }

    #[test]
    fn test_out_of_range() {
        let settings = ImageSettings::new_2d(4, 4, RGBA8).with_array_count(2).with_mip_count(2);
        let layout = BufferLayout::new(&settings, PitchFlags::None).unwrap();
        assert!(layout.slot(2, 0).unwrap_err().is_range_error());
        assert!(layout.slot(0, 2).unwrap_err().is_range_error());
        assert_eq!(layout.depth_slice_count(5), 0);
    }

    #[test]
    fn test_slots_are_contiguous() {
        let settings = ImageSettings::new_2d(17, 9, BufferFormat::Bc1UNorm)
            .with_array_count(3)
            .with_mip_count(0);
        let layout = BufferLayout::new(&settings, PitchFlags::None).unwrap();
        let mut expected = 0;
        for slot in layout.slots() {
            assert_eq!(slot.offset, expected);
            expected += slot.len();
        }
        assert_eq!(expected, layout.size_in_bytes());
    }

    #[test]
    fn test_size_formula_matches_layout() {
        let cases = [
            ImageSettings::new_2d(256, 256, RGBA8).with_mip_count(0),
            ImageSettings::new_1d(100, BufferFormat::R1UNorm).with_mip_count(0),
            ImageSettings::new_3d(16, 8, 5, BufferFormat::R16G16B16A16Float).with_mip_count(0),
            ImageSettings::new_cube(32, BufferFormat::Bc7UNorm).with_array_count(12).with_mip_count(0),
            ImageSettings::new_2d(33, 7, BufferFormat::R8UNorm).with_array_count(3),
        ];
        for flags in [PitchFlags::None, PitchFlags::legacy_dword()] {
            for settings in &cases {
                let layout = BufferLayout::new(settings, flags).unwrap();
                let sum: usize = layout.slots().iter().map(|s| s.len()).sum();
                assert_eq!(sum, layout.size_in_bytes());
                assert_eq!(size_in_bytes(settings, flags).unwrap(), sum, "{settings}");
            }
        }
    }

    #[test]
    fn test_oversized_images_are_rejected() {
        let huge = [
            ImageSettings::new_2d(u32::MAX, u32::MAX, BufferFormat::R32G32B32A32Float),
            ImageSettings::new_2d(65536, 65536, BufferFormat::R32G32B32A32Float).with_array_count(u32::MAX),
            ImageSettings::new_3d(1 << 20, 1 << 20, 1 << 20, BufferFormat::R32G32B32A32Float),
        ];
        for settings in &huge {
            let err = BufferLayout::new(settings, PitchFlags::None).unwrap_err();
            assert!(matches!(err, Error::InvalidDimensions { .. }), "{settings}: {err}");
            assert!(matches!(size_in_bytes(settings, PitchFlags::None), Err(Error::InvalidDimensions { .. })));
        }
        assert_eq!(total_depth_slices(u32::MAX, 3), u32::MAX);
    }

    #[test]
    fn test_total_depth_slices() {
        assert_eq!(total_depth_slices(4, 3), 7);
        assert_eq!(total_depth_slices(5, 3), 5 + 2 + 1);
        assert_eq!(total_depth_slices(1, 1), 1);
    }
}
