//! Borrowed views of one 2D plane.
//!
//! A plane is `rows` rows of `row_pitch` bytes, where a row is a pixel row
//! for pixel formats and a block row for block formats. [`Plane`] and
//! [`PlaneMut`] are the slice views handed out per buffer slot; the
//! converter, codecs and texture copies all work on them.

use crate::format::{BufferFormat, FormatInfo};
use crate::pitch::{compute_pitch, row_count};
use crate::rect::Rect;
use crate::{Error, Result};

/// Shape shared by [`Plane`] and [`PlaneMut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
    format: BufferFormat,
    width: u32,
    height: u32,
    row_pitch: usize,
    /// Bytes of a row that hold pixels (tight pitch).
    row_bytes: usize,
    rows: usize,
}

impl Shape {
    fn new(len: usize, format: BufferFormat, width: u32, height: u32, row_pitch: usize) -> Result<Self> {
        let tight = compute_pitch(width, height, format, Default::default())?;
        if row_pitch < tight.row_pitch {
            return Err(Error::size_mismatch(tight.row_pitch, row_pitch));
        }
        let rows = row_count(format, height);
        // The last row only needs its used bytes.
        let required = match rows {
            0 => 0,
            n => row_pitch * (n - 1) + tight.row_pitch,
        };
        if len < required {
            return Err(Error::size_mismatch(required, len));
        }
        Ok(Self {
            format,
            width,
            height,
            row_pitch,
            row_bytes: tight.row_pitch,
            rows,
        })
    }

    #[inline]
    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        let start = row * self.row_pitch;
        start..start + self.row_bytes
    }
}

/// Read-only view of a plane.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    shape: Shape,
    data: &'a [u8],
}

/// Mutable view of a plane.
#[derive(Debug)]
pub struct PlaneMut<'a> {
    shape: Shape,
    data: &'a mut [u8],
}

macro_rules! plane_accessors {
    () => {
        /// Pixel format.
        #[inline]
        pub fn format(&self) -> BufferFormat {
            self.shape.format
        }

        /// Width in pixels.
        #[inline]
        pub fn width(&self) -> u32 {
            self.shape.width
        }

        /// Height in pixels.
        #[inline]
        pub fn height(&self) -> u32 {
            self.shape.height
        }

        /// Bytes between row starts.
        #[inline]
        pub fn row_pitch(&self) -> usize {
            self.shape.row_pitch
        }

        /// Bytes of each row that hold pixel data.
        #[inline]
        pub fn row_bytes(&self) -> usize {
            self.shape.row_bytes
        }

        /// Number of stored rows (block rows for block formats).
        #[inline]
        pub fn rows(&self) -> usize {
            self.shape.rows
        }

        /// Format descriptor.
        #[inline]
        pub fn info(&self) -> &'static FormatInfo {
            FormatInfo::lookup(self.shape.format)
        }

        /// Bounds of the plane.
        #[inline]
        pub fn bounds(&self) -> Rect {
            Rect::from_size(self.shape.width, self.shape.height)
        }

        /// Raw bytes of the whole plane, padding included.
        #[inline]
        pub fn as_bytes(&self) -> &[u8] {
            &*self.data
        }

        /// Bytes of row `y`, without padding.
        ///
        /// # Panics
        ///
        /// Panics if `y >= rows()`.
        #[inline]
        pub fn row(&self, y: usize) -> &[u8] {
            assert!(y < self.shape.rows, "row {y} out of {}", self.shape.rows);
            &self.data[self.shape.row_range(y)]
        }
    };
}

impl<'a> Plane<'a> {
    /// Wraps `data` as a plane, checking it holds every row.
    ///
    /// # Errors
    ///
    /// [`Error::SizeMismatch`] when `data` or `row_pitch` is too small,
    /// [`Error::UnsupportedFormat`] for formats without a descriptor.
    pub fn new(data: &'a [u8], format: BufferFormat, width: u32, height: u32, row_pitch: usize) -> Result<Self> {
        let shape = Shape::new(data.len(), format, width, height, row_pitch)?;
        Ok(Self { shape, data })
    }

    plane_accessors!();

    /// Bytes of row `y` with the lifetime of the underlying buffer.
    #[inline]
    pub fn row_slice(&self, y: usize) -> &'a [u8] {
        assert!(y < self.shape.rows, "row {y} out of {}", self.shape.rows);
        &self.data[self.shape.row_range(y)]
    }

    /// Copies `source` (clipped to this plane) to `(x, y)` in `dst`.
    ///
    /// Block formats copy whole blocks covering the clipped rectangle.
    /// Returns the rectangle written in `dst`, or `None` when the clipped
    /// areas do not overlap.
    ///
    /// # Errors
    ///
    /// [`Error::FormatMismatch`] when the planes have different formats,
    /// [`Error::UnsupportedFormat`] for sub-byte pixel formats.
    pub fn copy_to(&self, dst: &mut PlaneMut<'_>, source: Rect, x: u32, y: u32) -> Result<Option<Rect>> {
        if dst.format() != self.format() {
            return Err(Error::format_mismatch(self.format(), dst.format()));
        }
        let info = self.info();
        let (unit_w, unit_h, unit_bytes) = if info.is_block_format() {
            (info.block_width, info.block_height, info.block_bytes as usize)
        } else if info.bits_per_pixel % 8 == 0 {
            (1, 1, info.bits_per_pixel as usize / 8)
        } else {
            return Err(Error::unsupported_format(info.format));
        };

        let Some(src) = source.clamp_to(self.width(), self.height()) else {
            return Ok(None);
        };
        let target = Rect::new(x + (src.x - source.x), y + (src.y - source.y), src.width, src.height);
        let Some(target) = target.clamp_to(dst.width(), dst.height()) else {
            return Ok(None);
        };
        let width = target.width.min(src.width);
        let height = target.height.min(src.height);

        let sx = (src.x / unit_w) as usize;
        let sy = (src.y / unit_h) as usize;
        let dx = (target.x / unit_w) as usize;
        let dy = (target.y / unit_h) as usize;
        let src_units_w = (src.x + width).div_ceil(unit_w) as usize - sx;
        let dst_units_w = (target.x + width).div_ceil(unit_w) as usize - dx;
        let units_w = src_units_w.min(dst_units_w);
        let src_units_h = (src.y + height).div_ceil(unit_h) as usize - sy;
        let dst_units_h = (target.y + height).div_ceil(unit_h) as usize - dy;
        let units_h = src_units_h.min(dst_units_h);

        let len = units_w * unit_bytes;
        for row in 0..units_h {
            let s = (sy + row) * self.row_pitch() + sx * unit_bytes;
            let d = (dy + row) * dst.row_pitch() + dx * unit_bytes;
            dst.data[d..d + len].copy_from_slice(&self.data[s..s + len]);
        }
        Ok(Some(Rect::new(target.x, target.y, width, height)))
    }
}

impl<'a> PlaneMut<'a> {
    /// Wraps `data` as a mutable plane, checking it holds every row.
    ///
    /// # Errors
    ///
    /// Same as [`Plane::new`].
    pub fn new(data: &'a mut [u8], format: BufferFormat, width: u32, height: u32, row_pitch: usize) -> Result<Self> {
        let shape = Shape::new(data.len(), format, width, height, row_pitch)?;
        Ok(Self { shape, data })
    }

    plane_accessors!();

    /// Read-only reborrow.
    #[inline]
    pub fn as_plane(&self) -> Plane<'_> {
        Plane {
            shape: self.shape,
            data: &*self.data,
        }
    }

    /// Raw mutable bytes of the whole plane, padding included.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Mutable bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= rows()`.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        assert!(y < self.shape.rows, "row {y} out of {}", self.shape.rows);
        let range = self.shape.row_range(y);
        &mut self.data[range]
    }

    /// Sets every pixel byte (padding excluded) to `value`.
    pub fn fill(&mut self, value: u8) {
        for y in 0..self.shape.rows {
            self.row_mut(y).fill(value);
        }
    }

    /// Repeats `pixel` over every row.
    ///
    /// # Errors
    ///
    /// [`Error::SizeMismatch`] when `pixel` is not one pixel (or one block)
    /// of the plane's format.
    pub fn fill_pixel(&mut self, pixel: &[u8]) -> Result<()> {
        let unit = self.info().size_in_bytes() as usize;
        let whole_bytes = self.info().is_block_format() || self.info().bits_per_pixel % 8 == 0;
        if pixel.len() != unit || !whole_bytes {
            return Err(Error::size_mismatch(unit, pixel.len()));
        }
        for y in 0..self.shape.rows {
            for chunk in self.row_mut(y).chunks_exact_mut(unit) {
                chunk.copy_from_slice(pixel);
            }
        }
        Ok(())
    }

    /// Consumes the view, returning the mutable buffer.
    #[inline]
    pub fn into_bytes(self) -> &'a mut [u8] {
        self.data
    }
}
