//! The pixel converter capability and its CPU implementation.
//!
//! [`PixelConverter`] is what the image model calls for every plane it
//! converts, scales or crops. [`SoftwareConverter`] implements it by
//! decoding rows to RGBA `f32`, working there, and encoding back.
//!
//! # Example
//!
//! ```rust
//! use gorgon_core::{BufferFormat, Plane, PlaneMut};
//! use gorgon_ops::{Dithering, PixelConverter, SoftwareConverter};
//!
//! let src_bytes = [255u8, 0, 0, 255];
//! let src = Plane::new(&src_bytes, BufferFormat::R8G8B8A8UNorm, 1, 1, 4).unwrap();
//!
//! let mut dst_bytes = [0u8; 4];
//! let mut dst = PlaneMut::new(&mut dst_bytes, BufferFormat::B8G8R8A8UNorm, 1, 1, 4).unwrap();
//!
//! SoftwareConverter::new().convert_plane(&src, &mut dst, Dithering::None).unwrap();
//! assert_eq!(dst_bytes, [0, 0, 255, 255]);
//! ```

use gorgon_core::{BufferFormat, Plane, PlaneMut, Rect};
use tracing::trace;

use crate::dither::{Ditherer, Dithering};
use crate::encoding::{Encoding, Rgba};
use crate::parallel::for_each_row;
use crate::resize::{ImageFilter, resample};
use crate::{OpsError, OpsResult};

/// Per-plane format conversion, scaling and cropping.
///
/// Implementations must be usable from several threads; the image model
/// holds one converter and hands it planes one at a time.
pub trait PixelConverter: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Returns `true` if planes in `src` can be converted to `dst`.
    fn can_convert(&self, src: BufferFormat, dst: BufferFormat) -> bool;

    /// Returns `true` if planes in `format` can be processed at all.
    fn supports(&self, format: BufferFormat) -> bool {
        self.can_convert(format, format)
    }

    /// Returns `true` when `a` and `b` store pixels identically, so there
    /// is nothing to convert between them.
    fn same_encoding(&self, a: BufferFormat, b: BufferFormat) -> bool;

    /// Converts `src` into `dst`; both planes have the same size.
    fn convert_plane(&self, src: &Plane<'_>, dst: &mut PlaneMut<'_>, dithering: Dithering) -> OpsResult<()>;

    /// Scales `src` to the size of `dst`; both planes have the same format.
    fn scale_plane(&self, src: &Plane<'_>, dst: &mut PlaneMut<'_>, filter: ImageFilter) -> OpsResult<()>;

    /// Copies the region of `src` starting at `(offset_x, offset_y)` into the
    /// top-left of `dst`, clipped to both planes.
    fn crop_plane(&self, src: &Plane<'_>, dst: &mut PlaneMut<'_>, offset_x: u32, offset_y: u32) -> OpsResult<()>;
}

/// CPU implementation of [`PixelConverter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareConverter;

impl SoftwareConverter {
    /// Creates the converter.
    pub fn new() -> Self {
        Self
    }

    fn encoding(format: BufferFormat) -> OpsResult<Encoding> {
        Encoding::of(format).ok_or(OpsError::UnsupportedFormat(format))
    }
}

/// Decodes a whole plane to RGBA, row-major.
pub fn decode_plane(src: &Plane<'_>) -> OpsResult<Vec<Rgba>> {
    let enc = SoftwareConverter::encoding(src.format())?;
    let width = src.width() as usize;
    let mut pixels = vec![[0.0f32; 4]; width * src.height() as usize];
    for_each_row(&mut pixels, width, src.height() as usize, |y, row| {
        enc.decode_row(src.row_slice(y), row);
    });
    Ok(pixels)
}

/// Encodes row-major RGBA pixels into `dst`.
pub fn encode_plane(pixels: &[Rgba], dst: &mut PlaneMut<'_>) -> OpsResult<()> {
    let enc = SoftwareConverter::encoding(dst.format())?;
    let width = dst.width() as usize;
    if pixels.len() != width * dst.height() as usize {
        return Err(OpsError::SizeMismatch(format!(
            "{} pixels for a {}x{} plane",
            pixels.len(),
            dst.width(),
            dst.height()
        )));
    }
    let (pitch, rows, row_bytes) = (dst.row_pitch(), dst.rows(), dst.row_bytes());
    for_each_row(dst.as_bytes_mut(), pitch, rows, |y, row| {
        enc.encode_row(&pixels[y * width..(y + 1) * width], &mut row[..row_bytes]);
    });
    Ok(())
}

impl PixelConverter for SoftwareConverter {
    fn name(&self) -> &str {
        "software"
    }

    fn can_convert(&self, src: BufferFormat, dst: BufferFormat) -> bool {
        Encoding::of(src).is_some() && Encoding::of(dst).is_some()
    }

    fn same_encoding(&self, a: BufferFormat, b: BufferFormat) -> bool {
        match (Encoding::of(a), Encoding::of(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }

    fn convert_plane(&self, src: &Plane<'_>, dst: &mut PlaneMut<'_>, dithering: Dithering) -> OpsResult<()> {
        let (from, to) = (src.format(), dst.format());
        if src.width() != dst.width() || src.height() != dst.height() {
            return Err(OpsError::SizeMismatch(format!(
                "cannot convert {}x{} into {}x{}",
                src.width(),
                src.height(),
                dst.width(),
                dst.height()
            )));
        }
        let (Some(src_enc), Some(dst_enc)) = (Encoding::of(from), Encoding::of(to)) else {
            return Err(OpsError::UnsupportedConversion { from, to });
        };
        trace!(%from, %to, width = src.width(), height = src.height(), %dithering, "convert plane");

        if src_enc == dst_enc {
            for y in 0..src.rows() {
                dst.row_mut(y).copy_from_slice(src.row(y));
            }
            return Ok(());
        }

        let width = src.width() as usize;
        let mut ditherer = Ditherer::new(dithering, src_enc, dst_enc, width);
        let (pitch, rows, row_bytes) = (dst.row_pitch(), dst.rows(), dst.row_bytes());

        if ditherer.is_noop() || dithering.is_row_independent() {
            let ditherer = &ditherer;
            for_each_row(dst.as_bytes_mut(), pitch, rows, |y, row| {
                let mut pixels = vec![[0.0f32; 4]; width];
                src_enc.decode_row(src.row_slice(y), &mut pixels);
                ditherer.clone().apply(y, &mut pixels);
                dst_enc.encode_row(&pixels, &mut row[..row_bytes]);
            });
        } else {
            let mut pixels = vec![[0.0f32; 4]; width];
            for y in 0..rows {
                src_enc.decode_row(src.row(y), &mut pixels);
                ditherer.apply(y, &mut pixels);
                dst_enc.encode_row(&pixels, dst.row_mut(y));
            }
        }
        Ok(())
    }

    fn scale_plane(&self, src: &Plane<'_>, dst: &mut PlaneMut<'_>, filter: ImageFilter) -> OpsResult<()> {
        if src.format() != dst.format() {
            return Err(gorgon_core::Error::format_mismatch(src.format(), dst.format()).into());
        }
        Self::encoding(src.format())?;
        trace!(
            format = %src.format(),
            from = ?(src.width(), src.height()),
            to = ?(dst.width(), dst.height()),
            %filter,
            "scale plane"
        );

        if src.width() == dst.width() && src.height() == dst.height() {
            for y in 0..src.rows() {
                dst.row_mut(y).copy_from_slice(src.row(y));
            }
            return Ok(());
        }

        let pixels = decode_plane(src)?;
        let scaled = resample(
            &pixels,
            src.width() as usize,
            src.height() as usize,
            dst.width() as usize,
            dst.height() as usize,
            filter,
        )?;
        encode_plane(&scaled, dst)
    }

    fn crop_plane(&self, src: &Plane<'_>, dst: &mut PlaneMut<'_>, offset_x: u32, offset_y: u32) -> OpsResult<()> {
        let area = Rect::new(offset_x, offset_y, dst.width(), dst.height());
        trace!(format = %src.format(), %area, "crop plane");
        src.copy_to(dst, area, 0, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RGBA8: BufferFormat = BufferFormat::R8G8B8A8UNorm;

    fn plane(bytes: &[u8], format: BufferFormat, w: u32, h: u32) -> Plane<'_> {
        let pitch = bytes.len() / h as usize;
        Plane::new(bytes, format, w, h, pitch).unwrap()
    }

    #[test]
    fn test_capabilities() {
        let conv = SoftwareConverter::new();
        assert!(conv.supports(RGBA8));
        assert!(conv.can_convert(RGBA8, BufferFormat::R32G32B32A32Float));
        assert!(!conv.can_convert(RGBA8, BufferFormat::Bc1UNorm));
        assert!(!conv.supports(BufferFormat::D32Float));
        assert!(conv.same_encoding(RGBA8, BufferFormat::R8G8B8A8UNormSrgb));
        assert!(!conv.same_encoding(RGBA8, BufferFormat::B8G8R8A8UNorm));
    }

    #[test]
    fn test_convert_to_float_and_back() {
        let conv = SoftwareConverter::new();
        let src_bytes = [0u8, 64, 128, 255, 255, 255, 255, 0];
        let src = plane(&src_bytes, RGBA8, 2, 1);

        let mut float_bytes = vec![0u8; 32];
        let mut float = PlaneMut::new(&mut float_bytes, BufferFormat::R32G32B32A32Float, 2, 1, 32).unwrap();
        conv.convert_plane(&src, &mut float, Dithering::None).unwrap();

        let mut back_bytes = vec![0u8; 8];
        let mut back = PlaneMut::new(&mut back_bytes, RGBA8, 2, 1, 8).unwrap();
        conv.convert_plane(&float.as_plane(), &mut back, Dithering::None).unwrap();
        assert_eq!(back_bytes, src_bytes);
    }

    #[test]
    fn test_convert_respects_pitch_padding() {
        let conv = SoftwareConverter::new();
        // R8 3x2 with 4-byte rows into RG8 with 8-byte rows.
        let src_bytes = [10u8, 20, 30, 0, 40, 50, 60, 0];
        let src = Plane::new(&src_bytes, BufferFormat::R8UNorm, 3, 2, 4).unwrap();
        let mut dst_bytes = vec![0xAAu8; 16];
        let mut dst = PlaneMut::new(&mut dst_bytes, BufferFormat::R8G8UNorm, 3, 2, 8).unwrap();
        conv.convert_plane(&src, &mut dst, Dithering::None).unwrap();
        assert_eq!(&dst_bytes[..8], &[10, 0, 20, 0, 30, 0, 0xAA, 0xAA]);
        assert_eq!(&dst_bytes[8..14], &[40, 0, 50, 0, 60, 0]);
    }

    #[test]
    fn test_convert_rejects_unsupported() {
        let conv = SoftwareConverter::new();
        let src_bytes = [0u8; 8];
        let src = Plane::new(&src_bytes, BufferFormat::Bc1UNorm, 4, 4, 8).unwrap();
        let mut dst_bytes = [0u8; 64];
        let mut dst = PlaneMut::new(&mut dst_bytes, RGBA8, 4, 4, 16).unwrap();
        let err = conv.convert_plane(&src, &mut dst, Dithering::None).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_convert_size_mismatch() {
        let conv = SoftwareConverter::new();
        let src_bytes = [0u8; 8];
        let src = plane(&src_bytes, RGBA8, 2, 1);
        let mut dst_bytes = [0u8; 4];
        let mut dst = PlaneMut::new(&mut dst_bytes, RGBA8, 1, 1, 4).unwrap();
        assert!(matches!(
            conv.convert_plane(&src, &mut dst, Dithering::None),
            Err(OpsError::SizeMismatch(_))
        ));
    }

    #[test]
    fn test_dithering_keeps_values_in_range() {
        let conv = SoftwareConverter::new();
        let (w, h) = (16u32, 8u32);
        let src_bytes: Vec<u8> = (0..w * h * 4).map(|i| (i * 7 % 256) as u8).collect();
        let src = plane(&src_bytes, RGBA8, w, h);

        for mode in [Dithering::Ordered4x4, Dithering::Ordered8x8, Dithering::ErrorDiffusion] {
            let mut dst_bytes = vec![0u8; (w * h * 2) as usize];
            let mut dst = PlaneMut::new(&mut dst_bytes, BufferFormat::B4G4R4A4UNorm, w, h, (w * 2) as usize).unwrap();
            conv.convert_plane(&src, &mut dst, mode).unwrap();

            // Decoded channels stay in [0, 1].
            let pixels = decode_plane(&dst.as_plane()).unwrap();
            assert!(pixels.iter().flatten().all(|v| (0.0..=1.0).contains(v)));
        }

        let black = vec![0u8; (w * h * 4) as usize];
        let src = plane(&black, RGBA8, w, h);
        let mut dst_bytes = vec![0xFFu8; (w * h * 2) as usize];
        let mut dst = PlaneMut::new(&mut dst_bytes, BufferFormat::B5G6R5UNorm, w, h, (w * 2) as usize).unwrap();
        conv.convert_plane(&src, &mut dst, Dithering::Ordered8x8).unwrap();
        assert!(dst_bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_scale_halves_with_box() {
        let conv = SoftwareConverter::new();
        let src_bytes = [10u8, 20, 30, 40];
        let src = plane(&src_bytes, BufferFormat::R8UNorm, 2, 2);
        let mut dst_bytes = [0u8; 1];
        let mut dst = PlaneMut::new(&mut dst_bytes, BufferFormat::R8UNorm, 1, 1, 1).unwrap();
        conv.scale_plane(&src, &mut dst, ImageFilter::Fant).unwrap();
        assert_eq!(dst_bytes, [25]);
    }

    #[test]
    fn test_scale_requires_same_format() {
        let conv = SoftwareConverter::new();
        let src_bytes = [0u8; 4];
        let src = plane(&src_bytes, BufferFormat::R8UNorm, 2, 2);
        let mut dst_bytes = [0u8; 4];
        let mut dst = PlaneMut::new(&mut dst_bytes, RGBA8, 1, 1, 4).unwrap();
        assert!(conv.scale_plane(&src, &mut dst, ImageFilter::Point).is_err());
    }

    #[test]
    fn test_crop_copies_region() {
        let conv = SoftwareConverter::new();
        let src_bytes: Vec<u8> = (0..16).collect();
        let src = plane(&src_bytes, BufferFormat::R8UNorm, 4, 4);
        let mut dst_bytes = [0u8; 4];
        let mut dst = PlaneMut::new(&mut dst_bytes, BufferFormat::R8UNorm, 2, 2, 2).unwrap();
        conv.crop_plane(&src, &mut dst, 2, 1).unwrap();
        assert_eq!(dst_bytes, [6, 7, 10, 11]);
    }
}
