//! Texture upload seam.
//!
//! [`ImageData::copy_to_texture`] writes planes into anything implementing
//! [`TextureTarget`]. A GPU layer implements it over its own resources;
//! [`MemoryTexture`] is the CPU implementation.
//!
//! Subresources are numbered `mip + array * mip_count`.

use gorgon_core::{ImageKind, ImageSettings, Plane, Rect, Region};
use tracing::trace;

use crate::{ImageData, ImageError, ImageResult};

/// How a texture may be updated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureUsage {
    /// GPU read/write, updated by copies.
    #[default]
    Default,
    /// Updated often from the CPU.
    Dynamic,
    /// Contents fixed at creation.
    Immutable,
    /// CPU transfer resource.
    Staging,
}

/// Shape and format of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
    /// Shape class.
    pub kind: ImageKind,
    /// Pixel format.
    pub format: gorgon_core::BufferFormat,
    /// Width of mip 0.
    pub width: u32,
    /// Height of mip 0.
    pub height: u32,
    /// Depth of mip 0.
    pub depth: u32,
    /// Array elements (cube faces count individually).
    pub array_count: u32,
    /// Mip levels.
    pub mip_count: u32,
    /// Update policy.
    pub usage: TextureUsage,
}

impl TextureDesc {
    /// Describes a texture matching `settings`.
    pub fn from_settings(settings: &ImageSettings, usage: TextureUsage) -> Self {
        Self {
            kind: settings.kind,
            format: settings.format,
            width: settings.width,
            height: settings.height,
            depth: settings.depth,
            array_count: settings.array_count,
            mip_count: settings.mip_count,
            usage,
        }
    }

    /// The same shape as image settings.
    pub fn settings(&self) -> ImageSettings {
        ImageSettings {
            kind: self.kind,
            format: self.format,
            width: self.width,
            height: self.height,
            depth: self.depth,
            array_count: self.array_count,
            mip_count: self.mip_count,
        }
    }

    /// Subresource number of `(mip, array)`.
    #[inline]
    pub fn subresource(&self, mip: u32, array: u32) -> u32 {
        mip + array * self.mip_count
    }
}

/// Destination of [`ImageData::copy_to_texture`].
pub trait TextureTarget {
    /// Texture description.
    fn desc(&self) -> &TextureDesc;

    /// Writes `region` of `subresource` from `data`.
    ///
    /// `data` holds `region.depth()` slices `slice_pitch` bytes apart,
    /// each made of rows `row_pitch` bytes apart.
    fn write(
        &mut self,
        data: &[u8],
        row_pitch: usize,
        slice_pitch: usize,
        subresource: u32,
        region: Region,
    ) -> ImageResult<()>;
}

/// CPU texture backed by its own [`ImageData`].
#[derive(Debug, Clone)]
pub struct MemoryTexture {
    desc: TextureDesc,
    image: ImageData,
    writes: usize,
}

impl MemoryTexture {
    /// Creates a zeroed texture. The description is sanitized like image
    /// settings (a mip count of 0 becomes the full chain).
    pub fn new(desc: TextureDesc) -> ImageResult<Self> {
        let image = ImageData::new(&desc.settings())?;
        Ok(Self::from_image(image, desc.usage))
    }

    /// Wraps existing pixels; the only way to fill an immutable texture.
    pub fn from_image(image: ImageData, usage: TextureUsage) -> Self {
        Self {
            desc: TextureDesc::from_settings(image.settings(), usage),
            image,
            writes: 0,
        }
    }

    /// Pixels of the texture.
    #[inline]
    pub fn image(&self) -> &ImageData {
        &self.image
    }

    /// Consumes the texture, returning its pixels.
    pub fn into_image(self) -> ImageData {
        self.image
    }

    /// Number of accepted [`write`](TextureTarget::write) calls.
    #[inline]
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl TextureTarget for MemoryTexture {
    fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    fn write(
        &mut self,
        data: &[u8],
        row_pitch: usize,
        slice_pitch: usize,
        subresource: u32,
        region: Region,
    ) -> ImageResult<()> {
        if self.desc.usage == TextureUsage::Immutable {
            return Err(ImageError::ImmutableTarget);
        }
        let desc = self.desc;
        let count = desc.mip_count * desc.array_count;
        if subresource >= count {
            return Err(gorgon_core::Error::out_of_range("subresource", subresource, count).into());
        }
        let (mip, array) = (subresource % desc.mip_count, subresource / desc.mip_count);
        let s = self.image.settings();
        if region.is_empty() || !region.fits(s.mip_width(mip), s.mip_height(mip), s.mip_depth(mip)) {
            return Err(gorgon_core::Error::InvalidRegion {
                x: region.left,
                y: region.top,
                width: region.width(),
                height: region.height(),
                plane_width: s.mip_width(mip),
                plane_height: s.mip_height(mip),
            }
            .into());
        }
        trace!(subresource, %region, row_pitch, "memory texture write");

        let volume = desc.kind == ImageKind::Image3D;
        for (z, slice) in (region.front..region.back).enumerate() {
            let start = z * slice_pitch;
            let src = Plane::new(
                data.get(start..).unwrap_or(&[]),
                desc.format,
                region.width(),
                region.height(),
                row_pitch,
            )?;
            let mut dst = self.image.buffer_mut(mip, if volume { slice } else { array })?;
            src.copy_to(&mut dst, Rect::from_size(region.width(), region.height()), region.left, region.top)?;
        }
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gorgon_core::BufferFormat;

    #[test]
    fn test_subresource_numbering() {
        let settings = ImageSettings::new_2d(8, 8, BufferFormat::R8UNorm)
            .with_mip_count(4)
            .with_array_count(3);
        let desc = TextureDesc::from_settings(&settings, TextureUsage::Default);
        assert_eq!(desc.subresource(0, 0), 0);
        assert_eq!(desc.subresource(3, 0), 3);
        assert_eq!(desc.subresource(1, 2), 9);
    }

    #[test]
    fn test_write_region() {
        let desc = TextureDesc::from_settings(&ImageSettings::new_2d(4, 4, BufferFormat::R8UNorm), TextureUsage::Dynamic);
        let mut texture = MemoryTexture::new(desc).unwrap();
        texture.write(&[1, 2, 0, 3, 4], 3, 6, 0, Region::new(1, 2, 0, 3, 4, 1)).unwrap();
        let plane = texture.image().buffer(0, 0).unwrap();
        assert_eq!(plane.row(2), &[0, 1, 2, 0]);
        assert_eq!(plane.row(3), &[0, 3, 4, 0]);
        assert_eq!(texture.write_count(), 1);
    }

    #[test]
    fn test_write_rejects_bad_region() {
        let desc = TextureDesc::from_settings(&ImageSettings::new_2d(4, 4, BufferFormat::R8UNorm), TextureUsage::Default);
        let mut texture = MemoryTexture::new(desc).unwrap();
        let err = texture.write(&[0; 32], 8, 32, 0, Region::from_size(8, 4, 1)).unwrap_err();
        assert!(err.is_range_error());
        assert!(texture.write(&[0; 16], 4, 16, 1, Region::from_size(4, 4, 1)).is_err());
    }

    #[test]
    fn test_immutable_rejects_writes() {
        let image = ImageData::new(&ImageSettings::new_2d(2, 2, BufferFormat::R8UNorm)).unwrap();
        let mut texture = MemoryTexture::from_image(image, TextureUsage::Immutable);
        let err = texture.write(&[0; 4], 2, 4, 0, Region::from_size(2, 2, 1)).unwrap_err();
        assert!(matches!(err, ImageError::ImmutableTarget));
    }
}
