//! Owned image data: one allocation holding every plane of an image.
//!
//! [`ImageData`] pairs sanitized [`ImageSettings`] with the
//! [`BufferLayout`] built from them and a byte buffer of exactly
//! [`BufferLayout::size_in_bytes`] bytes. Planes are handed out as
//! [`Plane`]/[`PlaneMut`] views per buffer slot.
//!
//! Reshaping operations ([`generate_mip_maps`](ImageData::generate_mip_maps),
//! [`resize`](ImageData::resize), [`convert_format`](ImageData::convert_format))
//! build a complete replacement and then swap it in, so an error leaves
//! the image exactly as it was.
//!
//! # Example
//!
//! ```rust
//! use gorgon_core::{BufferFormat, ImageSettings};
//! use gorgon_io::ImageData;
//! use gorgon_ops::ImageFilter;
//!
//! let settings = ImageSettings::new_2d(256, 256, BufferFormat::R8G8B8A8UNorm);
//! let mut image = ImageData::new(&settings).unwrap();
//!
//! let mips = image.generate_mip_maps(0, ImageFilter::Fant).unwrap();
//! assert_eq!(mips, 9);
//! assert_eq!(image.slot(8, 0).unwrap().width, 1);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, SeekFrom, Write};
use std::path::Path;

use gorgon_core::pitch::row_count;
use gorgon_core::{
    BufferFormat, BufferLayout, BufferSlot, ImageKind, ImageSettings, PitchFlags, Plane, PlaneMut, Region,
    compute_pitch,
};
use gorgon_ops::{Dithering, ImageFilter, PixelConverter, SoftwareConverter};
use tracing::{debug, trace};

use crate::codec::{ImageCodec, ReadSeek};
use crate::registry::CodecRegistry;
use crate::texture::{TextureTarget, TextureUsage};
use crate::{ImageError, ImageResult};

#[derive(Clone)]
struct Storage {
    layout: BufferLayout,
    data: Vec<u8>,
}

/// Image pixels for every mip level, array element and depth slice.
///
/// Cloning copies the whole buffer.
#[derive(Clone)]
pub struct ImageData {
    settings: ImageSettings,
    flags: PitchFlags,
    storage: Option<Storage>,
}

impl ImageData {
    /// Allocates a zeroed image with tight row pitches.
    ///
    /// # Errors
    ///
    /// Any error of [`ImageSettings::sanitize`], `InvalidDimensions` when the
    /// buffer size overflows and `CannotCreate` when it cannot be allocated.
    pub fn new(settings: &ImageSettings) -> ImageResult<Self> {
        Self::with_pitch_flags(settings, PitchFlags::None)
    }

    /// Allocates a zeroed image with the given pitch rules.
    pub fn with_pitch_flags(settings: &ImageSettings, flags: PitchFlags) -> ImageResult<Self> {
        let layout = BufferLayout::new(settings, flags)?;
        let size = layout.size_in_bytes();
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|_| gorgon_core::Error::cannot_create(format!("cannot allocate {size} bytes for {settings}")))?;
        data.resize(size, 0);
        Ok(Self::from_parts(layout, data))
    }

    /// Adopts `data` as the pixel buffer.
    ///
    /// Bytes past the required size are dropped.
    ///
    /// # Errors
    ///
    /// A core `SizeMismatch` error when `data` is shorter than the layout;
    /// nothing is built in that case.
    pub fn from_vec(settings: &ImageSettings, data: Vec<u8>) -> ImageResult<Self> {
        Self::from_vec_with_flags(settings, PitchFlags::None, data)
    }

    /// Adopts `data` laid out with the given pitch rules.
    pub fn from_vec_with_flags(settings: &ImageSettings, flags: PitchFlags, mut data: Vec<u8>) -> ImageResult<Self> {
        let layout = BufferLayout::new(settings, flags)?;
        let size = layout.size_in_bytes();
        if data.len() < size {
            return Err(gorgon_core::Error::size_mismatch(size, data.len()).into());
        }
        data.truncate(size);
        Ok(Self::from_parts(layout, data))
    }

    /// Copies the image from `bytes`.
    ///
    /// # Errors
    ///
    /// Same as [`from_vec`](Self::from_vec).
    pub fn from_bytes(settings: &ImageSettings, bytes: &[u8]) -> ImageResult<Self> {
        let layout = BufferLayout::new(settings, PitchFlags::None)?;
        let size = layout.size_in_bytes();
        if bytes.len() < size {
            return Err(gorgon_core::Error::size_mismatch(size, bytes.len()).into());
        }
        Ok(Self::from_parts(layout, bytes[..size].to_vec()))
    }

    fn from_parts(layout: BufferLayout, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), layout.size_in_bytes());
        Self {
            settings: *layout.settings(),
            flags: layout.flags(),
            storage: Some(Storage { layout, data }),
        }
    }

    fn storage(&self) -> ImageResult<&Storage> {
        debug_assert!(self.storage.is_some(), "image data used after being disposed");
        self.storage.as_ref().ok_or(ImageError::Disposed)
    }

    fn storage_mut(&mut self) -> ImageResult<&mut Storage> {
        debug_assert!(self.storage.is_some(), "image data used after being disposed");
        self.storage.as_mut().ok_or(ImageError::Disposed)
    }

    // -- Accessors --

    /// Sanitized settings.
    #[inline]
    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> BufferFormat {
        self.settings.format
    }

    /// Pitch rules the buffer was laid out with.
    #[inline]
    pub fn pitch_flags(&self) -> PitchFlags {
        self.flags
    }

    /// Bytes held by the buffer (0 once disposed).
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.storage.as_ref().map_or(0, |s| s.data.len())
    }

    /// Returns `true` after [`dispose`](Self::dispose).
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.storage.is_none()
    }

    /// Buffer table (`None` once disposed).
    pub fn layout(&self) -> Option<&BufferLayout> {
        self.storage.as_ref().map(|s| &s.layout)
    }

    /// Every slot in layout order (empty once disposed).
    pub fn slots(&self) -> &[BufferSlot] {
        self.storage.as_ref().map_or(&[], |s| s.layout.slots())
    }

    /// Slot for `mip` and `index` (array index, or depth slice for 3D).
    ///
    /// # Errors
    ///
    /// A core `OutOfRange` error for indices past the end,
    /// [`ImageError::Disposed`] after disposal.
    pub fn slot(&self, mip: u32, index: u32) -> ImageResult<&BufferSlot> {
        Ok(self.storage()?.layout.slot(mip, index)?)
    }

    /// Depth slices at `mip`: 1 for non-3D images, 0 past the chain.
    pub fn depth_slice_count(&self, mip: u32) -> u32 {
        self.storage.as_ref().map_or(0, |s| s.layout.depth_slice_count(mip))
    }

    /// Read-only view of one plane.
    pub fn buffer(&self, mip: u32, index: u32) -> ImageResult<Plane<'_>> {
        let storage = self.storage()?;
        let slot = storage.layout.slot(mip, index)?;
        Ok(Plane::new(
            &storage.data[slot.range()],
            self.settings.format,
            slot.width,
            slot.height,
            slot.row_pitch,
        )?)
    }

    /// Mutable view of one plane.
    pub fn buffer_mut(&mut self, mip: u32, index: u32) -> ImageResult<PlaneMut<'_>> {
        let format = self.settings.format;
        let storage = self.storage_mut()?;
        let slot = *storage.layout.slot(mip, index)?;
        Ok(PlaneMut::new(
            &mut storage.data[slot.range()],
            format,
            slot.width,
            slot.height,
            slot.row_pitch,
        )?)
    }

    /// The whole buffer in layout order (empty once disposed).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.storage.as_ref().map_or(&[], |s| &s.data)
    }

    /// Mutable access to the whole buffer.
    pub fn as_bytes_mut(&mut self) -> ImageResult<&mut [u8]> {
        Ok(&mut self.storage_mut()?.data)
    }

    /// Raw bytes for serialization; [`from_vec`](Self::from_vec) with the
    /// same settings rebuilds an identical image.
    #[inline]
    pub fn save_raw(&self) -> &[u8] {
        self.as_bytes()
    }

    /// Owned copy of [`save_raw`](Self::save_raw).
    pub fn to_raw_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Releases the buffer and slot table. Calling it again does nothing.
    pub fn dispose(&mut self) {
        if self.storage.take().is_some() {
            trace!("disposed {}", self.settings);
        }
    }

    /// Replaces `self` with `next`; the old buffer is dropped.
    fn import(&mut self, next: ImageData) {
        let old = std::mem::replace(self, next);
        trace!(from = %old.settings, to = %self.settings, "imported replacement image");
    }

    // -- Texture upload --

    /// Copies planes into `target`, clipped to the smaller extents.
    ///
    /// `array_index` and `mip_level` select a single array element or mip
    /// level; `None` copies every one present in both. Returns the number
    /// of subresources written.
    ///
    /// # Errors
    ///
    /// - [`ImageError::ImmutableTarget`] for immutable textures
    /// - [`ImageError::FormatMismatch`] / [`ImageError::KindMismatch`]
    /// - a core `OutOfRange` error for a selection missing from either side
    pub fn copy_to_texture(
        &self,
        target: &mut dyn TextureTarget,
        array_index: Option<u32>,
        mip_level: Option<u32>,
    ) -> ImageResult<usize> {
        let storage = self.storage()?;
        let desc = *target.desc();
        let s = &self.settings;
        if desc.usage == TextureUsage::Immutable {
            return Err(ImageError::ImmutableTarget);
        }
        if desc.format != s.format {
            return Err(ImageError::FormatMismatch {
                image: s.format,
                texture: desc.format,
            });
        }
        if desc.kind != s.kind {
            return Err(ImageError::KindMismatch {
                image: s.kind,
                texture: desc.kind,
            });
        }

        let dst = desc.settings();
        let arrays = s.array_count.min(dst.array_count);
        let mips = s.mip_count.min(dst.mip_count);
        let array_range = select("array index", array_index, arrays)?;
        let mip_range = select("mip level", mip_level, mips)?;

        let mut written = 0;
        for array in array_range {
            for mip in mip_range.clone() {
                let width = s.mip_width(mip).min(dst.mip_width(mip));
                let height = s.mip_height(mip).min(dst.mip_height(mip));
                let depth = s.mip_depth(mip).min(dst.mip_depth(mip));
                let first = storage.layout.slot(mip, if s.kind == ImageKind::Image3D { 0 } else { array })?;
                let clipped = compute_pitch(width, height, s.format, self.flags)?;
                let region = Region::from_size(width, height, depth);
                let subresource = desc.subresource(mip, array);

                if clipped.row_pitch == first.row_pitch {
                    let start = first.offset;
                    let end = start + first.slice_pitch * depth as usize;
                    trace!(subresource, %region, "texture copy, direct");
                    target.write(&storage.data[start..end], first.row_pitch, first.slice_pitch, subresource, region)?;
                } else {
                    let rows = row_count(s.format, height);
                    let mut staging = Vec::with_capacity(clipped.slice_pitch * depth as usize);
                    for z in 0..depth as usize {
                        let base = first.offset + z * first.slice_pitch;
                        for r in 0..rows {
                            let row = base + r * first.row_pitch;
                            staging.extend_from_slice(&storage.data[row..row + clipped.row_pitch]);
                        }
                    }
                    trace!(subresource, %region, "texture copy, staged by row");
                    target.write(&staging, clipped.row_pitch, clipped.slice_pitch, subresource, region)?;
                }
                written += 1;
            }
        }
        debug!(written, "copied {} to texture", s);
        Ok(written)
    }

    // -- Reshaping --

    /// Builds `mip_count` mip levels with the software converter.
    ///
    /// See [`generate_mip_maps_with`](Self::generate_mip_maps_with).
    pub fn generate_mip_maps(&mut self, mip_count: u32, filter: ImageFilter) -> ImageResult<u32> {
        self.generate_mip_maps_with(&SoftwareConverter::new(), mip_count, filter)
    }

    /// Builds the mip chain from level 0.
    ///
    /// `mip_count` of 0 (or above the maximum) means the full chain. When
    /// the count equals the current one, lower levels are re-filtered in
    /// place; otherwise the image is rebuilt with the new count and mip 0
    /// copied verbatim. Level `m` is filtered from level `m - 1`; for 3D
    /// images destination slice `d` reads source slice `2d`. Returns the
    /// resulting mip count.
    ///
    /// # Errors
    ///
    /// A core `UnsupportedFormat` error when the converter cannot scale
    /// the format; the image is unchanged.
    pub fn generate_mip_maps_with(
        &mut self,
        converter: &dyn PixelConverter,
        mip_count: u32,
        filter: ImageFilter,
    ) -> ImageResult<u32> {
        self.storage()?;
        let s = self.settings;
        if !converter.supports(s.format) {
            return Err(gorgon_core::Error::unsupported_format(s.format).into());
        }
        let max = s.max_mip_count();
        let target = if mip_count == 0 || mip_count > max { max } else { mip_count };
        debug!(from = s.mip_count, to = target, %filter, converter = converter.name(), "generating mips for {s}");

        if target == s.mip_count {
            let mut next = self.clone();
            let dst = next.storage_mut()?;
            for mip in 1..target {
                filter_level(dst, converter, mip, filter)?;
            }
            self.import(next);
            return Ok(target);
        }

        let mut next = ImageData::with_pitch_flags(&s.with_mip_count(target), self.flags)?;
        {
            let src = self.storage()?;
            let dst = next.storage_mut()?;
            for index in 0..src.layout.plane_count(0) {
                let from = src.layout.slot(0, index)?;
                let to = *dst.layout.slot(0, index)?;
                dst.data[to.range()].copy_from_slice(&src.data[from.range()]);
            }
            for mip in 1..target {
                filter_level(dst, converter, mip, filter)?;
            }
        }
        self.import(next);
        Ok(target)
    }

    /// Resizes mip 0 with the software converter.
    ///
    /// See [`resize_with`](Self::resize_with).
    pub fn resize(&mut self, width: u32, height: u32, clip: bool, filter: ImageFilter) -> ImageResult<()> {
        self.resize_with(&SoftwareConverter::new(), width, height, clip, filter)
    }

    /// Resizes the image to `width x height`, keeping one mip level.
    ///
    /// With `clip` each plane is cropped (top-left region kept, new area
    /// zeroed); otherwise it is scaled with `filter`. 1D images keep a
    /// height of 1. Lower mips are dropped; regenerate them afterwards.
    ///
    /// # Errors
    ///
    /// - a core `OutOfRange` error for a zero width or height
    /// - a core `UnsupportedFormat` error when the format cannot be
    ///   scaled (or, with `clip`, is not byte addressable)
    pub fn resize_with(
        &mut self,
        converter: &dyn PixelConverter,
        width: u32,
        height: u32,
        clip: bool,
        filter: ImageFilter,
    ) -> ImageResult<()> {
        self.storage()?;
        let s = self.settings;
        let height = if s.kind == ImageKind::Image1D { 1 } else { height };
        if width == 0 {
            return Err(gorgon_core::Error::out_of_range("width", width, 0).into());
        }
        if height == 0 {
            return Err(gorgon_core::Error::out_of_range("height", height, 0).into());
        }
        if width == s.width && height == s.height {
            return Ok(());
        }

        let info = s.format_info();
        let processable = if clip {
            info.is_block_format() || info.bits_per_pixel % 8 == 0
        } else {
            converter.supports(s.format)
        };
        if !processable {
            return Err(gorgon_core::Error::unsupported_format(s.format).into());
        }
        debug!(width, height, clip, %filter, "resizing {s}");

        let resized = ImageSettings {
            width,
            height,
            mip_count: 1,
            ..s
        };
        let mut next = ImageData::with_pitch_flags(&resized, self.flags)?;
        let planes = self.storage()?.layout.plane_count(0);
        for index in 0..planes {
            let src = self.buffer(0, index)?;
            let mut dst = next.buffer_mut(0, index)?;
            if clip {
                converter.crop_plane(&src, &mut dst, 0, 0)?;
            } else {
                converter.scale_plane(&src, &mut dst, filter)?;
            }
        }
        self.import(next);
        Ok(())
    }

    /// Converts every plane with the software converter.
    ///
    /// See [`convert_format_with`](Self::convert_format_with).
    pub fn convert_format(&mut self, format: BufferFormat, dithering: Dithering) -> ImageResult<()> {
        self.convert_format_with(&SoftwareConverter::new(), format, dithering)
    }

    /// Converts the image to `format`.
    ///
    /// Nothing happens when `format` is the current one or shares its
    /// encoding (sRGB and linear variants); the image keeps its format.
    ///
    /// # Errors
    ///
    /// A core `UnsupportedFormat` error when either format has no
    /// converter encoding; conversion errors propagate and leave the image
    /// unchanged.
    pub fn convert_format_with(
        &mut self,
        converter: &dyn PixelConverter,
        format: BufferFormat,
        dithering: Dithering,
    ) -> ImageResult<()> {
        self.storage()?;
        let s = self.settings;
        if format == s.format {
            return Ok(());
        }
        for f in [s.format, format] {
            if !converter.supports(f) {
                return Err(gorgon_core::Error::unsupported_format(f).into());
            }
        }

        if converter.same_encoding(s.format, format) {
            debug!(from = %s.format, to = %format, "formats share an encoding, nothing to convert");
            return Ok(());
        }

        debug!(from = %s.format, to = %format, %dithering, "converting {s}");
        let mut next = ImageData::with_pitch_flags(&s.with_format(format), self.flags)?;
        {
            let src = self.storage()?;
            let dst = next.storage_mut()?;
            for (from, to) in src.layout.slots().iter().zip(dst.layout.slots()) {
                let src_plane = Plane::new(&src.data[from.range()], s.format, from.width, from.height, from.row_pitch)?;
                let mut dst_plane = PlaneMut::new(&mut dst.data[to.range()], format, to.width, to.height, to.row_pitch)?;
                converter.convert_plane(&src_plane, &mut dst_plane, dithering)?;
            }
        }
        self.import(next);
        Ok(())
    }

    // -- Codecs --

    /// Decodes an image from `stream` with `codec`.
    ///
    /// # Errors
    ///
    /// [`ImageError::InvalidFile`] when the codec does not recognize the
    /// stream; codec and stream errors as reported.
    pub fn load(codec: &dyn ImageCodec, stream: &mut dyn ReadSeek) -> ImageResult<Self> {
        if !codec.is_readable(stream)? {
            return Err(ImageError::InvalidFile(format!(
                "not a valid file for the {} codec",
                codec.name()
            )));
        }
        let start = stream.stream_position()?;
        let end = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(start))?;

        let decoded = codec.decode(stream, end - start)?;
        let image = Self::from_vec_with_flags(&decoded.settings, decoded.flags, decoded.data)?;
        debug!(codec = codec.name(), "loaded {}", image.settings);
        Ok(image)
    }

    /// Encodes the image to `stream` with `codec`.
    pub fn save(&self, codec: &dyn ImageCodec, stream: &mut dyn Write) -> ImageResult<()> {
        self.storage()?;
        codec.encode(self, stream)?;
        debug!(codec = codec.name(), "saved {}", self.settings);
        Ok(())
    }

    /// Loads a file, picking the codec by extension, then by content.
    ///
    /// # Errors
    ///
    /// [`ImageError::NoCodec`] when no registered codec claims the file.
    pub fn load_file<P: AsRef<Path>>(path: P, registry: &CodecRegistry) -> ImageResult<Self> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let codec = match registry.for_path(path) {
            Some(codec) => codec,
            None => registry
                .detect(&mut reader)?
                .ok_or_else(|| ImageError::NoCodec(path.display().to_string()))?,
        };
        Self::load(codec, &mut reader)
    }

    /// Saves to a file with the codec registered for its extension.
    pub fn save_file<P: AsRef<Path>>(&self, path: P, registry: &CodecRegistry) -> ImageResult<()> {
        let path = path.as_ref();
        let codec = registry
            .for_path(path)
            .ok_or_else(|| ImageError::NoCodec(path.display().to_string()))?;
        let mut writer = BufWriter::new(File::create(path)?);
        self.save(codec, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("settings", &self.settings)
            .field("flags", &self.flags)
            .field("size_in_bytes", &self.size_in_bytes())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Range of indices to visit: all of `0..count`, or just `selected`.
fn select(what: &'static str, selected: Option<u32>, count: u32) -> ImageResult<std::ops::Range<u32>> {
    match selected {
        None => Ok(0..count),
        Some(i) if i < count => Ok(i..i + 1),
        Some(i) => Err(gorgon_core::Error::out_of_range(what, i, count).into()),
    }
}

/// Re-filters every plane of `mip` from the level above it.
fn filter_level(
    storage: &mut Storage,
    converter: &dyn PixelConverter,
    mip: u32,
    filter: ImageFilter,
) -> ImageResult<()> {
    let layout = &storage.layout;
    let format = layout.settings().format;
    let volume = layout.settings().kind == ImageKind::Image3D;
    let above = layout.plane_count(mip - 1);

    for index in 0..layout.plane_count(mip) {
        let src_index = if volume { (2 * index).min(above - 1) } else { index };
        let src = *layout.slot(mip - 1, src_index)?;
        let dst = *layout.slot(mip, index)?;
        // Level m - 1 always precedes level m in the buffer.
        let (head, tail) = storage.data.split_at_mut(dst.offset);
        let src_plane = Plane::new(&head[src.range()], format, src.width, src.height, src.row_pitch)?;
        let mut dst_plane = PlaneMut::new(&mut tail[..dst.len()], format, dst.width, dst.height, dst.row_pitch)?;
        converter.scale_plane(&src_plane, &mut dst_plane, filter)?;
    }
    Ok(())
}
