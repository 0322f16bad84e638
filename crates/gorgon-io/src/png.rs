//! PNG codec.
//!
//! Decoding expands palettes, low bit depths and `tRNS` transparency, so
//! every PNG lands in one of four formats:
//!
//! | PNG | Format |
//! |-----|--------|
//! | gray 1-8 bit | `R8_UNorm` |
//! | gray 16 bit | `R16_UNorm` |
//! | gray+alpha, RGB, RGBA, palette 8 bit | `R8G8B8A8_UNorm` |
//! | gray+alpha, RGB, RGBA 16 bit | `R16G16B16A16_UNorm` |
//!
//! Encoding writes mip 0 of array element 0 of 1D and 2D images.

use std::io::{BufReader, Write};

use gorgon_core::{BufferFormat, ImageKind, ImageSettings, PitchFlags};

use crate::codec::{DecodedImage, ImageCodec, ReadSeek, peek};
use crate::{ImageData, ImageError, ImageResult};

/// PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Codec for PNG files.
#[derive(Debug, Clone, Copy)]
pub struct PngCodec {
    compression: ::png::Compression,
}

impl Default for PngCodec {
    fn default() -> Self {
        Self {
            compression: ::png::Compression::default(),
        }
    }
}

impl PngCodec {
    /// Creates the codec with default compression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level used when encoding.
    pub fn with_compression(mut self, compression: ::png::Compression) -> Self {
        self.compression = compression;
        self
    }
}

/// Byte-swaps 16-bit samples (PNG is big-endian, buffers little-endian).
fn swap16(bytes: &[u8]) -> Vec<u8> {
    bytes.chunks_exact(2).flat_map(|c| [c[1], c[0]]).collect()
}

impl ImageCodec for PngCodec {
    fn name(&self) -> &'static str {
        "PNG"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png"]
    }

    fn is_readable(&self, stream: &mut dyn ReadSeek) -> ImageResult<bool> {
        Ok(peek(stream, SIGNATURE.len())? == SIGNATURE)
    }

    fn decode(&self, stream: &mut dyn ReadSeek, _byte_len: u64) -> ImageResult<DecodedImage> {
        use ::png::{BitDepth, ColorType};

        let mut decoder = ::png::Decoder::new(BufReader::new(stream));
        decoder.set_transformations(::png::Transformations::EXPAND);
        let mut reader = decoder.read_info().map_err(|e| ImageError::Decode(e.to_string()))?;

        let buf_size = reader
            .output_buffer_size()
            .ok_or_else(|| ImageError::Decode("cannot determine output buffer size".into()))?;
        let mut buf = vec![0u8; buf_size];
        let info = reader.next_frame(&mut buf).map_err(|e| ImageError::Decode(e.to_string()))?;
        let bytes = &buf[..info.buffer_size()];

        let (format, data) = match (info.color_type, info.bit_depth) {
            (ColorType::Grayscale, BitDepth::Eight) => (BufferFormat::R8UNorm, bytes.to_vec()),
            (ColorType::Grayscale, BitDepth::Sixteen) => (BufferFormat::R16UNorm, swap16(bytes)),
            (ColorType::GrayscaleAlpha, BitDepth::Eight) => (
                BufferFormat::R8G8B8A8UNorm,
                bytes.chunks_exact(2).flat_map(|c| [c[0], c[0], c[0], c[1]]).collect(),
            ),
            (ColorType::GrayscaleAlpha, BitDepth::Sixteen) => (
                BufferFormat::R16G16B16A16UNorm,
                bytes
                    .chunks_exact(4)
                    .flat_map(|c| [c[1], c[0], c[1], c[0], c[1], c[0], c[3], c[2]])
                    .collect(),
            ),
            (ColorType::Rgb, BitDepth::Eight) => (
                BufferFormat::R8G8B8A8UNorm,
                bytes.chunks_exact(3).flat_map(|c| [c[0], c[1], c[2], 0xFF]).collect(),
            ),
            (ColorType::Rgb, BitDepth::Sixteen) => (
                BufferFormat::R16G16B16A16UNorm,
                bytes
                    .chunks_exact(6)
                    .flat_map(|c| [c[1], c[0], c[3], c[2], c[5], c[4], 0xFF, 0xFF])
                    .collect(),
            ),
            (ColorType::Rgba, BitDepth::Eight) => (BufferFormat::R8G8B8A8UNorm, bytes.to_vec()),
            (ColorType::Rgba, BitDepth::Sixteen) => (BufferFormat::R16G16B16A16UNorm, swap16(bytes)),
            (color, depth) => {
                return Err(ImageError::Decode(format!("unsupported PNG layout {color:?} {depth:?}")));
            }
        };

        Ok(DecodedImage {
            settings: ImageSettings::new_2d(info.width, info.height, format),
            flags: PitchFlags::None,
            data,
        })
    }

    fn encode(&self, image: &ImageData, stream: &mut dyn Write) -> ImageResult<()> {
        use ::png::{BitDepth, ColorType};

        let s = image.settings();
        if !matches!(s.kind, ImageKind::Image1D | ImageKind::Image2D) {
            return Err(ImageError::Encode(format!("PNG cannot store {} images", s.kind)));
        }
        let plane = image.buffer(0, 0)?;
        let mut tight = Vec::with_capacity(plane.row_bytes() * plane.rows());
        for y in 0..plane.rows() {
            tight.extend_from_slice(plane.row(y));
        }

        let (color, depth, data) = match s.format {
            BufferFormat::R8UNorm => (ColorType::Grayscale, BitDepth::Eight, tight),
            BufferFormat::R16UNorm => (ColorType::Grayscale, BitDepth::Sixteen, swap16(&tight)),
            BufferFormat::R8G8B8A8UNorm | BufferFormat::R8G8B8A8UNormSrgb => (ColorType::Rgba, BitDepth::Eight, tight),
            BufferFormat::B8G8R8A8UNorm | BufferFormat::B8G8R8A8UNormSrgb => (
                ColorType::Rgba,
                BitDepth::Eight,
                tight.chunks_exact(4).flat_map(|c| [c[2], c[1], c[0], c[3]]).collect(),
            ),
            BufferFormat::B8G8R8X8UNorm | BufferFormat::B8G8R8X8UNormSrgb => (
                ColorType::Rgb,
                BitDepth::Eight,
                tight.chunks_exact(4).flat_map(|c| [c[2], c[1], c[0]]).collect(),
            ),
            BufferFormat::R16G16B16A16UNorm => (ColorType::Rgba, BitDepth::Sixteen, swap16(&tight)),
            other => {
                return Err(ImageError::Encode(format!(
                    "{other} cannot be stored as PNG; convert to R8G8B8A8_UNorm first"
                )));
            }
        };

        let mut encoder = ::png::Encoder::new(stream, s.width, s.height);
        encoder.set_color(color);
        encoder.set_depth(depth);
        encoder.set_compression(self.compression);
        if s.format_info().is_srgb {
            encoder.set_source_srgb(::png::SrgbRenderingIntent::Perceptual);
        }

        let mut writer = encoder.write_header().map_err(|e| ImageError::Encode(e.to_string()))?;
        writer
            .write_image_data(&data)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
        writer.finish().map_err(|e| ImageError::Encode(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(image: &ImageData) -> ImageData {
        let mut bytes = Vec::new();
        image.save(&PngCodec::new(), &mut bytes).unwrap();
        ImageData::load(&PngCodec::new(), &mut Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_rgba8_roundtrip() {
        let settings = ImageSettings::new_2d(3, 2, BufferFormat::R8G8B8A8UNorm);
        let data: Vec<u8> = (0..24).map(|i| i as u8 * 10).collect();
        let image = ImageData::from_vec(&settings, data.clone()).unwrap();
        let back = roundtrip(&image);
        assert_eq!(back.format(), BufferFormat::R8G8B8A8UNorm);
        assert_eq!(back.as_bytes(), data.as_slice());
    }

    #[test]
    fn test_r16_roundtrip_keeps_byte_order() {
        let settings = ImageSettings::new_2d(2, 1, BufferFormat::R16UNorm);
        let image = ImageData::from_vec(&settings, vec![0x34, 0x12, 0xFF, 0x00]).unwrap();
        let back = roundtrip(&image);
        assert_eq!(back.format(), BufferFormat::R16UNorm);
        assert_eq!(back.as_bytes(), &[0x34, 0x12, 0xFF, 0x00]);
    }

    #[test]
    fn test_bgrx_decodes_opaque_rgba() {
        let settings = ImageSettings::new_2d(1, 1, BufferFormat::B8G8R8X8UNorm);
        let image = ImageData::from_vec(&settings, vec![1, 2, 3, 0]).unwrap();
        let back = roundtrip(&image);
        assert_eq!(back.as_bytes(), &[3, 2, 1, 255]);
    }

    #[test]
    fn test_rejects_unencodable_formats() {
        let image = ImageData::new(&ImageSettings::new_2d(4, 4, BufferFormat::R32G32B32A32Float)).unwrap();
        let err = image.save(&PngCodec::new(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, ImageError::Encode(_)));

        let cube = ImageData::new(&ImageSettings::new_cube(4, BufferFormat::R8G8B8A8UNorm)).unwrap();
        assert!(cube.save(&PngCodec::new(), &mut Vec::new()).is_err());
    }

    #[test]
    fn test_signature_check() {
        let mut cursor = Cursor::new(b"GIMG\x01\x00".to_vec());
        assert!(!PngCodec::new().is_readable(&mut cursor).unwrap());
        let err = ImageData::load(&PngCodec::new(), &mut cursor).unwrap_err();
        assert!(matches!(err, ImageError::InvalidFile(_)));
    }
}
