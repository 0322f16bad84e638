//! Raw image container (`.gorimg`).
//!
//! A fixed little-endian header followed by the buffer exactly as
//! [`ImageData::save_raw`] returns it, so every mip level, array element
//! and depth slice survives a round trip bit for bit.
//!
//! # Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | magic `GIMG` |
//! | 4 | 2 | version (1) |
//! | 6 | 2 | row alignment in bytes (0 = tight) |
//! | 8 | 4 | image kind |
//! | 12 | 4 | pixel format |
//! | 16 | 20 | width, height, depth, array count, mip count |
//! | 36 | 8 | payload length |
//! | 44 | .. | payload |

use std::io::{self, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use gorgon_core::{BufferFormat, ImageKind, ImageSettings, PitchFlags};
use tracing::warn;

use crate::codec::{DecodedImage, ImageCodec, ReadSeek, peek};
use crate::{ImageData, ImageError, ImageResult};

/// File signature.
pub const MAGIC: [u8; 4] = *b"GIMG";
/// Current container version.
pub const VERSION: u16 = 1;
/// Header size in bytes.
pub const HEADER_LEN: u64 = 44;

/// Codec for the raw container.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl RawCodec {
    /// Creates the codec.
    pub fn new() -> Self {
        Self
    }
}

fn read_settings(stream: &mut dyn ReadSeek) -> ImageResult<(ImageSettings, PitchFlags, u64)> {
    let mut magic = [0u8; 4];
    stream.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ImageError::InvalidFile("missing GIMG signature".into()));
    }
    let version = stream.read_u16::<LittleEndian>()?;
    if version != VERSION {
        return Err(ImageError::Decode(format!("unsupported container version {version}")));
    }
    let align = stream.read_u16::<LittleEndian>()?;
    let kind_id = stream.read_u32::<LittleEndian>()?;
    let kind = ImageKind::from_u32(kind_id).ok_or_else(|| ImageError::Decode(format!("unknown image kind {kind_id}")))?;
    let format_id = stream.read_u32::<LittleEndian>()?;
    let format =
        BufferFormat::from_u32(format_id).ok_or_else(|| ImageError::Decode(format!("unknown pixel format {format_id}")))?;

    let settings = ImageSettings {
        kind,
        format,
        width: stream.read_u32::<LittleEndian>()?,
        height: stream.read_u32::<LittleEndian>()?,
        depth: stream.read_u32::<LittleEndian>()?,
        array_count: stream.read_u32::<LittleEndian>()?,
        mip_count: stream.read_u32::<LittleEndian>()?,
    };
    let flags = match align {
        0 => PitchFlags::None,
        n => PitchFlags::LegacyDword(u32::from(n)),
    };
    let payload_len = stream.read_u64::<LittleEndian>()?;
    Ok((settings, flags, payload_len))
}

impl ImageCodec for RawCodec {
    fn name(&self) -> &'static str {
        "GorgonRaw"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gorimg"]
    }

    fn is_readable(&self, stream: &mut dyn ReadSeek) -> ImageResult<bool> {
        Ok(peek(stream, MAGIC.len())? == MAGIC)
    }

    fn decode(&self, stream: &mut dyn ReadSeek, byte_len: u64) -> ImageResult<DecodedImage> {
        let (settings, flags, payload_len) = read_settings(stream)?;
        if payload_len > byte_len.saturating_sub(HEADER_LEN) {
            return Err(ImageError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("payload of {payload_len} bytes runs past the end of the stream"),
            )));
        }
        let expected = gorgon_core::size_in_bytes(&settings, flags)?;
        if payload_len != expected as u64 {
            return Err(ImageError::Decode(format!(
                "payload holds {payload_len} bytes but {settings} needs {expected}"
            )));
        }
        if byte_len > HEADER_LEN + payload_len {
            warn!(trailing = byte_len - HEADER_LEN - payload_len, "ignoring bytes after raw payload");
        }

        let mut data = vec![0u8; expected];
        stream.read_exact(&mut data)?;
        Ok(DecodedImage { settings, flags, data })
    }

    fn encode(&self, image: &ImageData, stream: &mut dyn Write) -> ImageResult<()> {
        let s = image.settings();
        let align = match image.pitch_flags() {
            PitchFlags::None => 0,
            PitchFlags::LegacyDword(n) => u16::try_from(n)
                .map_err(|_| ImageError::Encode(format!("row alignment {n} does not fit the header")))?,
        };
        let payload = image.save_raw();

        stream.write_all(&MAGIC)?;
        stream.write_u16::<LittleEndian>(VERSION)?;
        stream.write_u16::<LittleEndian>(align)?;
        stream.write_u32::<LittleEndian>(s.kind as u32)?;
        stream.write_u32::<LittleEndian>(s.format as u32)?;
        for value in [s.width, s.height, s.depth, s.array_count, s.mip_count] {
            stream.write_u32::<LittleEndian>(value)?;
        }
        stream.write_u64::<LittleEndian>(payload.len() as u64)?;
        stream.write_all(payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded(image: &ImageData) -> Vec<u8> {
        let mut out = Vec::new();
        RawCodec.encode(image, &mut out).unwrap();
        out
    }

    #[test]
    fn test_header_layout() {
        let settings = ImageSettings::new_2d(2, 2, BufferFormat::R8UNorm);
        let image = ImageData::from_vec(&settings, vec![1, 2, 3, 4]).unwrap();
        let bytes = encoded(&image);
        assert_eq!(bytes.len() as u64, HEADER_LEN + 4);
        assert_eq!(&bytes[..4], b"GIMG");
        assert_eq!(&bytes[4..6], &[1, 0]);
        assert_eq!(&bytes[16..20], &[2, 0, 0, 0]);
        assert_eq!(&bytes[36..44], &[4, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[44..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_pitch_alignment_survives() {
        let settings = ImageSettings::new_2d(3, 2, BufferFormat::R8UNorm);
        let image = ImageData::with_pitch_flags(&settings, PitchFlags::legacy_dword()).unwrap();
        let mut cursor = Cursor::new(encoded(&image));
        let decoded = RawCodec.decode(&mut cursor, HEADER_LEN + 8).unwrap();
        assert_eq!(decoded.flags, PitchFlags::LegacyDword(4));
        assert_eq!(decoded.data.len(), 8);
    }

    #[test]
    fn test_truncated_payload_is_eof() {
        let settings = ImageSettings::new_2d(4, 4, BufferFormat::R8G8B8A8UNorm);
        let image = ImageData::new(&settings).unwrap();
        let mut bytes = encoded(&image);
        bytes.truncate(bytes.len() - 10);
        let len = bytes.len() as u64;
        let err = RawCodec.decode(&mut Cursor::new(bytes), len).unwrap_err();
        assert!(matches!(err, ImageError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_payload_longer_than_stream_is_eof() {
        let settings = ImageSettings::new_2d(2, 2, BufferFormat::R8UNorm);
        let mut bytes = encoded(&ImageData::new(&settings).unwrap());
        bytes[36..44].copy_from_slice(&u64::MAX.to_le_bytes());
        let len = bytes.len() as u64;
        let err = RawCodec.decode(&mut Cursor::new(bytes), len).unwrap_err();
        assert!(matches!(err, ImageError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_huge_header_dimensions_are_rejected() {
        let settings = ImageSettings::new_2d(1, 1, BufferFormat::R32G32B32A32Float);
        let mut bytes = encoded(&ImageData::new(&settings).unwrap());
        bytes[16..20].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[20..24].copy_from_slice(&u32::MAX.to_le_bytes());
        bytes[36..44].copy_from_slice(&0u64.to_le_bytes());
        bytes.truncate(HEADER_LEN as usize);
        let err = RawCodec.decode(&mut Cursor::new(bytes), HEADER_LEN).unwrap_err();
        assert!(matches!(err, ImageError::Core(gorgon_core::Error::InvalidDimensions { .. })), "{err}");
    }

    #[test]
    fn test_rejects_foreign_data() {
        let mut cursor = Cursor::new(b"\x89PNG\r\n\x1a\n".to_vec());
        assert!(!RawCodec.is_readable(&mut cursor).unwrap());
        assert!(matches!(RawCodec.decode(&mut cursor, 8), Err(ImageError::InvalidFile(_))));
    }
}
