//! Pixel format catalog.
//!
//! [`BufferFormat`] names every pixel encoding an image buffer may hold and
//! [`FormatInfo`] describes its byte layout: bits per pixel, block size for
//! block-compressed and packed formats, channel count and depth, and
//! whether the format carries depth/stencil, alpha or sRGB semantics.
//!
//! The catalog is a static table indexed by the format discriminant, so a
//! lookup never allocates and never fails: [`BufferFormat::Unknown`]
//! resolves to a zero-size sentinel that callers must check with
//! [`FormatInfo::is_supported`].
//!
//! # Usage
//!
//! ```rust
//! use gorgon_core::format::{BufferFormat, FormatInfo};
//!
//! let info = FormatInfo::lookup(BufferFormat::R8G8B8A8UNorm);
//! assert_eq!(info.size_in_bytes(), 4);
//! assert!(info.has_alpha);
//!
//! let bc1 = FormatInfo::lookup(BufferFormat::Bc1UNorm);
//! assert!(bc1.is_compressed);
//! assert_eq!((bc1.block_width, bc1.block_height, bc1.block_bytes), (4, 4, 8));
//!
//! let format: BufferFormat = "r16g16b16a16_float".parse().unwrap();
//! assert_eq!(format, BufferFormat::R16G16B16A16Float);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Byte layout facts for one [`BufferFormat`].
///
/// Pixel formats have a 1x1 block whose size is `ceil(bits_per_pixel / 8)`.
/// Block formats (BC1-BC7 and the 2x1 packed pairs) describe a block of
/// `block_width x block_height` pixels stored in `block_bytes` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatInfo {
    /// Format this entry describes.
    pub format: BufferFormat,
    /// Bits per pixel; for block formats the average over the block.
    pub bits_per_pixel: u32,
    /// Block width in pixels (1 for pixel formats).
    pub block_width: u32,
    /// Block height in pixels (1 for pixel formats).
    pub block_height: u32,
    /// Bytes per block (bytes per pixel for pixel formats, rounded up).
    pub block_bytes: u32,
    /// Number of channels.
    pub channel_count: u8,
    /// Bit depth of the widest channel.
    pub channel_bits: u8,
    /// Block-compressed (BCn).
    pub is_compressed: bool,
    /// Two pixels share one 32-bit word (R8G8_B8G8, G8R8_G8B8).
    pub is_packed: bool,
    /// Carries depth data.
    pub has_depth: bool,
    /// Carries stencil data.
    pub has_stencil: bool,
    /// Carries an alpha channel.
    pub has_alpha: bool,
    /// Colour values are sRGB encoded.
    pub is_srgb: bool,
    /// Representative of the family sharing this memory layout.
    pub group: BufferFormat,
}

impl FormatInfo {
    /// Sentinel returned for formats without a descriptor.
    pub const UNKNOWN: FormatInfo = FormatInfo {
        format: BufferFormat::Unknown,
        bits_per_pixel: 0,
        block_width: 1,
        block_height: 1,
        block_bytes: 0,
        channel_count: 0,
        channel_bits: 0,
        is_compressed: false,
        is_packed: false,
        has_depth: false,
        has_stencil: false,
        has_alpha: false,
        is_srgb: false,
        group: BufferFormat::Unknown,
    };

    const fn pixel(format: BufferFormat, bits_per_pixel: u32, channel_count: u8, channel_bits: u8) -> Self {
        Self {
            format,
            bits_per_pixel,
            block_width: 1,
            block_height: 1,
            block_bytes: bits_per_pixel.div_ceil(8),
            channel_count,
            channel_bits,
            group: format,
            ..Self::UNKNOWN
        }
    }

    const fn block(
        format: BufferFormat,
        block_width: u32,
        block_height: u32,
        block_bytes: u32,
        channel_count: u8,
        channel_bits: u8,
    ) -> Self {
        Self {
            format,
            bits_per_pixel: block_bytes * 8 / (block_width * block_height),
            block_width,
            block_height,
            block_bytes,
            channel_count,
            channel_bits,
            is_compressed: block_width == 4,
            is_packed: block_width == 2,
            group: format,
            ..Self::UNKNOWN
        }
    }

    const fn alpha(mut self) -> Self {
        self.has_alpha = true;
        self
    }

    const fn srgb(mut self) -> Self {
        self.is_srgb = true;
        self
    }

    const fn depth(mut self) -> Self {
        self.has_depth = true;
        self
    }

    const fn stencil(mut self) -> Self {
        self.has_stencil = true;
        self
    }

    const fn in_group(mut self, group: BufferFormat) -> Self {
        self.group = group;
        self
    }

    /// Looks up the descriptor for `format`.
    ///
    /// Never fails; unregistered formats return [`FormatInfo::UNKNOWN`].
    #[inline]
    pub fn lookup(format: BufferFormat) -> &'static FormatInfo {
        CATALOG.get(format as usize).unwrap_or(&Self::UNKNOWN)
    }

    /// Bytes per pixel for pixel formats, bytes per block for block formats.
    ///
    /// Zero means the format is not supported.
    #[inline]
    pub const fn size_in_bytes(&self) -> u32 {
        self.block_bytes
    }

    /// Returns `true` when the descriptor has a non-zero size.
    #[inline]
    pub const fn is_supported(&self) -> bool {
        self.block_bytes != 0
    }

    /// Returns `true` for BCn and packed formats (pitch computed per block).
    #[inline]
    pub const fn is_block_format(&self) -> bool {
        self.is_compressed || self.is_packed
    }

    /// Returns `true` when `other` shares this format's memory layout.
    #[inline]
    pub fn same_layout(&self, other: &FormatInfo) -> bool {
        self.is_supported() && self.group == other.group
    }
}

macro_rules! buffer_formats {
    ($( $(#[$meta:meta])* $variant:ident = $name:literal => $info:expr; )*) => {
        /// Pixel encodings known to the image model.
        ///
        /// The set follows the DXGI format table: uncompressed colour formats,
        /// depth/stencil formats, packed pairs and BC1-BC7.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        #[repr(u32)]
        pub enum BufferFormat {
            /// No format; never valid for an image.
            #[default]
            Unknown = 0,
            $( $(#[$meta])* $variant, )*
        }

        impl BufferFormat {
            /// Every format with a descriptor, in catalog order.
            pub const ALL: &'static [BufferFormat] = &[$(BufferFormat::$variant,)*];

            /// Canonical name, e.g. `"R8G8B8A8_UNorm"`.
            pub const fn name(self) -> &'static str {
                match self {
                    BufferFormat::Unknown => "Unknown",
                    $( BufferFormat::$variant => $name, )*
                }
            }
        }

        static CATALOG: &[FormatInfo] = &[
            FormatInfo::UNKNOWN,
            $( { use BufferFormat::*; $info }, )*
        ];
    };
}

buffer_formats! {
    /// 128-bit RGBA float.
    R32G32B32A32Float = "R32G32B32A32_Float" => FormatInfo::pixel(R32G32B32A32Float, 128, 4, 32).alpha();
    /// 128-bit RGBA unsigned integer.
    R32G32B32A32UInt = "R32G32B32A32_UInt" => FormatInfo::pixel(R32G32B32A32UInt, 128, 4, 32).alpha().in_group(R32G32B32A32Float);
    /// 128-bit RGBA signed integer.
    R32G32B32A32SInt = "R32G32B32A32_SInt" => FormatInfo::pixel(R32G32B32A32SInt, 128, 4, 32).alpha().in_group(R32G32B32A32Float);
    /// 96-bit RGB float.
    R32G32B32Float = "R32G32B32_Float" => FormatInfo::pixel(R32G32B32Float, 96, 3, 32);
    /// 96-bit RGB unsigned integer.
    R32G32B32UInt = "R32G32B32_UInt" => FormatInfo::pixel(R32G32B32UInt, 96, 3, 32).in_group(R32G32B32Float);
    /// 64-bit RGBA half float.
    R16G16B16A16Float = "R16G16B16A16_Float" => FormatInfo::pixel(R16G16B16A16Float, 64, 4, 16).alpha();
    /// 64-bit RGBA normalized.
    R16G16B16A16UNorm = "R16G16B16A16_UNorm" => FormatInfo::pixel(R16G16B16A16UNorm, 64, 4, 16).alpha().in_group(R16G16B16A16Float);
    /// 64-bit RGBA unsigned integer.
    R16G16B16A16UInt = "R16G16B16A16_UInt" => FormatInfo::pixel(R16G16B16A16UInt, 64, 4, 16).alpha().in_group(R16G16B16A16Float);
    /// 64-bit RGBA signed normalized.
    R16G16B16A16SNorm = "R16G16B16A16_SNorm" => FormatInfo::pixel(R16G16B16A16SNorm, 64, 4, 16).alpha().in_group(R16G16B16A16Float);
    /// 64-bit RG float.
    R32G32Float = "R32G32_Float" => FormatInfo::pixel(R32G32Float, 64, 2, 32);
    /// 64-bit RG unsigned integer.
    R32G32UInt = "R32G32_UInt" => FormatInfo::pixel(R32G32UInt, 64, 2, 32).in_group(R32G32Float);
    /// 32-bit float depth, 8-bit stencil, 24 bits unused.
    D32FloatS8X24UInt = "D32_Float_S8X24_UInt" => FormatInfo::pixel(D32FloatS8X24UInt, 64, 2, 32).depth().stencil();
    /// 32-bit packed 10:10:10:2 normalized.
    R10G10B10A2UNorm = "R10G10B10A2_UNorm" => FormatInfo::pixel(R10G10B10A2UNorm, 32, 4, 10).alpha();
    /// 32-bit packed 10:10:10:2 unsigned integer.
    R10G10B10A2UInt = "R10G10B10A2_UInt" => FormatInfo::pixel(R10G10B10A2UInt, 32, 4, 10).alpha().in_group(R10G10B10A2UNorm);
    /// 32-bit packed 11:11:10 float.
    R11G11B10Float = "R11G11B10_Float" => FormatInfo::pixel(R11G11B10Float, 32, 3, 11);
    /// 32-bit RGBA normalized.
    R8G8B8A8UNorm = "R8G8B8A8_UNorm" => FormatInfo::pixel(R8G8B8A8UNorm, 32, 4, 8).alpha();
    /// 32-bit RGBA normalized, sRGB.
    R8G8B8A8UNormSrgb = "R8G8B8A8_UNorm_SRgb" => FormatInfo::pixel(R8G8B8A8UNormSrgb, 32, 4, 8).alpha().srgb().in_group(R8G8B8A8UNorm);
    /// 32-bit RGBA unsigned integer.
    R8G8B8A8UInt = "R8G8B8A8_UInt" => FormatInfo::pixel(R8G8B8A8UInt, 32, 4, 8).alpha().in_group(R8G8B8A8UNorm);
    /// 32-bit RGBA signed normalized.
    R8G8B8A8SNorm = "R8G8B8A8_SNorm" => FormatInfo::pixel(R8G8B8A8SNorm, 32, 4, 8).alpha().in_group(R8G8B8A8UNorm);
    /// 32-bit RG half float.
    R16G16Float = "R16G16_Float" => FormatInfo::pixel(R16G16Float, 32, 2, 16);
    /// 32-bit RG normalized.
    R16G16UNorm = "R16G16_UNorm" => FormatInfo::pixel(R16G16UNorm, 32, 2, 16).in_group(R16G16Float);
    /// 32-bit RG unsigned integer.
    R16G16UInt = "R16G16_UInt" => FormatInfo::pixel(R16G16UInt, 32, 2, 16).in_group(R16G16Float);
    /// 32-bit float depth.
    D32Float = "D32_Float" => FormatInfo::pixel(D32Float, 32, 1, 32).depth().in_group(R32Float);
    /// 32-bit red float.
    R32Float = "R32_Float" => FormatInfo::pixel(R32Float, 32, 1, 32);
    /// 32-bit red unsigned integer.
    R32UInt = "R32_UInt" => FormatInfo::pixel(R32UInt, 32, 1, 32).in_group(R32Float);
    /// 24-bit normalized depth, 8-bit stencil.
    D24UNormS8UInt = "D24_UNorm_S8_UInt" => FormatInfo::pixel(D24UNormS8UInt, 32, 2, 24).depth().stencil();
    /// 16-bit RG normalized.
    R8G8UNorm = "R8G8_UNorm" => FormatInfo::pixel(R8G8UNorm, 16, 2, 8);
    /// 16-bit RG unsigned integer.
    R8G8UInt = "R8G8_UInt" => FormatInfo::pixel(R8G8UInt, 16, 2, 8).in_group(R8G8UNorm);
    /// 16-bit red half float.
    R16Float = "R16_Float" => FormatInfo::pixel(R16Float, 16, 1, 16);
    /// 16-bit red normalized.
    R16UNorm = "R16_UNorm" => FormatInfo::pixel(R16UNorm, 16, 1, 16).in_group(R16Float);
    /// 16-bit red unsigned integer.
    R16UInt = "R16_UInt" => FormatInfo::pixel(R16UInt, 16, 1, 16).in_group(R16Float);
    /// 16-bit normalized depth.
    D16UNorm = "D16_UNorm" => FormatInfo::pixel(D16UNorm, 16, 1, 16).depth().in_group(R16Float);
    /// 8-bit red normalized.
    R8UNorm = "R8_UNorm" => FormatInfo::pixel(R8UNorm, 8, 1, 8);
    /// 8-bit red unsigned integer.
    R8UInt = "R8_UInt" => FormatInfo::pixel(R8UInt, 8, 1, 8).in_group(R8UNorm);
    /// 8-bit alpha only.
    A8UNorm = "A8_UNorm" => FormatInfo::pixel(A8UNorm, 8, 1, 8).alpha();
    /// 1 bit per pixel.
    R1UNorm = "R1_UNorm" => FormatInfo::pixel(R1UNorm, 1, 1, 1);
    /// Three 9-bit mantissas sharing a 5-bit exponent.
    R9G9B9E5SharedExp = "R9G9B9E5_SharedExp" => FormatInfo::pixel(R9G9B9E5SharedExp, 32, 3, 9);
    /// Packed pair: two pixels in 32 bits (R8G8, B8G8).
    R8G8B8G8UNorm = "R8G8_B8G8_UNorm" => FormatInfo::block(R8G8B8G8UNorm, 2, 1, 4, 3, 8);
    /// Packed pair: two pixels in 32 bits (G8R8, G8B8).
    G8R8G8B8UNorm = "G8R8_G8B8_UNorm" => FormatInfo::block(G8R8G8B8UNorm, 2, 1, 4, 3, 8);
    /// BC1 (DXT1), 4x4 block in 8 bytes.
    Bc1UNorm = "BC1_UNorm" => FormatInfo::block(Bc1UNorm, 4, 4, 8, 4, 5).alpha();
    /// BC1, sRGB.
    Bc1UNormSrgb = "BC1_UNorm_SRgb" => FormatInfo::block(Bc1UNormSrgb, 4, 4, 8, 4, 5).alpha().srgb().in_group(Bc1UNorm);
    /// BC2 (DXT3), explicit alpha.
    Bc2UNorm = "BC2_UNorm" => FormatInfo::block(Bc2UNorm, 4, 4, 16, 4, 5).alpha();
    /// BC2, sRGB.
    Bc2UNormSrgb = "BC2_UNorm_SRgb" => FormatInfo::block(Bc2UNormSrgb, 4, 4, 16, 4, 5).alpha().srgb().in_group(Bc2UNorm);
    /// BC3 (DXT5), interpolated alpha.
    Bc3UNorm = "BC3_UNorm" => FormatInfo::block(Bc3UNorm, 4, 4, 16, 4, 8).alpha();
    /// BC3, sRGB.
    Bc3UNormSrgb = "BC3_UNorm_SRgb" => FormatInfo::block(Bc3UNormSrgb, 4, 4, 16, 4, 8).alpha().srgb().in_group(Bc3UNorm);
    /// BC4, single channel.
    Bc4UNorm = "BC4_UNorm" => FormatInfo::block(Bc4UNorm, 4, 4, 8, 1, 8);
    /// BC4, signed.
    Bc4SNorm = "BC4_SNorm" => FormatInfo::block(Bc4SNorm, 4, 4, 8, 1, 8).in_group(Bc4UNorm);
    /// BC5, two channels.
    Bc5UNorm = "BC5_UNorm" => FormatInfo::block(Bc5UNorm, 4, 4, 16, 2, 8);
    /// BC5, signed.
    Bc5SNorm = "BC5_SNorm" => FormatInfo::block(Bc5SNorm, 4, 4, 16, 2, 8).in_group(Bc5UNorm);
    /// 16-bit 5:6:5 BGR.
    B5G6R5UNorm = "B5G6R5_UNorm" => FormatInfo::pixel(B5G6R5UNorm, 16, 3, 6);
    /// 16-bit 5:5:5:1 BGRA.
    B5G5R5A1UNorm = "B5G5R5A1_UNorm" => FormatInfo::pixel(B5G5R5A1UNorm, 16, 4, 5).alpha();
    /// 32-bit BGRA normalized.
    B8G8R8A8UNorm = "B8G8R8A8_UNorm" => FormatInfo::pixel(B8G8R8A8UNorm, 32, 4, 8).alpha();
    /// 32-bit BGR normalized, fourth byte unused.
    B8G8R8X8UNorm = "B8G8R8X8_UNorm" => FormatInfo::pixel(B8G8R8X8UNorm, 32, 4, 8);
    /// 32-bit BGRA normalized, sRGB.
    B8G8R8A8UNormSrgb = "B8G8R8A8_UNorm_SRgb" => FormatInfo::pixel(B8G8R8A8UNormSrgb, 32, 4, 8).alpha().srgb().in_group(B8G8R8A8UNorm);
    /// 32-bit BGR normalized, sRGB, fourth byte unused.
    B8G8R8X8UNormSrgb = "B8G8R8X8_UNorm_SRgb" => FormatInfo::pixel(B8G8R8X8UNormSrgb, 32, 4, 8).srgb().in_group(B8G8R8X8UNorm);
    /// BC6H unsigned half float.
    Bc6hUf16 = "BC6H_UF16" => FormatInfo::block(Bc6hUf16, 4, 4, 16, 3, 16);
    /// BC6H signed half float.
    Bc6hSf16 = "BC6H_SF16" => FormatInfo::block(Bc6hSf16, 4, 4, 16, 3, 16).in_group(Bc6hUf16);
    /// BC7, high quality RGBA.
    Bc7UNorm = "BC7_UNorm" => FormatInfo::block(Bc7UNorm, 4, 4, 16, 4, 8).alpha();
    /// BC7, sRGB.
    Bc7UNormSrgb = "BC7_UNorm_SRgb" => FormatInfo::block(Bc7UNormSrgb, 4, 4, 16, 4, 8).alpha().srgb().in_group(Bc7UNorm);
    /// 16-bit 4:4:4:4 BGRA.
    B4G4R4A4UNorm = "B4G4R4A4_UNorm" => FormatInfo::pixel(B4G4R4A4UNorm, 16, 4, 4).alpha();
}

impl BufferFormat {
    /// Shortcut for [`FormatInfo::lookup`].
    #[inline]
    pub fn info(self) -> &'static FormatInfo {
        FormatInfo::lookup(self)
    }

    /// Format with discriminant `value`, as stored in file headers.
    pub fn from_u32(value: u32) -> Option<Self> {
        if value == 0 {
            return Some(Self::Unknown);
        }
        Self::ALL.iter().copied().find(|f| *f as u32 == value)
    }
}

impl fmt::Display for BufferFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a format name is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pixel format name: {0}")]
pub struct ParseFormatError(pub String);

impl FromStr for BufferFormat {
    type Err = ParseFormatError;

    /// Parses a canonical name, ignoring case and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_name(s);
        BufferFormat::ALL
            .iter()
            .copied()
            .find(|f| normalize_name(f.name()) == wanted)
            .ok_or_else(|| ParseFormatError(s.to_string()))
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_matches_discriminants() {
        for &format in BufferFormat::ALL {
            assert_eq!(FormatInfo::lookup(format).format, format, "{format}");
        }
        assert_eq!(CATALOG.len(), BufferFormat::ALL.len() + 1);
    }

    #[test]
    fn test_unknown_is_sentinel() {
        let info = FormatInfo::lookup(BufferFormat::Unknown);
        assert_eq!(info.size_in_bytes(), 0);
        assert!(!info.is_supported());
    }

    #[test]
    fn test_every_listed_format_has_size() {
        for &format in BufferFormat::ALL {
            assert!(format.info().is_supported(), "{format} has zero size");
        }
    }

    #[test]
    fn test_block_formats() {
        let bc3 = BufferFormat::Bc3UNorm.info();
        assert!(bc3.is_compressed && bc3.is_block_format());
        assert_eq!(bc3.block_bytes, 16);
        assert_eq!(bc3.bits_per_pixel, 8);

        let packed = BufferFormat::R8G8B8G8UNorm.info();
        assert!(packed.is_packed && !packed.is_compressed);
        assert_eq!((packed.block_width, packed.block_height), (2, 1));
        assert_eq!(packed.bits_per_pixel, 16);
    }

    #[test]
    fn test_sub_byte_format_rounds_up() {
        let r1 = BufferFormat::R1UNorm.info();
        assert_eq!(r1.bits_per_pixel, 1);
        assert_eq!(r1.size_in_bytes(), 1);
    }

    #[test]
    fn test_flags() {
        let d24 = BufferFormat::D24UNormS8UInt.info();
        assert!(d24.has_depth && d24.has_stencil);
        assert!(BufferFormat::R8G8B8A8UNormSrgb.info().is_srgb);
        assert!(!BufferFormat::B8G8R8X8UNorm.info().has_alpha);
    }

    #[test]
    fn test_same_layout() {
        let unorm = BufferFormat::R8G8B8A8UNorm.info();
        let srgb = BufferFormat::R8G8B8A8UNormSrgb.info();
        let bgra = BufferFormat::B8G8R8A8UNorm.info();
        assert!(unorm.same_layout(srgb));
        assert!(!unorm.same_layout(bgra));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("R8G8B8A8_UNorm".parse::<BufferFormat>().unwrap(), BufferFormat::R8G8B8A8UNorm);
        assert_eq!("bc1unormsrgb".parse::<BufferFormat>().unwrap(), BufferFormat::Bc1UNormSrgb);
        assert_eq!("R8G8_B8G8_UNorm".parse::<BufferFormat>().unwrap(), BufferFormat::R8G8B8G8UNorm);
        assert!("R7G7B7_Strange".parse::<BufferFormat>().is_err());
        assert!("Unknown".parse::<BufferFormat>().is_err());
    }

    #[test]
    fn test_display_uses_canonical_name() {
        assert_eq!(BufferFormat::D32FloatS8X24UInt.to_string(), "D32_Float_S8X24_UInt");
    }
}
