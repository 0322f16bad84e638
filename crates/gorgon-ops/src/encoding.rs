//! Pixel encodings the software converter can read and write.
//!
//! Every supported [`BufferFormat`] maps to one [`Encoding`]. Rows are
//! decoded to RGBA `f32` ([`Rgba`]) and encoded back; sRGB and linear
//! variants of a format share an encoding, so no transfer curve is
//! applied. Missing colour channels decode as 0, missing alpha as 1.
//!
//! ```rust
//! use gorgon_core::BufferFormat;
//! use gorgon_ops::encoding::Encoding;
//!
//! let enc = Encoding::of(BufferFormat::B8G8R8A8UNorm).unwrap();
//! let mut px = [[0.0f32; 4]; 1];
//! enc.decode_row(&[255, 0, 0, 255], &mut px);
//! assert_eq!(px[0], [0.0, 0.0, 1.0, 1.0]);
//! ```

use gorgon_core::BufferFormat;
use half::f16;

/// One pixel as linear RGBA.
pub type Rgba = [f32; 4];

/// Byte layout of a pixel as seen by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// 4 x f32.
    Rgba32F,
    /// 3 x f32.
    Rgb32F,
    /// 2 x f32.
    Rg32F,
    /// 1 x f32.
    R32F,
    /// 4 x f16.
    Rgba16F,
    /// 2 x f16.
    Rg16F,
    /// 1 x f16.
    R16F,
    /// 4 x 16-bit normalized.
    Rgba16,
    /// 2 x 16-bit normalized.
    Rg16,
    /// 1 x 16-bit normalized.
    R16,
    /// 10:10:10:2 packed normalized.
    Rgb10A2,
    /// 4 x 8-bit normalized, RGBA order.
    Rgba8,
    /// 4 x 8-bit normalized, BGRA order.
    Bgra8,
    /// 4 x 8-bit normalized, BGR plus an unused byte.
    Bgrx8,
    /// 2 x 8-bit normalized.
    Rg8,
    /// 1 x 8-bit normalized red.
    R8,
    /// 1 x 8-bit normalized alpha.
    A8,
    /// 5:6:5 packed BGR.
    Bgr565,
    /// 5:5:5:1 packed BGRA.
    Bgra5551,
    /// 4:4:4:4 packed BGRA.
    Bgra4,
}

impl Encoding {
    /// Encoding for `format`, or `None` when the converter cannot handle it.
    pub fn of(format: BufferFormat) -> Option<Self> {
        use BufferFormat as F;
        Some(match format {
            F::R32G32B32A32Float => Self::Rgba32F,
            F::R32G32B32Float => Self::Rgb32F,
            F::R32G32Float => Self::Rg32F,
            F::R32Float => Self::R32F,
            F::R16G16B16A16Float => Self::Rgba16F,
            F::R16G16Float => Self::Rg16F,
            F::R16Float => Self::R16F,
            F::R16G16B16A16UNorm => Self::Rgba16,
            F::R16G16UNorm => Self::Rg16,
            F::R16UNorm => Self::R16,
            F::R10G10B10A2UNorm => Self::Rgb10A2,
            F::R8G8B8A8UNorm | F::R8G8B8A8UNormSrgb => Self::Rgba8,
            F::B8G8R8A8UNorm | F::B8G8R8A8UNormSrgb => Self::Bgra8,
            F::B8G8R8X8UNorm | F::B8G8R8X8UNormSrgb => Self::Bgrx8,
            F::R8G8UNorm => Self::Rg8,
            F::R8UNorm => Self::R8,
            F::A8UNorm => Self::A8,
            F::B5G6R5UNorm => Self::Bgr565,
            F::B5G5R5A1UNorm => Self::Bgra5551,
            F::B4G4R4A4UNorm => Self::Bgra4,
            _ => return None,
        })
    }

    /// Bytes per pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba32F => 16,
            Self::Rgb32F => 12,
            Self::Rg32F | Self::Rgba16F | Self::Rgba16 => 8,
            Self::R32F | Self::Rg16F | Self::Rg16 | Self::Rgb10A2 | Self::Rgba8 | Self::Bgra8 | Self::Bgrx8 => 4,
            Self::R16F | Self::R16 | Self::Rg8 | Self::Bgr565 | Self::Bgra5551 | Self::Bgra4 => 2,
            Self::R8 | Self::A8 => 1,
        }
    }

    /// Precision in bits of the R, G, B and A channels; 0 marks a channel
    /// the encoding does not store. Float channels report mantissa bits.
    pub const fn channel_bits(self) -> [u8; 4] {
        match self {
            Self::Rgba32F => [24, 24, 24, 24],
            Self::Rgb32F => [24, 24, 24, 0],
            Self::Rg32F => [24, 24, 0, 0],
            Self::R32F => [24, 0, 0, 0],
            Self::Rgba16F => [11, 11, 11, 11],
            Self::Rg16F => [11, 11, 0, 0],
            Self::R16F => [11, 0, 0, 0],
            Self::Rgba16 => [16, 16, 16, 16],
            Self::Rg16 => [16, 16, 0, 0],
            Self::R16 => [16, 0, 0, 0],
            Self::Rgb10A2 => [10, 10, 10, 2],
            Self::Rgba8 | Self::Bgra8 => [8, 8, 8, 8],
            Self::Bgrx8 => [8, 8, 8, 0],
            Self::Rg8 => [8, 8, 0, 0],
            Self::R8 => [8, 0, 0, 0],
            Self::A8 => [0, 0, 0, 8],
            Self::Bgr565 => [5, 6, 5, 0],
            Self::Bgra5551 => [5, 5, 5, 1],
            Self::Bgra4 => [4, 4, 4, 4],
        }
    }

    /// Returns `true` for floating point encodings.
    pub const fn is_float(self) -> bool {
        matches!(
            self,
            Self::Rgba32F | Self::Rgb32F | Self::Rg32F | Self::R32F | Self::Rgba16F | Self::Rg16F | Self::R16F
        )
    }

    /// Decodes `dst.len()` pixels from `src`.
    pub fn decode_row(self, src: &[u8], dst: &mut [Rgba]) {
        for (px, out) in src.chunks_exact(self.bytes_per_pixel()).zip(dst.iter_mut()) {
            *out = self.decode_pixel(px);
        }
    }

    /// Encodes `src` into `dst`, clamping normalized channels to [0, 1].
    pub fn encode_row(self, src: &[Rgba], dst: &mut [u8]) {
        for (v, px) in src.iter().zip(dst.chunks_exact_mut(self.bytes_per_pixel())) {
            self.encode_pixel(*v, px);
        }
    }

    fn decode_pixel(self, px: &[u8]) -> Rgba {
        match self {
            Self::Rgba32F => [f32_at(px, 0), f32_at(px, 1), f32_at(px, 2), f32_at(px, 3)],
            Self::Rgb32F => [f32_at(px, 0), f32_at(px, 1), f32_at(px, 2), 1.0],
            Self::Rg32F => [f32_at(px, 0), f32_at(px, 1), 0.0, 1.0],
            Self::R32F => [f32_at(px, 0), 0.0, 0.0, 1.0],
            Self::Rgba16F => [f16_at(px, 0), f16_at(px, 1), f16_at(px, 2), f16_at(px, 3)],
            Self::Rg16F => [f16_at(px, 0), f16_at(px, 1), 0.0, 1.0],
            Self::R16F => [f16_at(px, 0), 0.0, 0.0, 1.0],
            Self::Rgba16 => [n16_at(px, 0), n16_at(px, 1), n16_at(px, 2), n16_at(px, 3)],
            Self::Rg16 => [n16_at(px, 0), n16_at(px, 1), 0.0, 1.0],
            Self::R16 => [n16_at(px, 0), 0.0, 0.0, 1.0],
            Self::Rgb10A2 => {
                let v = u32::from_le_bytes([px[0], px[1], px[2], px[3]]);
                [
                    unpack(v, 0, 10),
                    unpack(v, 10, 10),
                    unpack(v, 20, 10),
                    unpack(v, 30, 2),
                ]
            }
            Self::Rgba8 => [n8(px[0]), n8(px[1]), n8(px[2]), n8(px[3])],
            Self::Bgra8 => [n8(px[2]), n8(px[1]), n8(px[0]), n8(px[3])],
            Self::Bgrx8 => [n8(px[2]), n8(px[1]), n8(px[0]), 1.0],
            Self::Rg8 => [n8(px[0]), n8(px[1]), 0.0, 1.0],
            Self::R8 => [n8(px[0]), 0.0, 0.0, 1.0],
            Self::A8 => [0.0, 0.0, 0.0, n8(px[0])],
            Self::Bgr565 => {
                let v = u16::from_le_bytes([px[0], px[1]]) as u32;
                [unpack(v, 11, 5), unpack(v, 5, 6), unpack(v, 0, 5), 1.0]
            }
            Self::Bgra5551 => {
                let v = u16::from_le_bytes([px[0], px[1]]) as u32;
                [unpack(v, 10, 5), unpack(v, 5, 5), unpack(v, 0, 5), unpack(v, 15, 1)]
            }
            Self::Bgra4 => {
                let v = u16::from_le_bytes([px[0], px[1]]) as u32;
                [unpack(v, 8, 4), unpack(v, 4, 4), unpack(v, 0, 4), unpack(v, 12, 4)]
            }
        }
    }

    fn encode_pixel(self, v: Rgba, px: &mut [u8]) {
        match self {
            Self::Rgba32F => put_f32(px, &v),
            Self::Rgb32F => put_f32(px, &v[..3]),
            Self::Rg32F => put_f32(px, &v[..2]),
            Self::R32F => put_f32(px, &v[..1]),
            Self::Rgba16F => put_f16(px, &v),
            Self::Rg16F => put_f16(px, &v[..2]),
            Self::R16F => put_f16(px, &v[..1]),
            Self::Rgba16 => put_n16(px, &v),
            Self::Rg16 => put_n16(px, &v[..2]),
            Self::R16 => put_n16(px, &v[..1]),
            Self::Rgb10A2 => {
                let packed = pack(v[0], 0, 10) | pack(v[1], 10, 10) | pack(v[2], 20, 10) | pack(v[3], 30, 2);
                px.copy_from_slice(&packed.to_le_bytes());
            }
            Self::Rgba8 => {
                px.copy_from_slice(&[to_n8(v[0]), to_n8(v[1]), to_n8(v[2]), to_n8(v[3])]);
            }
            Self::Bgra8 => {
                px.copy_from_slice(&[to_n8(v[2]), to_n8(v[1]), to_n8(v[0]), to_n8(v[3])]);
            }
            Self::Bgrx8 => {
                px.copy_from_slice(&[to_n8(v[2]), to_n8(v[1]), to_n8(v[0]), 255]);
            }
            Self::Rg8 => px.copy_from_slice(&[to_n8(v[0]), to_n8(v[1])]),
            Self::R8 => px[0] = to_n8(v[0]),
            Self::A8 => px[0] = to_n8(v[3]),
            Self::Bgr565 => {
                let packed = pack(v[0], 11, 5) | pack(v[1], 5, 6) | pack(v[2], 0, 5);
                px.copy_from_slice(&(packed as u16).to_le_bytes());
            }
            Self::Bgra5551 => {
                let packed = pack(v[0], 10, 5) | pack(v[1], 5, 5) | pack(v[2], 0, 5) | pack(v[3], 15, 1);
                px.copy_from_slice(&(packed as u16).to_le_bytes());
            }
            Self::Bgra4 => {
                let packed = pack(v[0], 8, 4) | pack(v[1], 4, 4) | pack(v[2], 0, 4) | pack(v[3], 12, 4);
                px.copy_from_slice(&(packed as u16).to_le_bytes());
            }
        }
    }
}

/// Largest value of a `bits`-wide normalized channel.
#[inline]
pub(crate) fn unorm_max(bits: u8) -> f32 {
    ((1u32 << bits) - 1) as f32
}

/// Rounds `v` to the nearest level of a `bits`-wide normalized channel.
#[inline]
pub(crate) fn quantize(v: f32, bits: u8) -> f32 {
    let max = unorm_max(bits);
    (v.clamp(0.0, 1.0) * max + 0.5).floor() / max
}

#[inline]
fn to_unorm(v: f32, bits: u8) -> u32 {
    (v.clamp(0.0, 1.0) * unorm_max(bits) + 0.5) as u32
}

#[inline]
fn n8(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn to_n8(v: f32) -> u8 {
    to_unorm(v, 8) as u8
}

#[inline]
fn unpack(v: u32, shift: u32, bits: u8) -> f32 {
    ((v >> shift) & ((1 << bits) - 1)) as f32 / unorm_max(bits)
}

#[inline]
fn pack(v: f32, shift: u32, bits: u8) -> u32 {
    to_unorm(v, bits) << shift
}

#[inline]
fn f32_at(px: &[u8], i: usize) -> f32 {
    let o = i * 4;
    f32::from_le_bytes([px[o], px[o + 1], px[o + 2], px[o + 3]])
}

#[inline]
fn f16_at(px: &[u8], i: usize) -> f32 {
    let o = i * 2;
    f16::from_le_bytes([px[o], px[o + 1]]).to_f32()
}

#[inline]
fn n16_at(px: &[u8], i: usize) -> f32 {
    let o = i * 2;
    u16::from_le_bytes([px[o], px[o + 1]]) as f32 / 65535.0
}

fn put_f32(px: &mut [u8], values: &[f32]) {
    for (chunk, v) in px.chunks_exact_mut(4).zip(values) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
}

fn put_f16(px: &mut [u8], values: &[f32]) {
    for (chunk, v) in px.chunks_exact_mut(2).zip(values) {
        chunk.copy_from_slice(&f16::from_f32(*v).to_le_bytes());
    }
}

fn put_n16(px: &mut [u8], values: &[f32]) {
    for (chunk, v) in px.chunks_exact_mut(2).zip(values) {
        chunk.copy_from_slice(&(to_unorm(*v, 16) as u16).to_le_bytes());
    }
}
