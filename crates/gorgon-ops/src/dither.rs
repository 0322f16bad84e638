//! Dithering for bit-depth reduction.
//!
//! Dithering only touches channels whose destination precision is lower
//! than the source's, and only when the destination is a normalized
//! integer encoding. Ordered modes add a Bayer threshold before
//! quantization; error diffusion spreads the rounding error of each pixel
//! to its neighbours (Floyd-Steinberg), which makes rows depend on the
//! rows above them.

use std::fmt;
use std::str::FromStr;

use crate::encoding::{Encoding, Rgba, quantize, unorm_max};

/// Dithering mode used when converting to a lower bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dithering {
    /// Plain rounding.
    #[default]
    None,
    /// 4x4 Bayer matrix.
    Ordered4x4,
    /// 8x8 Bayer matrix.
    Ordered8x8,
    /// Floyd-Steinberg error diffusion.
    ErrorDiffusion,
}

impl Dithering {
    /// Returns `true` when rows can be processed independently.
    pub fn is_row_independent(self) -> bool {
        !matches!(self, Self::ErrorDiffusion)
    }
}

impl fmt::Display for Dithering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Ordered4x4 => "ordered4x4",
            Self::Ordered8x8 => "ordered8x8",
            Self::ErrorDiffusion => "diffusion",
        })
    }
}

impl FromStr for Dithering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ordered4x4" | "ordered4" | "bayer4" => Ok(Self::Ordered4x4),
            "ordered8x8" | "ordered8" | "bayer8" | "ordered" => Ok(Self::Ordered8x8),
            "diffusion" | "error-diffusion" | "floyd-steinberg" | "fs" => Ok(Self::ErrorDiffusion),
            other => Err(format!("unknown dithering mode: {other}")),
        }
    }
}

const BAYER4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

const BAYER8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

/// Ordered threshold in (-0.5, 0.5) for pixel `(x, y)`.
fn threshold(mode: Dithering, x: usize, y: usize) -> f32 {
    match mode {
        Dithering::Ordered4x4 => (BAYER4[y % 4][x % 4] as f32 + 0.5) / 16.0 - 0.5,
        Dithering::Ordered8x8 => (BAYER8[y % 8][x % 8] as f32 + 0.5) / 64.0 - 0.5,
        _ => 0.0,
    }
}

/// Per-plane dithering state.
#[derive(Debug, Clone)]
pub struct Ditherer {
    mode: Dithering,
    /// Destination bits of each channel that gets dithered, 0 otherwise.
    bits: [u8; 4],
    current: Vec<Rgba>,
    next: Vec<Rgba>,
}

impl Ditherer {
    /// Sets up dithering from `src` to `dst` for rows of `width` pixels.
    pub fn new(mode: Dithering, src: Encoding, dst: Encoding, width: usize) -> Self {
        let mut bits = [0u8; 4];
        if mode != Dithering::None && !dst.is_float() {
            let src_bits = src.channel_bits();
            let dst_bits = dst.channel_bits();
            for c in 0..4 {
                if dst_bits[c] > 0 && src_bits[c] > dst_bits[c] {
                    bits[c] = dst_bits[c];
                }
            }
        }
        let diffusion = mode == Dithering::ErrorDiffusion && bits.iter().any(|&b| b > 0);
        let len = if diffusion { width + 2 } else { 0 };
        Self {
            mode,
            bits,
            current: vec![[0.0; 4]; len],
            next: vec![[0.0; 4]; len],
        }
    }

    /// Returns `true` when no channel is affected.
    pub fn is_noop(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Dithers row `y` in place.
    ///
    /// With error diffusion rows must be passed in order, top to bottom.
    pub fn apply(&mut self, y: usize, row: &mut [Rgba]) {
        if self.is_noop() {
            return;
        }
        match self.mode {
            Dithering::None => {}
            Dithering::Ordered4x4 | Dithering::Ordered8x8 => {
                for (x, px) in row.iter_mut().enumerate() {
                    let t = threshold(self.mode, x, y);
                    for c in 0..4 {
                        if self.bits[c] > 0 {
                            px[c] += t / unorm_max(self.bits[c]);
                        }
                    }
                }
            }
            Dithering::ErrorDiffusion => self.diffuse(row),
        }
    }

    fn diffuse(&mut self, row: &mut [Rgba]) {
        // Error rows are offset by one so x - 1 and x + 1 are always valid.
        for (x, px) in row.iter_mut().enumerate() {
            for c in 0..4 {
                let bits = self.bits[c];
                if bits == 0 {
                    continue;
                }
                let v = px[c] + self.current[x + 1][c];
                let q = quantize(v, bits);
                let err = v.clamp(0.0, 1.0) - q;
                px[c] = q;
                self.current[x + 2][c] += err * 7.0 / 16.0;
                self.next[x][c] += err * 3.0 / 16.0;
                self.next[x + 1][c] += err * 5.0 / 16.0;
                self.next[x + 2][c] += err * 1.0 / 16.0;
            }
        }
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.fill([0.0; 4]);
    }
}
