//! Plane scaling filters and separable resampling.
//!
//! # Filters
//!
//! - [`ImageFilter::Point`] - Nearest source pixel, no interpolation
//! - [`ImageFilter::Linear`] - Triangle kernel
//! - [`ImageFilter::Cubic`] - Mitchell-Netravali cubic
//! - [`ImageFilter::Fant`] - Area average (exact 2x2 box when halving)
//!
//! Resampling is two passes: horizontal into a temporary buffer, then
//! vertical. Each pass precomputes the source span and normalized weights
//! of every destination column or row.
//!
//! ```rust
//! use gorgon_ops::resize::{resample, ImageFilter};
//!
//! let src = vec![[0.5f32; 4]; 16 * 16];
//! let dst = resample(&src, 16, 16, 8, 8, ImageFilter::Fant).unwrap();
//! assert_eq!(dst.len(), 64);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::encoding::Rgba;
use crate::parallel::for_each_row;
use crate::{OpsError, OpsResult};

/// Filter used when scaling planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFilter {
    /// Nearest neighbour.
    Point,
    /// Linear interpolation.
    Linear,
    /// Cubic interpolation.
    Cubic,
    /// Area averaging.
    #[default]
    Fant,
}

impl ImageFilter {
    /// Support radius of the kernel at unit scale.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            ImageFilter::Point => 0.5,
            ImageFilter::Linear => 1.0,
            ImageFilter::Cubic => 2.0,
            ImageFilter::Fant => 0.5,
        }
    }

    /// Evaluates the kernel at distance `x`.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            ImageFilter::Point | ImageFilter::Fant => box_weight(x),
            ImageFilter::Linear => linear_weight(x),
            ImageFilter::Cubic => cubic_weight(x),
        }
    }
}

impl fmt::Display for ImageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFilter::Point => "point",
            ImageFilter::Linear => "linear",
            ImageFilter::Cubic => "cubic",
            ImageFilter::Fant => "fant",
        })
    }
}

impl FromStr for ImageFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "point" | "nearest" => Ok(ImageFilter::Point),
            "linear" | "bilinear" => Ok(ImageFilter::Linear),
            "cubic" | "bicubic" => Ok(ImageFilter::Cubic),
            "fant" | "box" | "area" => Ok(ImageFilter::Fant),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

#[inline]
fn box_weight(x: f32) -> f32 {
    if x.abs() < 0.5 { 1.0 } else { 0.0 }
}

#[inline]
fn linear_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Mitchell-Netravali with B = C = 1/3.
#[inline]
fn cubic_weight(x: f32) -> f32 {
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax + (6.0 - 2.0 * B)) / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax + (6.0 * B + 30.0 * C) * ax * ax + (-12.0 * B - 48.0 * C) * ax + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

/// Source span and weights feeding one destination sample.
#[derive(Debug, Clone)]
struct Contribution {
    start: usize,
    weights: Vec<f32>,
}

fn contributions(filter: ImageFilter, src_len: usize, dst_len: usize) -> Vec<Contribution> {
    let scale = src_len as f32 / dst_len as f32;
    (0..dst_len)
        .map(|x| match filter {
            ImageFilter::Point => {
                let sx = (((x as f32 + 0.5) * scale) as usize).min(src_len - 1);
                Contribution {
                    start: sx,
                    weights: vec![1.0],
                }
            }
            ImageFilter::Fant => area_contribution(x, scale, src_len),
            ImageFilter::Linear | ImageFilter::Cubic => kernel_contribution(filter, x, scale, src_len),
        })
        .collect()
}

/// Coverage of destination sample `x` over the source samples it spans.
fn area_contribution(x: usize, scale: f32, src_len: usize) -> Contribution {
    let lo = x as f32 * scale;
    let hi = (x as f32 + 1.0) * scale;
    let start = (lo.floor() as usize).min(src_len - 1);
    let end = (hi.ceil() as usize).clamp(start + 1, src_len);

    let mut weights: Vec<f32> = (start..end)
        .map(|s| (hi.min(s as f32 + 1.0) - lo.max(s as f32)).max(0.0))
        .collect();
    normalize(&mut weights);
    Contribution { start, weights }
}

fn kernel_contribution(filter: ImageFilter, x: usize, scale: f32, src_len: usize) -> Contribution {
    let support = filter.support() * scale.max(1.0);
    let center = (x as f32 + 0.5) * scale - 0.5;
    let left = ((center - support).floor() as isize).max(0) as usize;
    let right = ((center + support).ceil().max(0.0) as usize).min(src_len - 1);
    let left = left.min(right);

    let mut weights: Vec<f32> = (left..=right)
        .map(|sx| filter.weight((sx as f32 - center) / scale.max(1.0)))
        .collect();
    if weights.iter().sum::<f32>() <= 0.0 {
        // Degenerate span: fall back to the nearest sample.
        let nearest = (center.round().max(0.0) as usize).clamp(left, right);
        weights.iter_mut().for_each(|w| *w = 0.0);
        weights[nearest - left] = 1.0;
    }
    normalize(&mut weights);
    Contribution { start: left, weights }
}

fn normalize(weights: &mut [f32]) {
    let sum: f32 = weights.iter().sum();
    if sum > 0.0 {
        weights.iter_mut().for_each(|w| *w /= sum);
    }
}

/// Resamples an RGBA plane from `src_w x src_h` to `dst_w x dst_h`.
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] when `src` does not hold
/// `src_w * src_h` pixels or a size is zero.
pub fn resample(
    src: &[Rgba],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
    filter: ImageFilter,
) -> OpsResult<Vec<Rgba>> {
    let expected = src_w * src_h;
    if src.len() != expected || expected == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "expected {} pixels, got {}",
            expected,
            src.len()
        )));
    }
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }

    let temp = resize_horizontal(src, src_w, src_h, dst_w, filter);
    Ok(resize_vertical(&temp, dst_w, src_h, dst_h, filter))
}

fn resize_horizontal(src: &[Rgba], src_w: usize, src_h: usize, dst_w: usize, filter: ImageFilter) -> Vec<Rgba> {
    let table = contributions(filter, src_w, dst_w);
    let mut dst = vec![[0.0f32; 4]; dst_w * src_h];

    for_each_row(&mut dst, dst_w, src_h, |y, row| {
        let line = &src[y * src_w..(y + 1) * src_w];
        for (out, c) in row.iter_mut().zip(&table) {
            let mut sum = [0.0f32; 4];
            for (px, w) in line[c.start..].iter().zip(&c.weights) {
                for ch in 0..4 {
                    sum[ch] += px[ch] * w;
                }
            }
            *out = sum;
        }
    });

    dst
}

fn resize_vertical(src: &[Rgba], width: usize, src_h: usize, dst_h: usize, filter: ImageFilter) -> Vec<Rgba> {
    let table = contributions(filter, src_h, dst_h);
    let mut dst = vec![[0.0f32; 4]; width * dst_h];

    for_each_row(&mut dst, width, dst_h, |y, row| {
        let c = &table[y];
        for (i, w) in c.weights.iter().enumerate() {
            let line = &src[(c.start + i) * width..(c.start + i + 1) * width];
            for (out, px) in row.iter_mut().zip(line) {
                for ch in 0..4 {
                    out[ch] += px[ch] * w;
                }
            }
        }
    });

    dst
}
