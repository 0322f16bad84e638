//! # gorgon-ops
//!
//! Per-plane pixel operations for the Gorgon image model.
//!
//! The image model never touches pixel values itself; it hands planes to
//! a [`PixelConverter`]. This crate defines that capability and ships
//! [`SoftwareConverter`], a CPU implementation.
//!
//! # Modules
//!
//! - [`convert`] - The converter capability and its software implementation
//! - [`encoding`] - Byte layouts of the supported formats
//! - [`dither`] - Ordered and error-diffusion dithering
//! - [`resize`] - Scaling filters and separable resampling
//!
//! # Example
//!
//! ```rust
//! use gorgon_core::{BufferFormat, Plane, PlaneMut};
//! use gorgon_ops::{ImageFilter, PixelConverter, SoftwareConverter};
//!
//! let src_bytes = [0u8, 255, 255, 0];
//! let src = Plane::new(&src_bytes, BufferFormat::R8UNorm, 2, 2, 2).unwrap();
//! let mut dst_bytes = [0u8; 1];
//! let mut dst = PlaneMut::new(&mut dst_bytes, BufferFormat::R8UNorm, 1, 1, 1).unwrap();
//!
//! SoftwareConverter::new().scale_plane(&src, &mut dst, ImageFilter::Fant).unwrap();
//! assert_eq!(dst_bytes, [128]);
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` - Process rows with Rayon (enabled by default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod convert;
pub mod dither;
pub mod encoding;
pub mod parallel;
pub mod resize;

pub use convert::{PixelConverter, SoftwareConverter};
pub use dither::Dithering;
pub use encoding::Encoding;
pub use error::{OpsError, OpsResult};
pub use resize::ImageFilter;
