//! # gorgon-io
//!
//! Owned image data, codecs and texture upload for the Gorgon image model.
//!
//! - [`ImageData`] - One allocation holding every mip level, array element
//!   and depth slice, with mip generation, resizing and format conversion
//! - [`ImageCodec`] - Codec capability; [`RawCodec`] and [`PngCodec`] ship here
//! - [`CodecRegistry`] - Codec lookup by name, extension or stream header
//! - [`TextureTarget`] - Texture upload seam; [`MemoryTexture`] is the CPU target
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gorgon_io::{CodecRegistry, ImageData};
//! use gorgon_ops::ImageFilter;
//!
//! let registry = CodecRegistry::with_builtin();
//! let mut image = ImageData::load_file("albedo.png", &registry)?;
//! image.generate_mip_maps(0, ImageFilter::Fant)?;
//! image.save_file("albedo.gorimg", &registry)?;
//! # Ok::<(), gorgon_io::ImageError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `png` - PNG codec (enabled by default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;

pub mod codec;
pub mod image;
#[cfg(feature = "png")]
pub mod png;
pub mod raw;
pub mod registry;
pub mod texture;

pub use codec::{DecodedImage, ImageCodec, ReadSeek};
pub use error::{ImageError, ImageResult};
pub use image::ImageData;
#[cfg(feature = "png")]
pub use png::PngCodec;
pub use raw::RawCodec;
pub use registry::CodecRegistry;
pub use texture::{MemoryTexture, TextureDesc, TextureTarget, TextureUsage};
