//! # gorgon-core
//!
//! Core types for the Gorgon image model.
//!
//! This crate describes images before any pixel is processed:
//!
//! - [`BufferFormat`], [`FormatInfo`] - Pixel format catalog
//! - [`compute_pitch`] - Row and slice pitch math
//! - [`ImageSettings`], [`ImageKind`] - Dimensions, kind and mip chain
//! - [`BufferLayout`], [`BufferSlot`] - Flat table of every plane in one allocation
//! - [`Plane`], [`PlaneMut`] - Borrowed views of one 2D plane
//! - [`Rect`], [`Region`] - Rectangles and texture boxes
//!
//! ## Crate Structure
//!
//! ```text
//! gorgon-core (this crate)
//!    ^
//!    |
//!    +-- gorgon-ops (pixel conversion, scaling, cropping)
//!    +-- gorgon-io (ImageData, codecs, texture upload)
//!    +-- gorgon-cli
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gorgon_core::prelude::*;
//!
//! let settings = ImageSettings::new_2d(64, 32, BufferFormat::R8G8B8A8UNorm).with_mip_count(0);
//! let layout = BufferLayout::new(&settings, PitchFlags::None).unwrap();
//!
//! let mip1 = layout.slot(1, 0).unwrap();
//! assert_eq!((mip1.width, mip1.height), (32, 16));
//! assert_eq!(mip1.offset, 64 * 32 * 4);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;
pub mod layout;
pub mod pitch;
pub mod plane;
pub mod rect;
pub mod settings;

// Re-exports for convenience
pub use error::*;
pub use format::*;
pub use layout::{BufferLayout, BufferSlot, size_in_bytes, total_depth_slices};
pub use pitch::{Pitch, PitchFlags, compute_pitch};
pub use plane::{Plane, PlaneMut};
pub use rect::*;
pub use settings::*;

/// Prelude module for convenient imports.
///
/// ```
/// use gorgon_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::format::{BufferFormat, FormatInfo};
    pub use crate::layout::{BufferLayout, BufferSlot};
    pub use crate::pitch::{Pitch, PitchFlags, compute_pitch};
    pub use crate::plane::{Plane, PlaneMut};
    pub use crate::rect::{Rect, Region};
    pub use crate::settings::{ImageKind, ImageSettings};
}
