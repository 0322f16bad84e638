//! CLI command implementations

pub mod convert;
pub mod formats;
pub mod info;
pub mod mipgen;
pub mod resize;

use anyhow::{Context, Result};
use gorgon_io::{CodecRegistry, ImageData};
use std::path::Path;

/// Load image from path
pub fn load_image(path: &Path, registry: &CodecRegistry) -> Result<ImageData> {
    ImageData::load_file(path, registry).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &ImageData, registry: &CodecRegistry) -> Result<()> {
    image
        .save_file(path, registry)
        .with_context(|| format!("Failed to save: {}", path.display()))
}

/// Format file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
