//! Image info command.
//!
//! Displays image settings and, with `--slots`, every buffer slot.

use crate::InfoArgs;
use anyhow::Result;
use gorgon_io::{CodecRegistry, ImageData};
use std::fs;
use std::path::Path;

/// Runs the info command.
pub fn run(args: InfoArgs, registry: &CodecRegistry, verbose: u8) -> Result<()> {
    for path in &args.input {
        let file_size = fs::metadata(path)?.len();
        let image = super::load_image(path, registry)?;

        print_settings(path, &image, file_size, verbose);
        if args.slots {
            print_slots(&image);
        }

        if args.input.len() > 1 {
            println!();
        }
    }

    Ok(())
}

fn print_settings(path: &Path, image: &ImageData, file_size: u64, verbose: u8) {
    let s = image.settings();
    let info = s.format_info();

    println!("{}", path.display());
    println!("  Kind:       {}", s.kind);
    println!("  Resolution: {}x{}x{}", s.width, s.height, s.depth);
    println!("  Format:     {}", s.format);
    println!("  Array:      {}", s.array_count);
    println!("  Mips:       {} (max {})", s.mip_count, s.max_mip_count());
    println!("  Buffer:     {}", super::format_size(image.size_in_bytes() as u64));
    println!("  File size:  {}", super::format_size(file_size));

    if verbose > 0 {
        println!("  Pitch:      {:?}", image.pitch_flags());
        println!("  Bits/pixel: {}", info.bits_per_pixel);
        if info.is_block_format() {
            println!("  Block:      {}x{} ({} bytes)", info.block_width, info.block_height, info.block_bytes);
        }
        println!("  Slots:      {}", image.slots().len());
    }
}

fn print_slots(image: &ImageData) {
    println!(
        "  {:>4} {:>5} {:>16} {:>10} {:>12} {:>12}",
        "mip", "index", "size", "row pitch", "slice pitch", "offset"
    );
    for slot in image.slots() {
        let size = format!("{}x{}x{}", slot.width, slot.height, slot.depth);
        println!(
            "  {:>4} {:>5} {:>16} {:>10} {:>12} {:>12}",
            slot.mip_level, slot.index, size, slot.row_pitch, slot.slice_pitch, slot.offset
        );
    }
}
