//! Format catalog listing.

use crate::FormatsArgs;
use anyhow::Result;
use gorgon_core::BufferFormat;
use gorgon_ops::{PixelConverter, SoftwareConverter};

pub fn run(args: FormatsArgs) -> Result<()> {
    let converter = SoftwareConverter::new();

    println!("{:<28} {:>4} {:>6} {:>6}  flags", "format", "bpp", "block", "bytes");
    for &format in BufferFormat::ALL {
        let convertible = converter.supports(format);
        if args.convertible && !convertible {
            continue;
        }

        let info = format.info();
        let block = format!("{}x{}", info.block_width, info.block_height);
        println!(
            "{:<28} {:>4} {:>6} {:>6}  {}",
            format.name(),
            info.bits_per_pixel,
            block,
            info.block_bytes,
            flags(format, convertible)
        );
    }

    Ok(())
}

fn flags(format: BufferFormat, convertible: bool) -> String {
    let info = format.info();
    let mut out = Vec::new();
    if info.is_compressed {
        out.push("compressed");
    }
    if info.is_packed {
        out.push("packed");
    }
    if info.has_alpha {
        out.push("alpha");
    }
    if info.has_depth {
        out.push("depth");
    }
    if info.has_stencil {
        out.push("stencil");
    }
    if info.is_srgb {
        out.push("srgb");
    }
    if convertible {
        out.push("convert");
    }
    out.join(",")
}
