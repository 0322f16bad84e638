//! Pixel format conversion command.

use crate::ConvertArgs;
use anyhow::{Context, Result};
use gorgon_io::CodecRegistry;
use tracing::{info, trace};

/// Runs the convert command.
pub fn run(args: ConvertArgs, registry: &CodecRegistry, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), output = %args.output.display(), "convert::run");

    let mut image = super::load_image(&args.input, registry)?;
    let from = image.format();

    info!(from = %from, to = %args.format, dither = %args.dither, "Converting format");
    if verbose > 0 {
        println!("Converting {} -> {} (dither: {})", from, args.format, args.dither);
    }

    image
        .convert_format(args.format, args.dither)
        .with_context(|| format!("Cannot convert {} to {}", from, args.format))?;

    super::save_image(&args.output, &image, registry)?;

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}
