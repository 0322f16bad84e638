//! Mip generation command.

use crate::MipgenArgs;
use anyhow::Result;
use gorgon_io::CodecRegistry;
use tracing::{debug, info};

pub fn run(args: MipgenArgs, registry: &CodecRegistry, verbose: u8) -> Result<()> {
    let mut image = super::load_image(&args.input, registry)?;
    let before = image.settings().mip_count;

    debug!(input = %args.input.display(), requested = args.mip_count, filter = %args.filter, "mipgen");
    let mips = image.generate_mip_maps(args.mip_count, args.filter)?;
    info!(from = before, to = mips, "generated mip chain");

    if verbose > 0 {
        let s = image.settings();
        println!("Mips {} -> {} ({}x{}, {} filter)", before, mips, s.width, s.height, args.filter);
    }

    super::save_image(&args.output, &image, registry)?;

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}
