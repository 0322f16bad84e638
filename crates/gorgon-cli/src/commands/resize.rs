//! Resize command
//!
//! Scales every plane with the chosen filter, or clips to the top-left
//! region with `--clip`.

use crate::ResizeArgs;
use anyhow::Result;
use gorgon_io::CodecRegistry;
use tracing::debug;

pub fn run(args: ResizeArgs, registry: &CodecRegistry, verbose: u8) -> Result<()> {
    let mut image = super::load_image(&args.input, registry)?;
    let (src_w, src_h) = (image.settings().width, image.settings().height);

    if verbose > 0 {
        let how = if args.clip { "clip".to_string() } else { args.filter.to_string() };
        println!("Resizing {}x{} -> {}x{} ({})", src_w, src_h, args.width, args.height, how);
    }

    debug!(width = args.width, height = args.height, clip = args.clip, "resize");
    image.resize(args.width, args.height, args.clip, args.filter)?;

    super::save_image(&args.output, &image, registry)?;

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}
