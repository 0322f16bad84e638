//! gorgon - inspect and reshape images in the Gorgon image model
//!
//! Usage:
//!   gorgon info <file>... [--slots]
//!   gorgon mipgen <in> -o <out> [-m count] [-f filter]
//!   gorgon resize <in> -o <out> -w W -h H [--clip] [-f filter]
//!   gorgon convert <in> -o <out> --format NAME [--dither mode]
//!   gorgon formats

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use gorgon_core::BufferFormat;
use gorgon_io::CodecRegistry;
use gorgon_ops::{Dithering, ImageFilter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "gorgon")]
#[command(author, version, about = "Mip chains, resizing and format conversion for GPU-ready images")]
#[command(long_about = r#"
gorgon - GPU image buffer tool

Loads images into one allocation holding every mip level, array element
and depth slice, reshapes them and writes them back out.

EXAMPLES:
  gorgon info albedo.png --slots
  gorgon mipgen albedo.png -o albedo.gorimg -f cubic
  gorgon resize albedo.png -o half.png -w 512 -h 512
  gorgon convert albedo.png -o albedo.gorimg --format B5G6R5_UNorm --dither diffusion
  RUST_LOG=gorgon_io=trace gorgon mipgen in.gorimg -o out.gorimg
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for more: -v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image settings and buffer layout
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Generate mip levels
    #[command(visible_alias = "mip")]
    Mipgen(MipgenArgs),

    /// Resize image (scale or clip)
    #[command(disable_help_flag = true)]
    Resize(ResizeArgs),

    /// Convert to another pixel format
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// List known pixel formats
    Formats(FormatsArgs),
}

/// Arguments for the `info` command.
#[derive(Args)]
struct InfoArgs {
    /// Input file(s)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Print every buffer slot
    #[arg(long)]
    slots: bool,
}

/// Arguments for the `mipgen` command.
#[derive(Args)]
struct MipgenArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Mip level count (0 = full chain)
    #[arg(short = 'm', long = "mips", default_value = "0")]
    mip_count: u32,

    /// Filter: point, linear, cubic, fant
    #[arg(short, long, default_value = "fant")]
    filter: ImageFilter,
}

/// Arguments for the `resize` command.
#[derive(Args)]
struct ResizeArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Target width
    #[arg(short, long)]
    width: u32,

    /// Target height
    #[arg(short = 'h', long)]
    height: u32,

    /// Keep the top-left region instead of scaling
    #[arg(long)]
    clip: bool,

    /// Filter: point, linear, cubic, fant
    #[arg(short, long, default_value = "fant")]
    filter: ImageFilter,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

/// Arguments for the `convert` command.
#[derive(Args)]
struct ConvertArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Target format name, e.g. R16G16B16A16_Float (see `gorgon formats`)
    #[arg(long)]
    format: BufferFormat,

    /// Dithering: none, ordered4x4, ordered8x8, diffusion
    #[arg(short, long, default_value = "none")]
    dither: Dithering,
}

/// Arguments for the `formats` command.
#[derive(Args)]
struct FormatsArgs {
    /// Only formats the software converter can process
    #[arg(long)]
    convertible: bool,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let registry = CodecRegistry::with_builtin();

    match cli.command {
        Commands::Info(args) => commands::info::run(args, &registry, cli.verbose),
        Commands::Mipgen(args) => commands::mipgen::run(args, &registry, cli.verbose),
        Commands::Resize(args) => commands::resize::run(args, &registry, cli.verbose),
        Commands::Convert(args) => commands::convert::run(args, &registry, cli.verbose),
        Commands::Formats(args) => commands::formats::run(args),
    }
}
