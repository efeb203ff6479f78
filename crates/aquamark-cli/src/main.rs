//! Aquamark CLI - Command line tool for watermarking PDF documents.

use anyhow::{Context, Result};
use aquamark_core::{AppConfig, Watermarker};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "aquamark")]
#[command(author, version, about = "Watermark PDF documents", long_about = None)]
struct Args {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Watermark logo (PNG)
    #[arg(short, long, env = "AQUAMARK_LOGO")]
    logo: PathBuf,

    /// Output PDF file (default: input-watermarked.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Jurisdiction code or name for the compliance advisory
    #[arg(short, long, env = "AQUAMARK_STATE")]
    state: Option<String>,

    /// Tile opacity in (0, 1]
    #[arg(long)]
    opacity: Option<f32>,

    /// Rendered tile width in document units
    #[arg(long)]
    tile_width: Option<f32>,

    /// Tile rotation in degrees (counter-clockwise)
    #[arg(long)]
    rotation: Option<f32>,

    /// Tile columns per page
    #[arg(long)]
    columns: Option<u32>,

    /// Tile rows per page
    #[arg(long)]
    rows: Option<u32>,

    /// Fail on documents that declare encryption
    #[arg(long)]
    strict_encryption: bool,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    // Override config with CLI arguments
    if let Some(opacity) = args.opacity {
        config.watermark.opacity = opacity;
    }
    if let Some(tile_width) = args.tile_width {
        config.watermark.tile_width = tile_width;
    }
    if let Some(rotation) = args.rotation {
        config.watermark.rotation_degrees = rotation;
    }
    if let Some(columns) = args.columns {
        config.watermark.grid.columns = columns;
    }
    if let Some(rows) = args.rows {
        config.watermark.grid.rows = rows;
    }
    if args.strict_encryption {
        config.watermark.ignore_encryption = false;
    }

    let watermarker = Watermarker::new(config).context("Invalid watermark configuration")?;

    // Load inputs
    info!("Loading PDF: {}", args.input.display());
    let pdf_bytes = std::fs::read(&args.input)
        .context(format!("Failed to read PDF: {}", args.input.display()))?;
    let logo_bytes = std::fs::read(&args.logo)
        .context(format!("Failed to read logo: {}", args.logo.display()))?;

    // Setup progress bar
    let pb = ProgressBar::new(0);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages")
            .unwrap()
            .progress_chars("#>-"),
    );

    let output_bytes = watermarker
        .apply_with_progress(&pdf_bytes, &logo_bytes, |done, total| {
            pb.set_length(u64::from(total));
            pb.set_position(u64::from(done));
        })
        .context("Failed to watermark document")?;

    pb.finish_with_message("Watermarking complete");

    // Determine output path
    let output_path = args.output.unwrap_or_else(|| {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        args.input.with_file_name(format!("{stem}-watermarked.pdf"))
    });

    // Save output
    std::fs::write(&output_path, output_bytes)
        .context(format!("Failed to write output: {}", output_path.display()))?;

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        if let Some(advisory) = watermarker.disclaimers().advisory(args.state.as_deref()) {
            println!("Disclaimer: {advisory}");
        }
        println!("Watermarked PDF saved to: {}", output_path.display());
    }

    Ok(())
}
