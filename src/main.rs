//! watermark-manager CLI - interactively watermark images in a working folder

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use watermark_manager::config::MissingOverlayPolicy;
use watermark_manager::prompt::TerminalPrompter;
use watermark_manager::{NamingScheme, Session, Settings, WatermarkError};

#[derive(Parser)]
#[command(name = "watermark-manager", about = "Add a text or image watermark to a picture")]
struct Args {
    /// JSON settings file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Folder holding source images, overlays and outputs
    #[arg(short, long)]
    dir: Option<PathBuf>,
    /// Exit after the first watermark instead of starting over
    #[arg(long)]
    once: bool,
    /// How output files are named
    #[arg(long, value_enum)]
    naming: Option<NamingScheme>,
    /// Font file for text watermarks (defaults to the bundled DejaVu Sans)
    #[arg(short, long)]
    font: Option<PathBuf>,
    /// Text watermark size in pixels
    #[arg(long)]
    font_size: Option<f32>,
    /// Ask again instead of quitting when the watermark image is missing
    #[arg(long)]
    retry_missing_overlay: bool,
    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn settings(&self) -> Result<Settings, WatermarkError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(dir) = &self.dir {
            settings.work_dir = dir.clone();
        }
        if self.once {
            settings.loop_after_success = false;
        }
        if let Some(naming) = self.naming {
            settings.naming = naming;
        }
        if let Some(font) = &self.font {
            settings.font_path = Some(font.clone());
        }
        if let Some(size) = self.font_size {
            settings.font_size = size;
        }
        if self.retry_missing_overlay {
            settings.missing_overlay = MissingOverlayPolicy::Retry;
        }
        Ok(settings)
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn main() -> Result<(), WatermarkError> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings = args.settings()?;
    tracing::debug!(?settings, "starting session");

    let mut session = Session::new(settings, TerminalPrompter::new())?;
    session.run()
}
