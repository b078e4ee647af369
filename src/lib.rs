//! Interactive watermarking of single image files.
//!
//! A run picks a source image from a flat working directory, optionally
//! applies one edit (brightness, contrast, greyscale, invert), stamps a text
//! or image watermark on the result and sweeps leftover intermediates.

pub mod cleanup;
pub mod codec;
pub mod config;
pub mod edit;
pub mod naming;
pub mod prompt;
pub mod session;
pub mod text;
pub mod watermark;

pub use codec::ImageAsset;
pub use config::Settings;
pub use edit::EditSpec;
pub use naming::{Naming, NamingScheme};
pub use session::Session;
pub use watermark::{WatermarkSpec, Watermarker};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// What a missing file was needed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Source,
    Overlay,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Source => f.write_str("source image"),
            ResourceKind::Overlay => f.write_str("watermark image"),
        }
    }
}

#[derive(Error, Debug)]
pub enum WatermarkError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{kind} not found: {}", path.display())]
    ResourceNotFound { kind: ResourceKind, path: PathBuf },
    #[error("Not a number: {0:?}")]
    InvalidAmount(String),
    #[error("Font error: {0}")]
    Font(String),
    #[error("Prompt error: {0}")]
    Prompt(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl WatermarkError {
    pub fn is_missing_overlay(&self) -> bool {
        matches!(
            self,
            WatermarkError::ResourceNotFound {
                kind: ResourceKind::Overlay,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, WatermarkError>;
