//! Runtime settings, loadable from a JSON file.

use crate::naming::NamingScheme;
use crate::text::DEFAULT_FONT_SIZE;
use crate::watermark::{DEFAULT_OPACITY, DEFAULT_OVERLAY_WIDTH};
use crate::{Result, WatermarkError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// What the session does when the requested watermark image is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingOverlayPolicy {
    /// End the session with the error.
    #[default]
    Abort,
    /// Report it and ask for the watermark again.
    Retry,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Flat directory holding sources, overlays and outputs.
    pub work_dir: PathBuf,
    /// Start over after a successful watermark instead of exiting.
    pub loop_after_success: bool,
    pub naming: NamingScheme,
    /// TTF/OTF used for text watermarks; the bundled font when unset.
    pub font_path: Option<PathBuf>,
    pub font_size: f32,
    pub overlay_width: u32,
    pub overlay_opacity: f32,
    pub missing_overlay: MissingOverlayPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("img"),
            loop_after_success: true,
            naming: NamingScheme::Readable,
            font_path: None,
            font_size: DEFAULT_FONT_SIZE,
            overlay_width: DEFAULT_OVERLAY_WIDTH,
            overlay_opacity: DEFAULT_OPACITY,
            missing_overlay: MissingOverlayPolicy::Abort,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| WatermarkError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(WatermarkError::Config(format!(
                "font_size must be positive, got {}",
                self.font_size
            )));
        }
        if self.overlay_width == 0 {
            return Err(WatermarkError::Config("overlay_width must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(WatermarkError::Config(format!(
                "overlay_opacity must be within [0, 1], got {}",
                self.overlay_opacity
            )));
        }
        Ok(())
    }
}
