//! Text and image watermarks.

use crate::codec::{self, ImageAsset};
use crate::naming::Naming;
use crate::text::TextRenderer;
use crate::{ResourceKind, Result, WatermarkError};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_OVERLAY_WIDTH: u32 = 100;
pub const DEFAULT_OPACITY: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkSpec {
    Text(String),
    /// Path to the overlay image.
    Image(PathBuf),
}

/// Size of an overlay scaled to `target_width`, keeping its aspect ratio.
pub fn overlay_size(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    let scaled = (target_width as f64 * height as f64 / width.max(1) as f64).round() as u32;
    (target_width, scaled.max(1))
}

/// Top-left corner that centres `overlay` on `base`. Negative when the
/// overlay is larger than the base.
pub fn overlay_offset(base: (u32, u32), overlay: (u32, u32)) -> (i64, i64) {
    let x = (base.0 as f64 - overlay.0 as f64) / 2.0;
    let y = (base.1 as f64 - overlay.1 as f64) / 2.0;
    (x.round() as i64, y.round() as i64)
}

pub struct Watermarker {
    renderer: TextRenderer,
    overlay_width: u32,
    opacity: f32,
}

impl Watermarker {
    pub fn new(renderer: TextRenderer) -> Self {
        Self {
            renderer,
            overlay_width: DEFAULT_OVERLAY_WIDTH,
            opacity: DEFAULT_OPACITY,
        }
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.renderer = self.renderer.with_size(size);
        self
    }

    pub fn with_overlay_width(mut self, width: u32) -> Self {
        self.overlay_width = width.max(1);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Stamp `spec` onto `input`; the output is named after the asset's origin.
    pub fn apply(
        &self,
        spec: &WatermarkSpec,
        input: &ImageAsset,
        naming: &Naming,
    ) -> Result<ImageAsset> {
        let output = input.derive(&naming.watermarked(input.origin()));

        let canvas = match spec {
            WatermarkSpec::Text(text) => {
                let mut canvas = input.decode()?.to_rgba8();
                debug!(text = %text, "drawing text watermark");
                self.renderer.draw(&mut canvas, text);
                canvas
            }
            WatermarkSpec::Image(path) => {
                if !path.is_file() {
                    return Err(WatermarkError::ResourceNotFound {
                        kind: ResourceKind::Overlay,
                        path: path.clone(),
                    });
                }
                let overlay = codec::open_image(path)?;
                let mut canvas = input.decode()?.to_rgba8();
                self.composite(&mut canvas, &overlay);
                canvas
            }
        };

        codec::write_full_quality(&DynamicImage::ImageRgba8(canvas), output.path())?;
        info!(output = %output.path().display(), "wrote watermarked image");
        Ok(output)
    }

    fn composite(&self, canvas: &mut RgbaImage, overlay: &DynamicImage) {
        let (w, h) = overlay_size(overlay.width(), overlay.height(), self.overlay_width);
        let mut overlay = imageops::resize(&overlay.to_rgba8(), w, h, FilterType::Triangle);
        for pixel in overlay.pixels_mut() {
            pixel.0[3] = (pixel.0[3] as f32 * self.opacity).round() as u8;
        }

        let (x, y) = overlay_offset(canvas.dimensions(), overlay.dimensions());
        debug!(x, y, w, h, "compositing image watermark");
        imageops::overlay(canvas, &overlay, x, y);
    }
}
