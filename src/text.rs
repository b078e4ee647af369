//! Text rendering onto RGBA canvases using fontdue layout.

use crate::{Result, WatermarkError};
use fontdue::layout::{
    CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle, VerticalAlign,
};
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use std::path::Path;

static DEFAULT_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

pub const DEFAULT_FONT_SIZE: f32 = 16.0;

const INK: [u8; 3] = [0, 0, 0];

/// Region text is laid out in, with its alignment.
#[derive(Clone, Copy)]
pub struct TextBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl TextBox {
    /// The whole canvas, centred on both axes.
    pub fn covering(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            horizontal: HorizontalAlign::Center,
            vertical: VerticalAlign::Middle,
        }
    }

    fn settings(&self) -> LayoutSettings {
        LayoutSettings {
            x: self.x,
            y: self.y,
            max_width: Some(self.width),
            max_height: Some(self.height),
            horizontal_align: self.horizontal,
            vertical_align: self.vertical,
            ..LayoutSettings::default()
        }
    }
}

pub struct TextRenderer {
    font: Font,
    size: f32,
}

impl TextRenderer {
    /// Renderer using the bundled DejaVu Sans.
    pub fn new() -> Result<Self> {
        Self::from_bytes(DEFAULT_FONT)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    fn from_bytes(data: impl std::ops::Deref<Target = [u8]>) -> Result<Self> {
        let font = Font::from_bytes(data, FontSettings::default())
            .map_err(|e| WatermarkError::Font(e.to_string()))?;
        Ok(Self {
            font,
            size: DEFAULT_FONT_SIZE,
        })
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Draw `text` centred over the whole canvas.
    pub fn draw(&self, canvas: &mut RgbaImage, text: &str) {
        let area = TextBox::covering(canvas.width(), canvas.height());
        self.draw_in(canvas, text, &area);
    }

    pub fn draw_in(&self, canvas: &mut RgbaImage, text: &str, area: &TextBox) {
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&area.settings());
        layout.append(&[&self.font], &TextStyle::new(text, self.size, 0));

        let (w, h) = (canvas.width() as i64, canvas.height() as i64);
        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (_, bitmap) = self.font.rasterize_config(glyph.key);
            let (gx, gy) = (glyph.x.round() as i64, glyph.y.round() as i64);

            for sy in 0..glyph.height {
                for sx in 0..glyph.width {
                    let tx = gx + sx as i64;
                    let ty = gy + sy as i64;
                    if tx < 0 || ty < 0 || tx >= w || ty >= h {
                        continue;
                    }
                    let coverage = bitmap[sy * glyph.width + sx];
                    if coverage > 0 {
                        blend_ink(canvas.get_pixel_mut(tx as u32, ty as u32), coverage);
                    }
                }
            }
        }
    }
}

fn blend_ink(pixel: &mut Rgba<u8>, coverage: u8) {
    let a = coverage as f32 / 255.0;
    for (c, ink) in pixel.0[..3].iter_mut().zip(INK) {
        *c = (ink as f32 * a + *c as f32 * (1.0 - a)).round() as u8;
    }
    let alpha = pixel.0[3] as f32;
    pixel.0[3] = (alpha + (255.0 - alpha) * a).round() as u8;
}
