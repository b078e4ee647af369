//! Optional pre-processing applied before the watermark.

use crate::codec::{self, ImageAsset};
use crate::naming::Naming;
use crate::{Result, WatermarkError};
use image::{DynamicImage, RgbaImage};
use tracing::{debug, info};

/// One edit. Amounts are conventionally in [-1, 1] but are not clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditSpec {
    Brighten(f32),
    Contrast(f32),
    Greyscale,
    Invert,
}

impl EditSpec {
    pub fn apply_to(&self, image: DynamicImage) -> DynamicImage {
        match *self {
            EditSpec::Brighten(amount) => {
                DynamicImage::ImageRgba8(map_channels(image.to_rgba8(), |c| brighten(c, amount)))
            }
            EditSpec::Contrast(amount) => {
                let factor = (amount + 1.0) / (1.0 - amount);
                DynamicImage::ImageRgba8(map_channels(image.to_rgba8(), |c| contrast(c, factor)))
            }
            EditSpec::Greyscale => image.grayscale(),
            EditSpec::Invert => {
                let mut image = image;
                image.invert();
                image
            }
        }
    }
}

/// Parse a brightness or contrast amount typed by the user.
pub fn parse_amount(raw: &str) -> Result<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| WatermarkError::InvalidAmount(raw.to_string()))
}

/// Apply `spec` to `input` and write the intermediate next to it.
pub fn apply_edit(spec: EditSpec, input: &ImageAsset, naming: &Naming) -> Result<ImageAsset> {
    let output = input.derive(&naming.edited(input.origin()));
    debug!(?spec, input = %input.path().display(), "applying edit");

    let edited = spec.apply_to(input.decode()?);
    codec::write_full_quality(&edited, output.path())?;

    info!(output = %output.path().display(), "wrote edited image");
    Ok(output)
}

fn brighten(c: f32, amount: f32) -> f32 {
    if amount < 0.0 {
        c * (1.0 + amount)
    } else {
        c + (255.0 - c) * amount
    }
}

fn contrast(c: f32, factor: f32) -> f32 {
    (factor * (c - 127.0) + 127.0).floor()
}

// Colour channels only; alpha passes through.
fn map_channels(mut image: RgbaImage, f: impl Fn(f32) -> f32) -> RgbaImage {
    for pixel in image.pixels_mut() {
        for c in &mut pixel.0[..3] {
            *c = f(*c as f32).clamp(0.0, 255.0).round() as u8;
        }
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    fn solid(px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba(px)))
    }

    fn first_pixel(image: &DynamicImage) -> [u8; 4] {
        image.get_pixel(0, 0).0
    }

    #[test]
    fn parse_amount_accepts_numbers() {
        assert_eq!(parse_amount("0.5").unwrap(), 0.5);
        assert_eq!(parse_amount(" -1 ").unwrap(), -1.0);
        assert_eq!(parse_amount("3").unwrap(), 3.0);
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        for raw in ["abc", "", "NaN", "inf", "0.5x"] {
            assert!(
                matches!(parse_amount(raw), Err(WatermarkError::InvalidAmount(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn brighten_moves_towards_white() {
        let out = EditSpec::Brighten(0.5).apply_to(solid([100, 0, 255, 77]));
        assert_eq!(first_pixel(&out), [178, 128, 255, 77]);
    }

    #[test]
    fn negative_brighten_darkens() {
        let out = EditSpec::Brighten(-0.5).apply_to(solid([100, 0, 255, 255]));
        assert_eq!(first_pixel(&out), [50, 0, 128, 255]);
    }

    #[test]
    fn contrast_spreads_from_midpoint() {
        let out = EditSpec::Contrast(0.5).apply_to(solid([127, 100, 200, 255]));
        // factor 3
        assert_eq!(first_pixel(&out), [127, 46, 255, 255]);
    }

    #[test]
    fn contrast_at_one_is_degenerate_not_an_error() {
        let out = EditSpec::Contrast(1.0).apply_to(solid([0, 255, 10, 255]));
        assert_eq!(first_pixel(&out), [0, 255, 0, 255]);
    }

    #[test]
    fn invert_keeps_alpha() {
        let out = EditSpec::Invert.apply_to(solid([0, 100, 255, 90]));
        assert_eq!(first_pixel(&out), [255, 155, 0, 90]);
    }

    #[test]
    fn greyscale_equalises_channels() {
        let out = EditSpec::Greyscale.apply_to(solid([200, 30, 90, 255]));
        let [r, g, b, _] = first_pixel(&out);
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn apply_edit_writes_intermediate() {
        let dir = tempfile::tempdir().unwrap();
        solid([10, 20, 30, 255]).save(dir.path().join("pic.png")).unwrap();
        let input = ImageAsset::source(dir.path(), "pic.png").unwrap();

        let out = apply_edit(EditSpec::Invert, &input, &Naming::readable()).unwrap();
        assert_eq!(out.path(), dir.path().join("pic-edit.png"));
        assert_eq!(out.origin(), "pic.png");
        let decoded = image::open(out.path()).unwrap();
        assert_eq!(first_pixel(&decoded), [245, 235, 225, 255]);
    }
}
