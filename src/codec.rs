//! Image files on disk and full-quality re-encoding.

use crate::{ResourceKind, Result, WatermarkError};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};

const JPEG_QUALITY: u8 = 100;

/// A raster image file plus the name of the source it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    path: PathBuf,
    origin: String,
}

impl ImageAsset {
    /// A user-supplied image `name` inside `dir`. `name` may include
    /// subfolders; only its final component is used for derived names.
    pub fn source(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let path = dir.as_ref().join(name);
        let origin = match path.file_name() {
            Some(file_name) if path.is_file() => file_name.to_string_lossy().into_owned(),
            _ => {
                return Err(WatermarkError::ResourceNotFound {
                    kind: ResourceKind::Source,
                    path,
                })
            }
        };
        Ok(Self { path, origin })
    }

    /// A file produced from this asset, named `name` in the same directory.
    pub fn derive(&self, name: &str) -> Self {
        Self {
            path: self.dir().join(name),
            origin: self.origin.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the user's original image.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn decode(&self) -> Result<DynamicImage> {
        if !self.path.is_file() {
            return Err(WatermarkError::ResourceNotFound {
                kind: ResourceKind::Source,
                path: self.path.clone(),
            });
        }
        open_image(&self.path)
    }
}

/// Decode the file at `path`, sniffing the format from its contents.
pub fn open_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    Ok(ImageReader::open(path)?.with_guessed_format()?.decode()?)
}

/// Encode `image` to `path` at the format's best quality. Nothing is
/// written unless encoding succeeds.
pub fn write_full_quality(image: &DynamicImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
        }
        _ => image.write_to(&mut buf, format)?,
    }
    std::fs::write(path, buf.into_inner())?;
    Ok(())
}
