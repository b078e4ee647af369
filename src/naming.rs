//! Output filename derivation.

use crate::Result;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;

const EDIT_SUFFIX: &str = "-edit";
const WATERMARK_SUFFIX: &str = "-with-watermark";

/// Hex digits of the source digest kept in hashed names.
const TAG_LEN: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NamingScheme {
    /// `name-edit.ext`, `name-with-watermark.ext`
    #[default]
    Readable,
    /// `name-<digest>-edit.ext`, `name-<digest>-with-watermark.ext`
    Hashed,
}

/// Naming policy resolved for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Naming {
    tag: Option<String>,
}

impl Naming {
    pub fn readable() -> Self {
        Self { tag: None }
    }

    pub fn hashed(tag: impl Into<String>) -> Self {
        Self { tag: Some(tag.into()) }
    }

    /// Resolve `scheme` against the bytes of `source`.
    pub fn for_source(scheme: NamingScheme, source: impl AsRef<Path>) -> Result<Self> {
        match scheme {
            NamingScheme::Readable => Ok(Self::readable()),
            NamingScheme::Hashed => {
                let bytes = std::fs::read(source)?;
                Ok(Self::hashed(content_tag(&bytes)))
            }
        }
    }

    pub fn edited(&self, original: &str) -> String {
        self.with_suffix(original, EDIT_SUFFIX)
    }

    pub fn watermarked(&self, original: &str) -> String {
        self.with_suffix(original, WATERMARK_SUFFIX)
    }

    fn with_suffix(&self, original: &str, suffix: &str) -> String {
        let (base, ext) = split_extension(original);
        let mut name = String::with_capacity(original.len() + suffix.len() + TAG_LEN + 2);
        name.push_str(base);
        if let Some(tag) = &self.tag {
            name.push('-');
            name.push_str(tag);
        }
        name.push_str(suffix);
        if let Some(ext) = ext {
            name.push('.');
            name.push_str(ext);
        }
        name
    }
}

pub fn derive_edited_name(original: &str) -> String {
    Naming::readable().edited(original)
}

pub fn derive_watermarked_name(original: &str) -> String {
    Naming::readable().watermarked(original)
}

fn content_tag(bytes: &[u8]) -> String {
    let mut hex = hex::encode(Sha256::digest(bytes));
    hex.truncate(TAG_LEN);
    hex
}

// Split at the last dot; a leading dot is part of the base name.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}
