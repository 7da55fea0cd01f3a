//! Metadata reader trait and the filesystem implementation.
//!
//! The [`MetadataReader`] trait is the seam the assembler reads images
//! through, so tests can substitute canned captions and sizes. Both
//! operations degrade instead of failing: any problem becomes
//! [`Lookup::Unavailable`] with a reason.

use super::iptc_parser::read_iptc_from_jpeg;
use super::png_text::read_png_text;
use super::svg::svg_dimensions;
use crate::types::Lookup;
use std::path::Path;

/// Read-only access to an image's embedded caption and pixel size.
pub trait MetadataReader: Sync {
    /// Embedded descriptive text.
    fn caption(&self, path: &Path) -> Lookup<String>;

    /// Pixel dimensions `(width, height)`.
    fn dimensions(&self, path: &Path) -> Lookup<(u32, u32)>;
}

/// Reads metadata straight from files on disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileMetadata;

impl FileMetadata {
    pub fn new() -> Self {
        Self
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

impl MetadataReader for FileMetadata {
    fn caption(&self, path: &Path) -> Lookup<String> {
        let ext = extension(path);
        if !matches!(ext.as_str(), "jpg" | "jpeg" | "png") {
            return Lookup::unavailable(format!("{ext} files carry no caption"));
        }
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => return Lookup::unavailable(e.to_string()),
        };
        let caption = match ext.as_str() {
            "png" => read_png_text(&bytes).caption(),
            _ => read_iptc_from_jpeg(&bytes).description(),
        };
        match caption {
            Some(text) => Lookup::Available(text),
            None => Lookup::unavailable("no embedded caption"),
        }
    }

    fn dimensions(&self, path: &Path) -> Lookup<(u32, u32)> {
        if extension(path) == "svg" {
            return match std::fs::read_to_string(path) {
                Ok(source) => match svg_dimensions(&source) {
                    Some(dims) => Lookup::Available(dims),
                    None => Lookup::unavailable("svg has no intrinsic size"),
                },
                Err(e) => Lookup::unavailable(e.to_string()),
            };
        }
        match image::image_dimensions(path) {
            Ok(dims) => Lookup::Available(dims),
            Err(e) => Lookup::unavailable(e.to_string()),
        }
    }
}
