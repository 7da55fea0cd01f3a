//! Image classification by file extension.

use std::path::Path;

/// Extensions treated as images, lowercase.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp"];

/// Whether a path has a recognized image extension (case-insensitive).
pub fn is_image(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Keep only image paths, preserving order.
pub fn filter_images<S: AsRef<str>>(paths: &[S]) -> Vec<String> {
    paths
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| is_image(p))
        .map(String::from)
        .collect()
}
