//! Image inspection, pure Rust, read-only.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Classify** | extension allow-list |
//! | **Dimensions** | `image::image_dimensions`, SVG root attributes |
//! | **JPEG caption** | IPTC Caption-Abstract (APP13 / 8BIM) |
//! | **PNG caption** | `tEXt` / `iTXt` `Description` keyword |
//!
//! Nothing here decodes pixel data or writes files.

pub mod classify;
pub(crate) mod iptc_parser;
pub(crate) mod png_text;
pub mod reader;
pub(crate) mod svg;

pub use classify::{IMAGE_EXTENSIONS, filter_images, is_image};
pub use reader::{FileMetadata, MetadataReader};
