//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is about content, not files. Every post leads with its position
//! and title; the commit hash, image paths and captions follow as indented
//! context lines. The listing reads like a table of contents of the page
//! that will be (or was) generated.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Read 12 commits
//! Skipped 3f2a9c1 [skip-gallery] wip
//! 001 Pier at dawn (2 images)
//!     Commit: 9b1e004
//!     photos/pier-1.jpg
//!     photos/pier-2.jpg
//! 002 Harbour
//!     Commit: 51c7d3a
//!     photos/harbour.png
//! warning: photos/gone.png missing from working tree, not copied
//!
//! Generated 2 posts, 3 images → dist/index.html
//! Copied 2 images, skipped 1
//! ```
//!
//! ## Check
//!
//! ```text
//! Posts
//! 001 Pier at dawn (2 images)
//!     Commit: 9b1e004 · Ada Lovelace · 2024-05-02 07:14:00
//!     001 photos/pier-1.jpg (1600x1067)
//!         Caption: Fog over the pier
//!     002 photos/pier-2.jpg (1600x1067)
//!
//! 12 commits read, 1 post
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure.

use crate::pipeline::{BuildEvent, BuildReport, Snapshot};
use crate::types::{Assembled, ImageRef};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Post header: index + title, image count only when there is more than one.
///
/// ```text
/// 001 Harbour
/// 002 Pier at dawn (2 images)
/// ```
fn post_header(index: usize, title: &str, images: usize) -> String {
    if images > 1 {
        format!("{} {} ({} images)", format_index(index), title, images)
    } else {
        format!("{} {}", format_index(index), title)
    }
}

/// Image line with context: dimensions, then caption on its own line.
fn image_lines(index: usize, image: &ImageRef, depth: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{}{} {} ({}x{})",
        indent(depth),
        format_index(index),
        image.path,
        image.width,
        image.height
    )];
    if let Some(caption) = &image.caption {
        lines.push(format!("{}Caption: {}", indent(depth + 1), caption));
    }
    lines
}

// ============================================================================
// Build events
// ============================================================================

/// Format a single build event as display lines.
pub fn format_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::ConfigMissing { path } => {
            vec![format!("No config at {}, using defaults", path.display())]
        }
        BuildEvent::BranchFallback { branch } => {
            vec![format!("branch '{}' not found, reading from HEAD", branch)]
        }
        BuildEvent::CommitsListed { count } => vec![format!("Read {}", plural(*count, "commit"))],
        BuildEvent::CommitSkipped { hash, title } => vec![format!("Skipped {} {}", hash, title)],
        BuildEvent::DiffUnavailable { hash, reason } => {
            vec![format!("could not diff {}: {}", hash, reason)]
        }
        BuildEvent::NoImages { .. } => Vec::new(),
        BuildEvent::DimensionsUnavailable { path, reason } => {
            vec![format!("{}: size unknown ({}), using 800x800", path, reason)]
        }
        BuildEvent::PostAssembled {
            index,
            hash,
            title,
            images,
        } => {
            let mut lines = vec![
                post_header(*index, title, images.len()),
                format!("{}Commit: {}", indent(1), hash),
            ];
            lines.extend(images.iter().map(|p| format!("{}{}", indent(1), p)));
            lines
        }
        BuildEvent::ImageMissing { path } => {
            vec![format!("{} missing from working tree, not copied", path)]
        }
        BuildEvent::ImageCopyFailed { path, reason } => {
            vec![format!("failed to copy {}: {}", path, reason)]
        }
        BuildEvent::UnsafePath { path } => {
            vec![format!("{} points outside the output directory, not copied", path)]
        }
        BuildEvent::AvatarMissing { path } => vec![format!("avatar {} not found", path)],
    }
}

/// Print an event: warnings to stderr with a `warning:` prefix, the rest to
/// stdout.
pub fn print_event(event: &BuildEvent) {
    for line in format_event(event) {
        if event.is_warning() {
            eprintln!("warning: {}", line);
        } else {
            println!("{}", line);
        }
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format what a build would produce, without having written anything.
pub fn format_check_output(snapshot: &Snapshot) -> Vec<String> {
    let mut lines = Vec::new();

    match &snapshot.assembled {
        Assembled::Posts(posts) => {
            lines.push("Posts".to_string());
            for (i, post) in posts.iter().enumerate() {
                lines.push(post_header(i + 1, &post.title, post.images.len()));
                lines.push(format!(
                    "{}Commit: {} · {} · {}",
                    indent(1),
                    post.hash,
                    post.author,
                    post.date
                ));
                for (j, image) in post.images.iter().enumerate() {
                    lines.extend(image_lines(j + 1, image, 1));
                }
            }
        }
        Assembled::Images(images) => {
            lines.push("Images".to_string());
            for (i, entry) in images.iter().enumerate() {
                lines.extend(image_lines(i + 1, &entry.image, 0));
                lines.push(format!(
                    "{}From: {} {}",
                    indent(1),
                    entry.image.commit,
                    entry.title
                ));
            }
        }
    }

    lines.push(String::new());
    let entries = match &snapshot.assembled {
        Assembled::Posts(posts) => plural(posts.len(), "post"),
        Assembled::Images(images) => plural(images.len(), "image"),
    };
    lines.push(format!(
        "{} read, {}",
        plural(snapshot.commits_read, "commit"),
        entries
    ));
    lines
}

pub fn print_check_output(snapshot: &Snapshot) {
    for line in format_check_output(snapshot) {
        println!("{}", line);
    }
}

// ============================================================================
// Build summary
// ============================================================================

/// Format the closing summary of a build.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Generated {}, {} → {}",
        plural(report.posts, "post"),
        plural(report.images, "image"),
        report.write.index_path.display()
    )];

    let copied = format!("Copied {}", plural(report.write.images_copied, "image"));
    if report.write.images_skipped > 0 {
        lines.push(format!("{}, skipped {}", copied, report.write.images_skipped));
    } else {
        lines.push(copied);
    }
    if report.write.avatar_copied {
        lines.push("Copied avatar".to_string());
    }
    lines
}

pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}
