//! Commit-to-post derivation: the core of the generator.
//!
//! Takes commits as read from history and produces the records the renderer
//! shows, in the same order the commits came in.
//!
//! ## Rules
//!
//! 1. Commits whose title starts with the skip marker (trimmed,
//!    case-insensitive) are dropped before anything is read for them.
//! 2. For each remaining commit: changed files → image paths → embedded
//!    caption and dimensions per image. Commits are processed in parallel, images within
//!    a commit too; results are collected by index so completion order never
//!    leaks into output order.
//! 3. A commit with no images produces nothing.
//! 4. The body becomes paragraphs (see [`format_paragraphs`]).
//! 5. Hashes are shortened to 7 characters, dates formatted once here.
//!
//! Per-commit and per-image problems are reported as [`BuildEvent`]s and
//! replaced with defaults (no files, no caption, 800×800). Nothing in here
//! can fail the run.
//!
//! ## Duplicate paths
//!
//! If two commits touch the same image, both posts show it. The output
//! writer copies each distinct path once.

use crate::config::Layout;
use crate::history::History;
use crate::imaging::{MetadataReader, filter_images};
use crate::pipeline::{BuildEvent, emit};
use crate::types::{
    Assembled, Commit, FALLBACK_DIMENSIONS, GalleryImage, ImageRef, Lookup, Post,
};
use chrono::{DateTime, FixedOffset, Offset, Utc};
use rayon::prelude::*;
use std::path::Path;
use std::sync::mpsc::Sender;

/// Length of the displayed commit hash.
pub const SHORT_HASH_LEN: usize = 7;

/// Display format for commit dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Inputs that shape assembly.
#[derive(Debug, Clone, Copy)]
pub struct AssembleOptions<'a> {
    pub skip_marker: &'a str,
    pub layout: Layout,
    /// Working tree root; image paths are resolved against it.
    pub root: &'a Path,
}

/// Whether a commit title opts out of the gallery.
pub fn is_skipped(title: &str, marker: &str) -> bool {
    title
        .trim()
        .to_lowercase()
        .starts_with(&marker.trim().to_lowercase())
}

/// Split commits into `(kept, skipped)`, each keeping its original order.
pub fn split_skipped(commits: Vec<Commit>, marker: &str) -> (Vec<Commit>, Vec<Commit>) {
    commits.into_iter().partition(|c| !is_skipped(&c.title, marker))
}

/// Split free text into display paragraphs.
///
/// Runs of two or more line breaks separate paragraphs; single line breaks
/// inside a paragraph become spaces. Paragraphs are trimmed and empty ones
/// dropped.
pub fn format_paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(|block| block.replace('\n', " ").trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// First seven characters of a hash.
pub fn short_hash(hash: &str) -> String {
    hash.chars().take(SHORT_HASH_LEN).collect()
}

/// Format a commit time in the commit's own UTC offset.
pub fn format_date(seconds: i64, offset_minutes: i32) -> String {
    let offset = offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    DateTime::from_timestamp(seconds, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
        .format(DATE_FORMAT)
        .to_string()
}

/// Flatten posts into one entry per image, keeping order.
pub fn flatten(posts: Vec<Post>) -> Vec<GalleryImage> {
    posts
        .into_iter()
        .flat_map(|post| {
            let Post {
                title,
                author,
                date,
                images,
                ..
            } = post;
            images.into_iter().map(move |image| GalleryImage {
                image,
                title: title.clone(),
                author: author.clone(),
                date: date.clone(),
            })
        })
        .collect()
}

/// Turn commits into posts (or gallery images, per layout).
pub fn assemble(
    commits: Vec<Commit>,
    history: &impl History,
    reader: &impl MetadataReader,
    options: &AssembleOptions<'_>,
    events: Option<&Sender<BuildEvent>>,
) -> Assembled {
    let (kept, skipped) = split_skipped(commits, options.skip_marker);
    for commit in &skipped {
        emit(
            events,
            BuildEvent::CommitSkipped {
                hash: short_hash(&commit.hash),
                title: commit.title.clone(),
            },
        );
    }

    let posts: Vec<Post> = kept
        .par_iter()
        .map(|commit| build_post(commit, history, reader, options.root, events))
        .collect::<Vec<Option<Post>>>()
        .into_iter()
        .flatten()
        .collect();

    for (idx, post) in posts.iter().enumerate() {
        emit(
            events,
            BuildEvent::PostAssembled {
                index: idx + 1,
                hash: post.hash.clone(),
                title: post.title.clone(),
                images: post.images.iter().map(|i| i.path.clone()).collect(),
            },
        );
    }

    if options.layout.is_flat() {
        Assembled::Images(flatten(posts))
    } else {
        Assembled::Posts(posts)
    }
}

fn build_post(
    commit: &Commit,
    history: &impl History,
    reader: &impl MetadataReader,
    root: &Path,
    events: Option<&Sender<BuildEvent>>,
) -> Option<Post> {
    let hash = short_hash(&commit.hash);

    let changed = match history.changed_files(&commit.hash) {
        Lookup::Available(paths) => paths,
        Lookup::Unavailable(reason) => {
            emit(
                events,
                BuildEvent::DiffUnavailable {
                    hash: hash.clone(),
                    reason,
                },
            );
            Vec::new()
        }
    };

    let images: Vec<ImageRef> = filter_images(&changed)
        .par_iter()
        .map(|path| read_image(path, &hash, reader, root, events))
        .collect();

    if images.is_empty() {
        emit(
            events,
            BuildEvent::NoImages {
                hash,
                title: commit.title.clone(),
            },
        );
        return None;
    }

    Some(Post {
        hash,
        author: commit.author.clone(),
        email: commit.email.clone(),
        date: format_date(commit.time, commit.offset_minutes),
        title: commit.title.trim().to_string(),
        paragraphs: format_paragraphs(&commit.body),
        images,
    })
}

fn read_image(
    path: &str,
    hash: &str,
    reader: &impl MetadataReader,
    root: &Path,
    events: Option<&Sender<BuildEvent>>,
) -> ImageRef {
    let full = root.join(path);
    let caption = read_caption(reader, &full);
    let (width, height) = match reader.dimensions(&full) {
        Lookup::Available(dims) => dims,
        Lookup::Unavailable(reason) => {
            emit(
                events,
                BuildEvent::DimensionsUnavailable {
                    path: path.to_string(),
                    reason,
                },
            );
            FALLBACK_DIMENSIONS
        }
    };

    ImageRef {
        path: path.to_string(),
        commit: hash.to_string(),
        caption,
        width,
        height,
    }
}

/// Embedded caption, trimmed. Blank text and unreadable or missing files
/// give no caption.
fn read_caption(reader: &impl MetadataReader, full: &Path) -> Option<String> {
    reader
        .caption(full)
        .ok()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
