//! Output writer: puts the rendered page and its images on disk.
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── photos/pier.jpg        # same relative path as in the repository
//! └── assets/me.jpg          # avatar, when configured
//! ```
//!
//! Images are copied from the working tree, not from the commit that
//! introduced them. Each distinct path is copied once even when several
//! posts show it.
//!
//! Only two things are fatal: creating the output directory and writing
//! `index.html`. A missing or uncopyable image is reported and skipped, as
//! is any path that would land outside the output directory.

use crate::pipeline::{BuildEvent, emit};
use crate::types::Assembled;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    WriteHtml {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What ended up in the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub index_path: PathBuf,
    pub images_copied: usize,
    pub images_skipped: usize,
    pub avatar_copied: bool,
}

/// Write `index.html` and copy every referenced file into `output_dir`.
pub fn write_site(
    html: &str,
    assembled: &Assembled,
    repo_root: &Path,
    output_dir: &Path,
    avatar: Option<&str>,
    events: Option<&Sender<BuildEvent>>,
) -> Result<WriteReport, WriteError> {
    fs::create_dir_all(output_dir).map_err(|source| WriteError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let distinct: BTreeSet<&str> = assembled
        .images()
        .into_iter()
        .map(|i| i.path.as_str())
        .collect();
    let mut images_copied = 0;
    let mut images_skipped = 0;
    for rel in distinct {
        if copy_file(repo_root, output_dir, rel, events) {
            images_copied += 1;
        } else {
            images_skipped += 1;
        }
    }

    let avatar_copied = match avatar {
        Some(rel) if repo_root.join(rel).is_file() => {
            copy_file(repo_root, output_dir, rel, events)
        }
        Some(rel) => {
            emit(
                events,
                BuildEvent::AvatarMissing {
                    path: rel.to_string(),
                },
            );
            false
        }
        None => false,
    };

    let index_path = output_dir.join("index.html");
    fs::write(&index_path, html).map_err(|source| WriteError::WriteHtml {
        path: index_path.clone(),
        source,
    })?;

    Ok(WriteReport {
        index_path,
        images_copied,
        images_skipped,
        avatar_copied,
    })
}

/// Whether a repository-relative path stays inside the directory it's
/// joined onto.
pub fn is_safe_relative(rel: &str) -> bool {
    let path = Path::new(rel);
    !rel.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Copy `rel` from the working tree into the output directory. Returns
/// whether the file was copied; every reason it wasn't is reported.
fn copy_file(
    repo_root: &Path,
    output_dir: &Path,
    rel: &str,
    events: Option<&Sender<BuildEvent>>,
) -> bool {
    if !is_safe_relative(rel) {
        emit(
            events,
            BuildEvent::UnsafePath {
                path: rel.to_string(),
            },
        );
        return false;
    }

    let source = repo_root.join(rel);
    if !source.is_file() {
        emit(
            events,
            BuildEvent::ImageMissing {
                path: rel.to_string(),
            },
        );
        return false;
    }

    let dest = output_dir.join(rel);
    let result = match dest.parent() {
        Some(parent) => fs::create_dir_all(parent).and_then(|_| fs::copy(&source, &dest)),
        None => fs::copy(&source, &dest),
    };
    match result {
        Ok(_) => true,
        Err(e) => {
            emit(
                events,
                BuildEvent::ImageCopyFailed {
                    path: rel.to_string(),
                    reason: e.to_string(),
                },
            );
            false
        }
    }
}
