//! One build, start to finish.
//!
//! ```text
//! history ──► assemble ──► render ──► write
//!  (git2)     (rayon)      (maud)     (fs)
//! ```
//!
//! [`run`] owns the sequence; every stage below it is usable on its own.
//! Stages report progress and recoverable problems as [`BuildEvent`]s over
//! an optional channel. The library never prints; the binary formats events
//! with [`output::format_event`](crate::output::format_event).

use crate::assemble::{AssembleOptions, assemble};
use crate::config::{BuildConfig, ConfigError, SiteConfig, load_config};
use crate::generate::render;
use crate::history::{GitHistory, History, HistoryError};
use crate::imaging::FileMetadata;
use crate::types::Assembled;
use crate::write::{WriteError, WriteReport, is_safe_relative, write_site};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Progress and warnings emitted while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// No config file; stock settings are used.
    ConfigMissing { path: PathBuf },
    /// The configured branch does not exist; history is read from `HEAD`.
    BranchFallback { branch: String },
    CommitsListed { count: usize },
    CommitSkipped { hash: String, title: String },
    DiffUnavailable { hash: String, reason: String },
    NoImages { hash: String, title: String },
    DimensionsUnavailable { path: String, reason: String },
    /// A post made it into the page. `index` is 1-based display position.
    PostAssembled {
        index: usize,
        hash: String,
        title: String,
        images: Vec<String>,
    },
    ImageMissing { path: String },
    ImageCopyFailed { path: String, reason: String },
    UnsafePath { path: String },
    AvatarMissing { path: String },
}

impl BuildEvent {
    /// Warnings go to stderr; everything else is progress.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            BuildEvent::BranchFallback { .. }
                | BuildEvent::DiffUnavailable { .. }
                | BuildEvent::DimensionsUnavailable { .. }
                | BuildEvent::ImageMissing { .. }
                | BuildEvent::ImageCopyFailed { .. }
                | BuildEvent::UnsafePath { .. }
                | BuildEvent::AvatarMissing { .. }
        )
    }
}

/// Send an event if anyone is listening. A closed channel is ignored.
pub(crate) fn emit(events: Option<&Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Load the site config, treating a missing file as stock defaults.
pub fn load_site_config(
    path: &Path,
    events: Option<&Sender<BuildEvent>>,
) -> Result<SiteConfig, ConfigError> {
    match load_config(path)? {
        Some(config) => Ok(config),
        None => {
            emit(
                events,
                BuildEvent::ConfigMissing {
                    path: path.to_path_buf(),
                },
            );
            Ok(SiteConfig::default())
        }
    }
}

/// History read and assembled, nothing written yet.
#[derive(Debug)]
pub struct Snapshot {
    /// Working tree root the image paths are relative to.
    pub root: PathBuf,
    /// Commits read from history, before filtering.
    pub commits_read: usize,
    pub assembled: Assembled,
}

/// Summary of a finished build.
#[derive(Debug)]
pub struct BuildReport {
    pub commits_read: usize,
    pub posts: usize,
    pub images: usize,
    pub write: WriteReport,
}

/// Read history and assemble entries without touching the output directory.
pub fn collect(
    config: &BuildConfig,
    events: Option<&Sender<BuildEvent>>,
) -> Result<Snapshot, BuildError> {
    config.site.validate()?;

    let history = GitHistory::open(&config.repo, &config.branch)?;
    if history.fell_back_to_head() {
        emit(
            events,
            BuildEvent::BranchFallback {
                branch: config.branch.clone(),
            },
        );
    }

    let commits = history.list_commits(config.max_posts)?;
    let commits_read = commits.len();
    emit(
        events,
        BuildEvent::CommitsListed {
            count: commits_read,
        },
    );

    let options = AssembleOptions {
        skip_marker: &config.site.skip_marker,
        layout: config.site.layout,
        root: history.workdir(),
    };
    let assembled = assemble(commits, &history, &FileMetadata::new(), &options, events);

    Ok(Snapshot {
        root: history.workdir().to_path_buf(),
        commits_read,
        assembled,
    })
}

/// Full build: collect, render, write.
pub fn run(
    config: &BuildConfig,
    events: Option<&Sender<BuildEvent>>,
) -> Result<BuildReport, BuildError> {
    let snapshot = collect(config, events)?;

    // Only link an avatar the writer can copy; a missing one is reported there.
    let mut site = config.site.clone();
    site.avatar = site
        .avatar
        .filter(|rel| is_safe_relative(rel) && snapshot.root.join(rel).is_file());
    let html = render(&snapshot.assembled, &site);
    let write = write_site(
        &html,
        &snapshot.assembled,
        &snapshot.root,
        &config.output,
        config.site.avatar.as_deref(),
        events,
    )?;

    let posts = match &snapshot.assembled {
        Assembled::Posts(posts) => posts.len(),
        Assembled::Images(images) => {
            let mut hashes: Vec<&str> = images.iter().map(|g| g.image.commit.as_str()).collect();
            hashes.dedup();
            hashes.len()
        }
    };

    Ok(BuildReport {
        commits_read: snapshot.commits_read,
        posts,
        images: snapshot.assembled.images().len(),
        write,
    })
}
