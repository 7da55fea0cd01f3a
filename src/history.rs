//! Reading commits and their changed files from a git repository.
//!
//! [`History`] is the seam the assembler reads through; [`GitHistory`] is
//! the production implementation on top of `git2`. Only the branch's
//! first-parent line is walked; commits brought in by a merge are not listed.
//!
//! ## Degraded results
//!
//! Listing commits is all-or-nothing: if the repository can't be opened or
//! walked, the run has nothing to show and fails. Diffing a single commit is
//! allowed to degrade:
//!
//! - a root commit has no parent to diff against and yields an empty set;
//! - any other diff failure yields [`Lookup::Unavailable`], which the caller
//!   reports and treats as an empty set.

use crate::types::{Commit, Lookup};
use git2::{BranchType, Delta, Oid, Repository, Sort};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Not a git repository (or any parent): {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },
    #[error("Repository has no working tree: {0}")]
    Bare(PathBuf),
    #[error("Neither branch '{branch}' nor HEAD resolves to a commit: {source}")]
    Branch {
        branch: String,
        #[source]
        source: git2::Error,
    },
    #[error("Failed to walk history: {0}")]
    Walk(#[from] git2::Error),
}

/// Source of commits and per-commit changed files.
pub trait History: Sync {
    /// Up to `max_count` commits, most recent first.
    fn list_commits(&self, max_count: usize) -> Result<Vec<Commit>, HistoryError>;

    /// Paths changed between `hash` and its first parent.
    fn changed_files(&self, hash: &str) -> Lookup<Vec<String>>;
}

/// A git repository opened at a branch tip.
pub struct GitHistory {
    repo: Mutex<Repository>,
    workdir: PathBuf,
    start: Oid,
    fell_back_to_head: bool,
}

impl GitHistory {
    /// Discover the repository containing `path` and resolve `branch`.
    ///
    /// When the local branch doesn't exist the walk starts from `HEAD`
    /// instead; [`fell_back_to_head`](Self::fell_back_to_head) reports it.
    pub fn open(path: &Path, branch: &str) -> Result<Self, HistoryError> {
        let repo = Repository::discover(path).map_err(|source| HistoryError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let workdir = repo
            .workdir()
            .ok_or_else(|| HistoryError::Bare(path.to_path_buf()))?
            .to_path_buf();

        let branch_tip = repo
            .find_branch(branch, BranchType::Local)
            .and_then(|b| b.get().peel_to_commit())
            .map(|c| c.id());
        let (start, fell_back_to_head) = match branch_tip {
            Ok(oid) => (oid, false),
            Err(_) => {
                let head = repo
                    .head()
                    .and_then(|h| h.peel_to_commit())
                    .map_err(|source| HistoryError::Branch {
                        branch: branch.to_string(),
                        source,
                    })?;
                (head.id(), true)
            }
        };

        Ok(Self {
            repo: Mutex::new(repo),
            workdir,
            start,
            fell_back_to_head,
        })
    }

    /// Root of the working tree; image paths are relative to it.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn fell_back_to_head(&self) -> bool {
        self.fell_back_to_head
    }

    fn lock(&self) -> MutexGuard<'_, Repository> {
        // A panic while holding the lock can't leave the repository handle
        // half-updated; all access is read-only.
        self.repo.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl History for GitHistory {
    fn list_commits(&self, max_count: usize) -> Result<Vec<Commit>, HistoryError> {
        let repo = self.lock();
        let mut walk = repo.revwalk()?;
        walk.set_sorting(Sort::TIME)?;
        walk.push(self.start)?;
        walk.simplify_first_parent()?;

        let mut commits = Vec::new();
        for oid in walk.take(max_count) {
            let commit = repo.find_commit(oid?)?;
            commits.push(to_commit(&commit));
        }
        Ok(commits)
    }

    fn changed_files(&self, hash: &str) -> Lookup<Vec<String>> {
        let repo = self.lock();
        match diff_paths(&repo, hash) {
            Ok(paths) => Lookup::Available(paths),
            Err(e) => Lookup::unavailable(e.message().to_string()),
        }
    }
}

fn to_commit(commit: &git2::Commit<'_>) -> Commit {
    let message = String::from_utf8_lossy(commit.message_bytes());
    let (title, body) = match message.split_once('\n') {
        Some((title, body)) => (title.trim_end_matches('\r'), body),
        None => (message.as_ref(), ""),
    };
    let author = commit.author();
    let email = String::from_utf8_lossy(author.email_bytes()).trim().to_string();
    let when = author.when();

    Commit {
        hash: commit.id().to_string(),
        author: String::from_utf8_lossy(author.name_bytes()).trim().to_string(),
        email: (!email.is_empty()).then_some(email),
        time: when.seconds(),
        offset_minutes: when.offset_minutes(),
        title: title.to_string(),
        body: body.to_string(),
    }
}

/// Paths present in `hash` that differ from its first parent.
///
/// Deleted files are left out: they don't exist in the commit, so there is
/// nothing to show.
fn diff_paths(repo: &Repository, hash: &str) -> Result<Vec<String>, git2::Error> {
    let commit = repo.find_commit(Oid::from_str(hash)?)?;
    if commit.parent_count() == 0 {
        return Ok(Vec::new());
    }
    let parent_tree = commit.parent(0)?.tree()?;
    let tree = commit.tree()?;
    let diff = repo.diff_tree_to_tree(Some(&parent_tree), Some(&tree), None)?;

    Ok(diff
        .deltas()
        .filter(|d| d.status() != Delta::Deleted)
        .filter_map(|d| d.new_file().path().map(path_string))
        .collect())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
