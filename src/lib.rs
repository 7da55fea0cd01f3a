//! # Commit Gal
//!
//! A minimal static site generator that turns a repository's history into a
//! photo blog. Every commit that adds or changes an image becomes a post:
//! the commit title is the headline, the body is the text, the images are
//! the photos.
//!
//! # Architecture: One Pass
//!
//! ```text
//! 1. History    repository  →  commits          (git2 revwalk + diffs)
//! 2. Assemble   commits     →  posts / images   (skip marker, captions, sizes)
//! 3. Render     posts       →  index.html       (maud)
//! 4. Write      index.html  →  dist/            (page + copied images)
//! ```
//!
//! Nothing is cached between runs. The same repository state always
//! produces byte-identical HTML.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`history`] | Reads commits and changed files through the [`history::History`] trait |
//! | [`imaging`] | Image classification, dimensions, embedded captions (IPTC, PNG text) |
//! | [`assemble`] | Commit-to-post derivation: skip marker, paragraphs, grouping by layout |
//! | [`generate`] | Renders the single HTML page with Maud |
//! | [`write`] | Writes `index.html` and copies images into the output directory |
//! | [`pipeline`] | Runs the stages in order, defines [`pipeline::BuildEvent`] |
//! | [`config`] | JSON site config, build settings, CSS color generation |
//! | [`types`] | Records shared between stages (`Commit`, `Post`, `Lookup`) |
//! | [`output`] | CLI output formatting for events, check listings, summaries |
//!
//! # Design Decisions
//!
//! ## Degrade, Don't Abort
//!
//! Only three things stop a build: an unreadable repository, a broken
//! config file and an unwritable output directory. Everything that concerns a
//! single commit or a single image (a failing diff, a deleted photo, a file
//! the `image` crate can't parse) is reported as a warning and replaced with
//! a default. One bad commit should never cost the whole page.
//!
//! ## Working Tree, Not Blobs
//!
//! Images are read and copied from the working tree, not from the commit
//! that introduced them. The page shows what the repository holds today; an
//! image deleted since its commit is reported and left out of the output.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. Malformed markup is a build error, template variables
//! are Rust expressions, and interpolation is escaped automatically.

pub mod assemble;
pub mod config;
pub mod generate;
pub mod history;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod write;

#[cfg(test)]
pub(crate) mod test_helpers;
