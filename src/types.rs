//! Shared records passed between pipeline stages.
//!
//! Commits come out of [`history`](crate::history), get turned into posts or
//! gallery images by [`assemble`](crate::assemble), and are consumed by
//! [`generate`](crate::generate) and [`write`](crate::write). Nothing here is
//! mutated after construction.

/// Pixel dimensions used when an image's real size cannot be determined.
pub const FALLBACK_DIMENSIONS: (u32, u32) = (800, 800);

/// A commit as read from history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full hex object id.
    pub hash: String,
    pub author: String,
    pub email: Option<String>,
    /// Author time, seconds since the epoch.
    pub time: i64,
    /// Author time zone as recorded in the commit, minutes east of UTC.
    pub offset_minutes: i32,
    /// First line of the message.
    pub title: String,
    /// Everything after the first line, untouched.
    pub body: String,
}

/// An image changed by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Repository-relative path, `/`-separated.
    pub path: String,
    /// Short hash of the owning commit.
    pub commit: String,
    pub caption: Option<String>,
    pub width: u32,
    pub height: u32,
}

/// One commit with its images, as shown in the blog layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub hash: String,
    pub author: String,
    pub email: Option<String>,
    /// Display date, `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
    pub title: String,
    pub paragraphs: Vec<String>,
    pub images: Vec<ImageRef>,
}

/// A flattened image carrying a copy of its commit's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryImage {
    pub image: ImageRef,
    pub title: String,
    pub author: String,
    pub date: String,
}

/// Output of the assembler, shaped by the chosen layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled {
    Posts(Vec<Post>),
    Images(Vec<GalleryImage>),
}

impl Assembled {
    /// Every image reference, in display order.
    pub fn images(&self) -> Vec<&ImageRef> {
        match self {
            Assembled::Posts(posts) => posts.iter().flat_map(|p| p.images.iter()).collect(),
            Assembled::Images(images) => images.iter().map(|g| &g.image).collect(),
        }
    }

    /// Number of top-level entries (posts or gallery images).
    pub fn len(&self) -> usize {
        match self {
            Assembled::Posts(posts) => posts.len(),
            Assembled::Images(images) => images.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of an I/O lookup that is allowed to degrade.
///
/// `Unavailable` is not an error: the caller substitutes a default and keeps
/// going. The reason is kept so it can be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Available(T),
    Unavailable(String),
}

impl<T> Lookup<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Lookup::Unavailable(reason.into())
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Lookup::Available(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Lookup::Available(v) => Some(v),
            Lookup::Unavailable(_) => None,
        }
    }
}
