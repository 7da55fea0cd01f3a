//! Site and build configuration.
//!
//! Two layers:
//!
//! - [`SiteConfig`]: display settings loaded from an optional JSON file
//!   (`commit-gal.json` by default). A missing file means stock defaults.
//! - [`BuildConfig`]: where to read history from and where to write the
//!   site. Filled from CLI flags and environment variables by the binary and
//!   passed explicitly into [`pipeline::run`](crate::pipeline::run).
//!
//! ## Config File
//!
//! ```json
//! {
//!   "title": "Darkroom",
//!   "description": "Film scans, one commit at a time",
//!   "avatar": "assets/me.jpg",
//!   "prefixes": ["photo:", "add:"],
//!   "skip_marker": "[skip-gallery]",
//!   "layout": "blog",
//!   "colors": { "light": { "background": "#fafafa" } }
//! }
//! ```
//!
//! Every key is optional. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config validation error: {0}")]
    Validation(String),
}

pub const DEFAULT_CONFIG_FILE: &str = "commit-gal.json";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_MAX_POSTS: usize = 50;
pub const DEFAULT_OUTPUT_DIR: &str = "dist";
pub const DEFAULT_SKIP_MARKER: &str = "[skip-gallery]";

/// How assembled commits are grouped and rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One post per commit, images underneath.
    #[default]
    Blog,
    /// Every image as its own tile, newest first.
    Gallery,
    /// Gallery with a profile header (avatar, counts).
    Profile,
}

impl Layout {
    /// Whether this layout flattens commits into individual images.
    pub fn is_flat(self) -> bool {
        !matches!(self, Layout::Blog)
    }
}

/// Display configuration loaded from the JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Page title and header text.
    pub title: String,
    /// Optional tagline shown under the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Repository-relative path of an avatar image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Commit-title prefixes stripped from displayed titles.
    pub prefixes: Vec<String>,
    /// Commits whose title starts with this marker are left out.
    pub skip_marker: String,
    pub layout: Layout,
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Commits".to_string(),
            description: None,
            avatar: None,
            prefixes: Vec::new(),
            skip_marker: DEFAULT_SKIP_MARKER.to_string(),
            layout: Layout::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate values that deserialize fine but make no sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.skip_marker.trim().is_empty() {
            return Err(ConfigError::Validation(
                "skip_marker must not be empty".into(),
            ));
        }
        if self.prefixes.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "prefixes must not contain empty entries".into(),
            ));
        }
        Ok(())
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, hashes, captions.
    pub text_muted: String,
    pub border: String,
    pub link: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#111111".to_string(),
            text_muted: "#666666".to_string(),
            border: "#e0e0e0".to_string(),
            link: "#333333".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#0a0a0a".to_string(),
            text: "#eeeeee".to_string(),
            text_muted: "#999999".to_string(),
            border: "#333333".to_string(),
            link: "#cccccc".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Load the site config from `path`.
///
/// Returns `Ok(None)` when the file does not exist; the caller decides how
/// to report that. A file that exists but fails to parse or validate is an
/// error.
pub fn load_config(path: &Path) -> Result<Option<SiteConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SiteConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(Some(config))
}

/// Everything the pipeline needs to know about one run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Any directory inside the repository working tree.
    pub repo: PathBuf,
    pub output: PathBuf,
    /// Branch to walk. Falls back to `HEAD` when it does not exist.
    pub branch: String,
    /// Upper bound on commits read from history (before filtering).
    pub max_posts: usize,
    pub site: SiteConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT_DIR),
            branch: DEFAULT_BRANCH.to_string(),
            max_posts: DEFAULT_MAX_POSTS,
            site: SiteConfig::default(),
        }
    }
}

/// Resolve the effective thread count.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least one
pub fn effective_threads(jobs: Option<usize>) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    jobs.map(|n| n.clamp(1, cores)).unwrap_or(cores)
}

/// Returns the stock config with every key spelled out, used by the
/// `gen-config` command. JSON has no comments; see the module docs for what
/// each key means.
pub fn stock_config_json() -> String {
    let config = SiteConfig::default();
    // Serializing plain structs of strings cannot fail.
    serde_json::to_string_pretty(&config).unwrap_or_default() + "\n"
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
    )
}
