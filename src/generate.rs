//! HTML rendering.
//!
//! Turns assembled posts or gallery images into one self-contained
//! `index.html`. Rendering is pure: no I/O, no clock, so the same input
//! always produces the same bytes.
//!
//! ## Layouts
//!
//! - **Blog**: one `article.post` per commit with title, author, date, short
//!   hash, body paragraphs and the images the commit changed.
//! - **Gallery**: a grid of every image, title and date overlaid.
//! - **Profile**: the gallery grid under a header with avatar, description
//!   and post/image counts.
//!
//! ## Images
//!
//! Every `img` carries `width`/`height` (so the page doesn't reflow while
//! loading) and `data-caption`, which the lightbox script shows. Sources
//! are the repository-relative paths, percent-encoded per segment.
//!
//! ## CSS and JavaScript
//!
//! Embedded at compile time:
//! - `static/style.css`: base styles (colors injected from config)
//! - `static/lightbox.js`: click-to-enlarge overlay
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Interpolated values are escaped automatically.

use crate::config::{self, Layout, SiteConfig};
use crate::types::{Assembled, GalleryImage, ImageRef, Post};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/lightbox.js");

/// Characters escaped in image URLs: everything but unreserved ones.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Render the whole page.
pub fn render(assembled: &Assembled, site: &SiteConfig) -> String {
    let css = format!(
        "{}\n\n{}",
        config::generate_color_css(&site.colors),
        CSS_STATIC
    );

    let content = match (assembled, site.layout) {
        (Assembled::Posts(posts), _) => render_blog(posts, site),
        (Assembled::Images(images), Layout::Profile) => render_profile(images, site),
        (Assembled::Images(images), _) => render_gallery(images, site),
    };
    let body_class = match site.layout {
        Layout::Blog => "layout-blog",
        Layout::Gallery => "layout-gallery",
        Layout::Profile => "layout-profile",
    };

    base_document(site, &css, body_class, content).into_string()
}

/// Strip the first configured prefix the title starts with, any case.
///
/// Titles that would become empty are shown unchanged.
pub fn display_title<'a>(title: &'a str, prefixes: &[String]) -> &'a str {
    for prefix in prefixes {
        let Some(head) = title.get(..prefix.len()) else {
            continue;
        };
        if head.to_lowercase() == prefix.to_lowercase() {
            let rest = title[prefix.len()..].trim();
            if !rest.is_empty() {
                return rest;
            }
        }
    }
    title
}

/// Percent-encode a repository-relative path for use as a URL.
pub fn image_src(path: &str) -> String {
    path.split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(site: &SiteConfig, css: &str, body_class: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="generator" content={ "commit-gal " (env!("CARGO_PKG_VERSION")) };
                @if let Some(desc) = &site.description {
                    meta name="description" content=(desc);
                }
                title { (site.title) }
                style { (PreEscaped(css)) }
            }
            body class=(body_class) {
                (content)
                (lightbox())
                script { (PreEscaped(JS)) }
            }
        }
    }
}

fn site_header(site: &SiteConfig) -> Markup {
    html! {
        header.site-header {
            h1.site-title { (site.title) }
            @if let Some(desc) = &site.description {
                p.site-description { (desc) }
            }
        }
    }
}

/// One image element. `fallback_alt` is used when there is no caption.
fn image_tag(image: &ImageRef, fallback_alt: &str) -> Markup {
    let caption = image.caption.as_deref().unwrap_or(fallback_alt);
    html! {
        img src=(image_src(&image.path))
            width=(image.width)
            height=(image.height)
            alt=(caption)
            loading="lazy"
            data-caption=(caption)
            data-commit=(image.commit);
    }
}

fn lightbox() -> Markup {
    html! {
        div.lightbox id="lightbox" hidden {
            button.lightbox-close type="button" aria-label="Close" { "×" }
            img.lightbox-image alt="";
            p.lightbox-caption {}
        }
    }
}

// ============================================================================
// Layouts
// ============================================================================

fn render_blog(posts: &[Post], site: &SiteConfig) -> Markup {
    html! {
        (site_header(site))
        main.posts {
            @if posts.is_empty() {
                p.empty { "No image commits yet." }
            }
            @for post in posts {
                (render_post(post, &site.prefixes))
            }
        }
    }
}

fn render_post(post: &Post, prefixes: &[String]) -> Markup {
    let title = display_title(&post.title, prefixes);
    html! {
        article.post id={ "commit-" (post.hash) } {
            header.post-header {
                h2.post-title { (title) }
                p.post-meta {
                    @match &post.email {
                        Some(email) => {
                            a.post-author href={ "mailto:" (email) } { (post.author) }
                        }
                        None => {
                            span.post-author { (post.author) }
                        }
                    }
                    " · "
                    time.post-date { (post.date) }
                    " · "
                    code.post-hash { (post.hash) }
                }
            }
            @for paragraph in &post.paragraphs {
                p.post-body { (paragraph) }
            }
            div.post-images {
                @for image in &post.images {
                    figure.post-image {
                        (image_tag(image, title))
                        @if let Some(caption) = &image.caption {
                            figcaption { (caption) }
                        }
                    }
                }
            }
        }
    }
}

fn gallery_grid(images: &[GalleryImage], prefixes: &[String]) -> Markup {
    html! {
        div.gallery-grid {
            @for entry in images {
                @let title = display_title(&entry.title, prefixes);
                figure.tile {
                    (image_tag(&entry.image, title))
                    figcaption.tile-overlay {
                        span.tile-title { (title) }
                        time.tile-date { (entry.date) }
                    }
                }
            }
        }
    }
}

fn render_gallery(images: &[GalleryImage], site: &SiteConfig) -> Markup {
    html! {
        (site_header(site))
        main.gallery {
            @if images.is_empty() {
                p.empty { "No image commits yet." }
            }
            (gallery_grid(images, &site.prefixes))
        }
    }
}

fn render_profile(images: &[GalleryImage], site: &SiteConfig) -> Markup {
    let mut commits: Vec<&str> = images.iter().map(|g| g.image.commit.as_str()).collect();
    commits.dedup();

    html! {
        header.profile {
            @if let Some(avatar) = &site.avatar {
                img.profile-avatar src=(image_src(avatar)) alt=(site.title);
            }
            div.profile-info {
                h1.site-title { (site.title) }
                ul.profile-stats {
                    li { strong { (commits.len()) } " posts" }
                    li { strong { (images.len()) } " images" }
                }
                @if let Some(desc) = &site.description {
                    p.site-description { (desc) }
                }
            }
        }
        main.gallery {
            @if images.is_empty() {
                p.empty { "No image commits yet." }
            }
            (gallery_grid(images, &site.prefixes))
        }
    }
}
