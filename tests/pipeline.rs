//! End-to-end builds against scratch repositories.

use commit_gal::config::{BuildConfig, Layout};
use commit_gal::pipeline::{self, BuildEvent};
use git2::{IndexAddOption, Repository, RepositoryInitOptions, Signature, Time};
use image::{ImageEncoder, RgbImage};
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    repo: Repository,
    commits: usize,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        Self {
            dir,
            repo,
            commits: 0,
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn write(&self, rel: &str, bytes: &[u8]) {
        let path = self.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    fn commit(&mut self, message: &str) {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let time = Time::new(1_700_000_000 + 3600 * self.commits as i64, 0);
        self.commits += 1;
        let sig = Signature::new("Grace Hopper", "grace@example.com", &time).unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]));
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A PNG carrying a `tEXt` `Description` chunk right after `IHDR`.
fn png_with_description(width: u32, height: u32, description: &str) -> Vec<u8> {
    let plain = png(width, height);
    // 8-byte signature + IHDR (4 len + 4 type + 13 data + 4 crc)
    let ihdr_end = 8 + 25;

    let mut body = b"Description\0".to_vec();
    body.extend_from_slice(description.as_bytes());
    let mut typed = b"tEXt".to_vec();
    typed.extend_from_slice(&body);

    let mut out = plain[..ihdr_end].to_vec();
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(&typed);
    out.extend_from_slice(&crc32(&typed).to_be_bytes());
    out.extend_from_slice(&plain[ihdr_end..]);
    out
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFFu32;
    for &b in bytes {
        crc ^= b as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}

/// Three image commits, one skipped, one without images, on top of a root.
fn sample_repo() -> Fixture {
    let mut fixture = Fixture::new();
    fixture.write("README.md", b"# Photos");
    fixture.commit("Initial commit");

    fixture.write("photos/pier.png", &png_with_description(40, 30, "Fog over the pier"));
    fixture.commit("Pier at dawn\n\nFog rolled in\naround six.\n\nShot on film.");

    fixture.write("notes.md", b"notes");
    fixture.commit("Update notes");

    fixture.write("secret/draft.png", &png(8, 8));
    fixture.commit("[skip-gallery] draft");

    fixture.write("photos/harbour a.png", &png(20, 10));
    fixture.write("photos/harbour-b.png", &png(10, 20));
    fixture.commit("Harbour");
    fixture
}

fn config(fixture: &Fixture, out: &Path) -> BuildConfig {
    BuildConfig {
        repo: fixture.path().to_path_buf(),
        output: out.to_path_buf(),
        ..BuildConfig::default()
    }
}

#[test]
fn builds_blog_page_and_copies_images() {
    let fixture = sample_repo();
    let out = TempDir::new().unwrap();
    let report = pipeline::run(&config(&fixture, out.path()), None).unwrap();

    assert_eq!(report.commits_read, 5);
    assert_eq!(report.posts, 2);
    assert_eq!(report.images, 3);
    assert_eq!(report.write.images_copied, 3);

    let html = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert_eq!(html.matches(r#"<article class="post""#).count(), 2);
    let harbour = html.find("Harbour").unwrap();
    let pier = html.find("Pier at dawn").unwrap();
    assert!(harbour < pier, "newest commit first");

    assert!(html.contains("Fog rolled in around six."));
    assert!(html.contains("Shot on film."));
    assert!(html.contains(r#"data-caption="Fog over the pier""#));
    assert!(html.contains(r#"src="photos/harbour%20a.png""#));
    assert!(html.contains(r#"width="40" height="30""#));
    assert!(html.contains("Grace Hopper"));

    assert!(!html.contains("draft"));
    assert!(!html.contains("Update notes"));
    assert!(!out.path().join("secret/draft.png").exists());

    assert!(out.path().join("photos/pier.png").exists());
    assert!(out.path().join("photos/harbour a.png").exists());
    assert!(out.path().join("photos/harbour-b.png").exists());
}

#[test]
fn rebuild_is_byte_identical() {
    let fixture = sample_repo();
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    pipeline::run(&config(&fixture, first.path()), None).unwrap();
    pipeline::run(&config(&fixture, second.path()), None).unwrap();

    assert_eq!(
        fs::read(first.path().join("index.html")).unwrap(),
        fs::read(second.path().join("index.html")).unwrap()
    );
}

#[test]
fn gallery_layout_has_one_entry_per_image() {
    let fixture = sample_repo();
    let out = TempDir::new().unwrap();
    let mut cfg = config(&fixture, out.path());
    cfg.site.layout = Layout::Gallery;
    let report = pipeline::run(&cfg, None).unwrap();

    assert_eq!(report.images, 3);
    let html = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert_eq!(html.matches(r#"<figure class="tile">"#).count(), 3);
    assert!(!html.contains(r#"<article class="post""#));
}

#[test]
fn deleted_image_is_skipped_and_build_succeeds() {
    let mut fixture = sample_repo();
    fixture.write("photos/gone.png", &png(5, 5));
    fixture.commit("Short-lived");
    fs::remove_file(fixture.path().join("photos/gone.png")).unwrap();

    let out = TempDir::new().unwrap();
    let (tx, rx) = mpsc::channel();
    let report = pipeline::run(&config(&fixture, out.path()), Some(&tx)).unwrap();
    drop(tx);

    assert_eq!(report.posts, 3);
    assert_eq!(report.write.images_skipped, 1);
    let html = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(html.contains(r#"src="photos/gone.png" width="800" height="800""#));

    let events: Vec<BuildEvent> = rx.iter().collect();
    assert!(events.contains(&BuildEvent::ImageMissing {
        path: "photos/gone.png".to_string()
    }));
    assert!(events.iter().any(|e| matches!(
        e,
        BuildEvent::DimensionsUnavailable { path, .. } if path == "photos/gone.png"
    )));
}

#[test]
fn deleted_image_has_no_caption() {
    let mut fixture = Fixture::new();
    fixture.write("README.md", b"root");
    fixture.commit("Initial");
    fixture.write("photo.png", &png_with_description(12, 12, "Embedded caption"));
    fixture.write("photo.txt", b"Leftover notes");
    fixture.commit("Photo");
    fs::remove_file(fixture.path().join("photo.png")).unwrap();

    let out = TempDir::new().unwrap();
    let snapshot = pipeline::collect(&config(&fixture, out.path()), None).unwrap();
    let images = snapshot.assembled.images();

    assert_eq!(images.len(), 1);
    assert_eq!(images[0].path, "photo.png");
    assert_eq!(images[0].caption, None);
    assert_eq!((images[0].width, images[0].height), (800, 800));
}

#[test]
fn text_files_next_to_images_are_not_captions() {
    let mut fixture = Fixture::new();
    fixture.write("README.md", b"root");
    fixture.commit("Initial");
    fixture.write("plain.png", &png(6, 6));
    fixture.write("plain.txt", b"Not a caption");
    fixture.commit("Plain");

    let out = TempDir::new().unwrap();
    pipeline::run(&config(&fixture, out.path()), None).unwrap();

    let html = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(!html.contains("Not a caption"));
    assert!(html.contains(r#"data-caption="Plain""#));
}

#[test]
fn max_posts_bounds_history() {
    let fixture = sample_repo();
    let out = TempDir::new().unwrap();
    let mut cfg = config(&fixture, out.path());
    cfg.max_posts = 1;
    let report = pipeline::run(&cfg, None).unwrap();

    assert_eq!(report.commits_read, 1);
    assert_eq!(report.posts, 1);
    let html = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(html.contains("Harbour"));
    assert!(!html.contains("Pier at dawn"));
}

#[test]
fn custom_skip_marker_and_prefixes() {
    let mut fixture = Fixture::new();
    fixture.write("README.md", b"root");
    fixture.commit("Initial");
    fixture.write("a.png", &png(4, 4));
    fixture.commit("photo: Kept");
    fixture.write("b.png", &png(4, 4));
    fixture.commit("NOPE hidden");

    let out = TempDir::new().unwrap();
    let mut cfg = config(&fixture, out.path());
    cfg.site.skip_marker = "nope".to_string();
    cfg.site.prefixes = vec!["Photo:".to_string()];
    pipeline::run(&cfg, None).unwrap();

    let html = fs::read_to_string(out.path().join("index.html")).unwrap();
    assert!(html.contains(r#"<h2 class="post-title">Kept</h2>"#));
    assert!(!html.contains("NOPE"));
    assert!(!html.contains(r#"src="b.png""#));
}
