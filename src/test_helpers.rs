//! Shared test utilities: scratch git repositories and real image bytes.
//!
//! ```rust
//! let fixture = FixtureRepo::new();
//! fixture.write("photos/pier.png", &png_bytes(40, 30));
//! let hash = fixture.commit("Add pier");
//! ```

use git2::{IndexAddOption, Oid, Repository, RepositoryInitOptions, Signature, Time};
use image::{ImageEncoder, RgbImage};
use std::cell::Cell;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Fixture repository
// =========================================================================

/// A throwaway repository on branch `main` with deterministic commit times.
pub struct FixtureRepo {
    dir: TempDir,
    repo: Repository,
    next_time: Cell<i64>,
}

impl FixtureRepo {
    /// Author time of the first commit; each later commit is a minute later.
    pub const FIRST_TIME: i64 = 1_700_000_000;

    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        Self {
            dir,
            repo,
            next_time: Cell::new(Self::FIRST_TIME),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file in the working tree, creating parent directories.
    pub fn write(&self, rel: &str, bytes: &[u8]) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, bytes).unwrap();
    }

    pub fn remove(&self, rel: &str) {
        std::fs::remove_file(self.dir.path().join(rel)).unwrap();
    }

    /// Stage everything (including deletions) and commit on `HEAD`.
    /// Returns the full hash.
    pub fn commit(&self, message: &str) -> String {
        let parents: Vec<String> = self.head_hash().into_iter().collect();
        self.commit_with(message, Some("HEAD"), &parents)
    }

    /// Commit on `HEAD` with `other` as the second parent.
    pub fn merge(&self, message: &str, other: &str) -> String {
        let mut parents: Vec<String> = self.head_hash().into_iter().collect();
        parents.push(other.to_string());
        self.commit_with(message, Some("HEAD"), &parents)
    }

    /// Commit on top of `parent` without moving any ref, as on a side branch.
    pub fn commit_detached(&self, message: &str, parent: &str) -> String {
        self.commit_with(message, None, &[parent.to_string()])
    }

    fn head_hash(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        head.target().map(|oid| oid.to_string())
    }

    fn commit_with(&self, message: &str, update_ref: Option<&str>, parents: &[String]) -> String {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let time = self.next_time.get();
        self.next_time.set(time + 60);
        let sig = Signature::new("Ada Lovelace", "ada@example.com", &Time::new(time, 120)).unwrap();

        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|h| self.repo.find_commit(Oid::from_str(h).unwrap()).unwrap())
            .collect();
        let parents: Vec<&git2::Commit<'_>> = parents.iter().collect();
        self.repo
            .commit(update_ref, &sig, &sig, message, &tree, &parents)
            .unwrap()
            .to_string()
    }
}

// =========================================================================
// Image bytes
// =========================================================================

fn solid(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, image::Rgb([120, 80, 40]))
}

/// A valid PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(solid(width, height).as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A valid PNG with one extra text chunk (`tEXt` / `iTXt`) after `IHDR`.
pub fn png_with_text(width: u32, height: u32, kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let png = png_bytes(width, height);
    // 8-byte signature + IHDR (4 len + 4 type + 13 data + 4 crc)
    let ihdr_end = 8 + 25;

    let mut chunk = Vec::new();
    chunk.extend_from_slice(&(body.len() as u32).to_be_bytes());
    chunk.extend_from_slice(kind);
    chunk.extend_from_slice(body);
    let mut crc_input = kind.to_vec();
    crc_input.extend_from_slice(body);
    chunk.extend_from_slice(&crc32(&crc_input).to_be_bytes());

    let mut out = png[..ihdr_end].to_vec();
    out.extend_from_slice(&chunk);
    out.extend_from_slice(&png[ihdr_end..]);
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

/// A valid baseline JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 80)
        .write_image(solid(width, height).as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// A valid JPEG with an APP13 segment carrying IPTC Caption-Abstract.
pub fn jpeg_with_iptc(width: u32, height: u32, caption: &str) -> Vec<u8> {
    let jpeg = jpeg_bytes(width, height);

    let mut iim = vec![0x1C, 0x02, 0x78];
    iim.extend_from_slice(&(caption.len() as u16).to_be_bytes());
    iim.extend_from_slice(caption.as_bytes());

    let mut payload = b"Photoshop 3.0\0".to_vec();
    payload.extend_from_slice(b"8BIM");
    payload.extend_from_slice(&0x0404u16.to_be_bytes());
    // Empty pascal name, padded to two bytes
    payload.extend_from_slice(&[0, 0]);
    payload.extend_from_slice(&(iim.len() as u32).to_be_bytes());
    payload.extend_from_slice(&iim);
    if iim.len() % 2 == 1 {
        payload.push(0);
    }

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xED]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}

#[test]
fn crc32_matches_known_value() {
    // CRC of the IEND chunk type, present in every PNG
    assert_eq!(crc32(b"IEND"), 0xAE42_6082);
}
