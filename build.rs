//! Stamps the binary with the commit and release tag it was built from.
//! `main.rs` turns both into the `--version` label.

use std::process::Command;

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    out.status
        .success()
        .then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let commit = git(&["rev-parse", "--short=7", "HEAD"]).unwrap_or_default();
    let tag = git(&["describe", "--exact-match", "--tags", "HEAD"]).unwrap_or_default();

    println!("cargo:rustc-env=COMMIT_GAL_BUILD_COMMIT={commit}");
    println!("cargo:rustc-env=COMMIT_GAL_BUILD_TAG={tag}");
}
