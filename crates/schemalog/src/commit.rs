//! Commit hash discovery.
//!
//! Resolution order: deployment environment variables, then the local
//! `.git/HEAD`, then the literal `"unknown"`. The result is cached for the
//! process lifetime and truncated to twelve characters.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

const HASH_LEN: usize = 12;

static COMMIT_HASH: OnceLock<String> = OnceLock::new();

/// The commit hash of the running build.
///
/// Resolved once on first call and cached for the process lifetime.
#[must_use]
pub fn commit_hash() -> &'static str {
    COMMIT_HASH.get_or_init(|| {
        let hash = hash_from_env()
            .or_else(|| hash_from_disk(Path::new(".")))
            .unwrap_or_else(|| "unknown".to_owned());
        truncate(hash)
    })
}

fn truncate(mut hash: String) -> String {
    if let Some((idx, _)) = hash.char_indices().nth(HASH_LEN) {
        hash.truncate(idx);
    }
    hash
}

fn hash_from_env() -> Option<String> {
    std::env::var("RAILWAY_GIT_COMMIT_SHA")
        .or_else(|_| std::env::var("GIT_COMMIT_SHA"))
        .ok()
        .filter(|value| !value.is_empty())
}

fn hash_from_disk(root: &Path) -> Option<String> {
    let head = fs::read_to_string(root.join(".git/HEAD")).ok()?;
    let head = head.trim();
    match head.strip_prefix("ref:") {
        // HEAD points at a ref file holding the hash.
        Some(reference) => fs::read_to_string(root.join(".git").join(reference.trim()))
            .ok()
            .map(|contents| contents.trim().to_owned()),
        // Detached HEAD holds the hash directly.
        None => Some(head.to_owned()),
    }
}
