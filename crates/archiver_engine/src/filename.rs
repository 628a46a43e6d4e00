use std::fmt::Write;

use archiver_core::BookmarkId;
use sha2::{Digest, Sha256};

const MAX_SLUG_LEN: usize = 60;

/// Deterministic, filesystem-safe archive name: `{id}-{slug}--{short_hash(url)}.md`.
///
/// The id keeps names unique per bookmark, the hash changes when the url does.
pub fn archive_filename(id: BookmarkId, title: &str, url: &str) -> String {
    format!("{id}-{}--{}.md", slugify(title), short_hash(url))
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len().min(MAX_SLUG_LEN));
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
        if slug.chars().count() >= MAX_SLUG_LEN {
            break;
        }
    }
    if slug.is_empty() {
        slug.push_str("untitled");
    }
    slug
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
