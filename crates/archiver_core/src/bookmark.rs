use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

pub type BookmarkId = u64;

/// Location and metadata of a stored offline snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    pub path: PathBuf,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    /// Set by the archiver right before the fetch pipeline runs.
    #[serde(default)]
    pub create_archive: bool,
    #[serde(default)]
    pub has_archive: bool,
    #[serde(default)]
    pub archive: Option<ArchiveInfo>,
}

impl Bookmark {
    pub fn new(id: BookmarkId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            title: String::new(),
            excerpt: String::new(),
            create_archive: false,
            has_archive: false,
            archive: None,
        }
    }

    /// Marks the record as requiring an archive.
    pub fn request_archive(&mut self) {
        self.create_archive = true;
    }

    /// Attaches the payload and sets the archive-present flag in one step.
    pub fn attach_archive(&mut self, archive: ArchiveInfo) {
        self.archive = Some(archive);
        self.has_archive = true;
    }

    /// A record claiming an archive must also carry its payload.
    pub fn is_archive_consistent(&self) -> bool {
        !self.has_archive || self.archive.is_some()
    }
}

/// Query options for the bookmark store. `None` fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookmarkFilter {
    pub has_archive: Option<bool>,
}

impl BookmarkFilter {
    pub fn missing_archive() -> Self {
        Self {
            has_archive: Some(false),
        }
    }

    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        self.has_archive
            .map_or(true, |wanted| bookmark.has_archive == wanted)
    }
}

/// Parses user input into a canonical bookmark URL (http/https only, no fragment).
pub fn normalize_bookmark_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut url = Url::parse(trimmed).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}
