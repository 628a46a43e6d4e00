use std::path::{Path, PathBuf};
use std::sync::Arc;

use archiver_core::{ArchiveInfo, Bookmark};
use thiserror::Error;

use crate::{
    archive_filename, build_archive_document, decode_html, AtomicFileWriter, Converter,
    DecodeError, Extractor, FetchError, Fetcher, Html2MdConverter, ReadabilityLikeExtractor,
};

/// Subdirectory of the data dir that holds archive documents.
pub const ARCHIVE_DIR: &str = "archive";

/// Produces the `archived_utc` stamp written into each archive.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("{0}")]
    Recoverable(String),
    /// The pipeline itself is broken; not a property of the bookmark.
    #[error("fatal pipeline error: {0}")]
    Fatal(String),
}

impl ProcessError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::Fatal(_))
    }
}

/// Turns a bookmark into one carrying a stored archive.
#[async_trait::async_trait]
pub trait BookmarkProcessor: Send + Sync {
    /// On success the returned bookmark has `has_archive` set together with
    /// its [`ArchiveInfo`].
    async fn process(&self, bookmark: Bookmark) -> Result<Bookmark, ProcessError>;
}

/// Fetch -> decode -> extract -> convert -> write, one archive file per bookmark.
pub struct ArchivePipeline {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    converter: Arc<dyn Converter>,
    writer: AtomicFileWriter,
    archived_utc: Clock,
}

impl ArchivePipeline {
    /// `archived_utc` stamps every document written; the host picks the format.
    pub fn new(fetcher: Arc<dyn Fetcher>, data_dir: &Path, archived_utc: Clock) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(ReadabilityLikeExtractor),
            converter: Arc::new(Html2MdConverter),
            writer: AtomicFileWriter::new(data_dir.join(ARCHIVE_DIR)),
            archived_utc,
        }
    }

    pub fn archive_dir(&self) -> &Path {
        self.writer.dir()
    }

    fn render(&self, bookmark: &mut Bookmark, html: &str, content_type: Option<&str>) -> String {
        let is_plain_text = content_type
            .map(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/plain"))
            .unwrap_or(false);
        if is_plain_text {
            return html.to_string();
        }

        let extracted = self.extractor.extract(html);
        if bookmark.title.is_empty() {
            if let Some(title) = extracted.title {
                bookmark.title = title;
            }
        }
        if bookmark.excerpt.is_empty() {
            if let Some(excerpt) = extracted.excerpt {
                bookmark.excerpt = excerpt;
            }
        }
        self.converter.to_markdown(&extracted.content_html)
    }

    async fn write(&self, bookmark: &Bookmark, document: String) -> Result<PathBuf, ProcessError> {
        let filename = archive_filename(bookmark.id, &bookmark.title, &bookmark.url);
        self.writer
            .write_detached(filename, document)
            .await
            .map_err(|err| {
                ProcessError::Fatal(format!(
                    "cannot write archive into {}: {err}",
                    self.writer.dir().display()
                ))
            })
    }
}

#[async_trait::async_trait]
impl BookmarkProcessor for ArchivePipeline {
    async fn process(&self, mut bookmark: Bookmark) -> Result<Bookmark, ProcessError> {
        bookmark.request_archive();

        let output = self.fetcher.fetch(&bookmark.url).await?;
        let content_type = output.metadata.content_type.as_deref();
        let decoded = decode_html(&output.bytes, content_type)?;

        let body = self.render(&mut bookmark, &decoded.html, content_type);
        if bookmark.title.is_empty() {
            bookmark.title = output.metadata.final_url.clone();
        }

        let document = build_archive_document(
            &bookmark,
            &output.metadata,
            &decoded.encoding_label,
            &(self.archived_utc)(),
            &body,
        );
        let path = self.write(&bookmark, document).await?;

        bookmark.attach_archive(ArchiveInfo {
            path,
            final_url: output.metadata.final_url,
            content_type: output.metadata.content_type,
            byte_len: output.metadata.byte_len,
        });
        Ok(bookmark)
    }
}
