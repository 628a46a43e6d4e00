//! Archiver engine: the background archiver and the IO pipeline it drives.
mod archiver;
mod convert;
mod decode;
mod extract;
mod fetch;
mod filename;
mod frontmatter;
mod persist;
mod pool;
mod process;
mod scan;
mod store;
mod task;
mod trigger;
mod types;

pub use archiver::{BackgroundArchiver, StartError};
pub use convert::{Converter, Html2MdConverter};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use extract::{ExtractedContent, Extractor, ReadabilityLikeExtractor};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use filename::archive_filename;
pub use frontmatter::build_archive_document;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pool::WorkerPool;
pub use process::{ArchivePipeline, BookmarkProcessor, Clock, ProcessError, ARCHIVE_DIR};
pub use scan::ScanCycle;
pub use store::{check_archive_consistency, BookmarkStore, MemoryBookmarkStore, StoreError};
pub use task::{ArchiveError, ArchiveTask};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
