//! Archiver core: runtime-free domain types, option validation and the
//! lifecycle state machine shared by the engine and the owning process.
mod bookmark;
mod lifecycle;
mod notifier;
mod options;
mod scan;

pub use bookmark::{normalize_bookmark_url, ArchiveInfo, Bookmark, BookmarkFilter, BookmarkId};
pub use lifecycle::{LifecycleError, LifecycleEvent, LifecycleState};
pub use notifier::ArchiverNotifier;
pub use options::{ArchiverOptions, ConfigError};
pub use scan::ScanReport;
