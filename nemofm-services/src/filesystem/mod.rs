//! Directory listing for nemofm.
//!
//! A [`DirectoryModel`] scans one directory on a background worker and merges
//! the results, batch by batch, into a [`SortedEntryStore`] that reports
//! exactly where each entry was inserted.

pub mod entry;
pub mod error;
pub mod model;
pub mod ordering;
pub mod scan;
pub mod store;

// Re-export public API
pub use entry::{DirectoryEntry, EntryRole, EntryValue, FileType, IconHint};
pub use error::{FileSystemError, ScanError};
pub use model::{DirectoryEvent, DirectoryModel, RemoveReport};
pub use scan::{Generation, ScanMessage, ScanTask};
pub use store::{SortedEntryStore, StoreEvent, StoreObserver};
