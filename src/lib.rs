#![warn(missing_docs)]

//! Directory listing and thumbnail backend for file browsers.

pub use nemofm_services as services;

/// A "prelude" for users of nemofm.
///
/// ```rust
/// use nemofm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::services::filesystem::{
        DirectoryEntry, DirectoryEvent, DirectoryModel, EntryRole, EntryValue, FileSystemError,
        StoreEvent, StoreObserver,
    };
    pub use crate::services::settings::{BrowserSettings, SettingsRegistry, ThumbnailSettings};
    pub use crate::services::thumbnail::{
        ThumbnailCache, ThumbnailError, ThumbnailEvent, ThumbnailExecutor, ThumbnailService,
        ThumbnailSize,
    };
}
