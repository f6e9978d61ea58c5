// SPDX-License-Identifier: LGPL-3.0-only
pub mod filesystem;
pub mod settings;
pub mod thumbnail;

// Re-export commonly used types
pub use filesystem::{DirectoryEntry, DirectoryModel, FileSystemError, SortedEntryStore};
pub use settings::SettingsRegistry;
pub use thumbnail::{ThumbnailCache, ThumbnailError, ThumbnailService, ThumbnailSize};
