//! Thumbnail generation and caching.
//!
//! Thumbnails are cropped and scaled to the exact requested size and stored
//! as JPEG files on disk, keyed by a hash of the source identifier and the
//! requested dimensions. Cached files are never invalidated or evicted.

use image::DynamicImage;
use std::fmt;
use std::path::Path;

pub mod cache;
pub mod error;
pub mod events;
pub mod executor;
pub mod resize;
pub mod service;

pub use cache::ThumbnailCache;
pub use error::ThumbnailError;
pub use events::ThumbnailEvent;
pub use executor::ThumbnailExecutor;
pub use service::{Thumbnail, ThumbnailService};

/// Edge length used when a request does not name a size.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 64;

/// Requested thumbnail dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A square size.
    pub const fn square(edge: u32) -> Self {
        Self::new(edge, edge)
    }

    /// Check if both dimensions are non-zero.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// The size to actually produce for a request.
    ///
    /// Missing or zero-sized requests fall back to a `default_edge` square.
    pub fn resolve(requested: Option<ThumbnailSize>, default_edge: u32) -> Self {
        requested
            .filter(ThumbnailSize::is_valid)
            .unwrap_or_else(|| Self::square(default_edge))
    }

    /// Dimensions of `image`.
    pub fn of(image: &DynamicImage) -> Self {
        Self::new(image.width(), image.height())
    }
}

impl Default for ThumbnailSize {
    fn default() -> Self {
        Self::square(DEFAULT_THUMBNAIL_SIZE)
    }
}

impl fmt::Display for ThumbnailSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Decodes source images for the thumbnail service.
///
/// Sources are identified by the same string the consumer uses to request
/// the thumbnail.
pub trait ImageSource: Send + Sync {
    /// Decode the full-size image for `id`.
    fn decode(&self, id: &str) -> Result<DynamicImage, ThumbnailError>;
}

/// Decodes source images from local files, treating the identifier as a path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageSource;

impl ImageSource for FileImageSource {
    fn decode(&self, id: &str) -> Result<DynamicImage, ThumbnailError> {
        let path = id.strip_prefix("file://").unwrap_or(id);
        image::open(Path::new(path)).map_err(|source| ThumbnailError::Decode {
            id: id.to_string(),
            source,
        })
    }
}
