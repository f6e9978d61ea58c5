// SPDX-License-Identifier: LGPL-3.0-only
//! Synchronous thumbnail requests: cache lookup, then decode, resize and store.

use crate::settings::ThumbnailSettings;
use crate::thumbnail::cache::ThumbnailCache;
use crate::thumbnail::error::ThumbnailError;
use crate::thumbnail::resize::resize_to_thumbnail;
use crate::thumbnail::{FileImageSource, ImageSource, ThumbnailSize, DEFAULT_THUMBNAIL_SIZE};
use image::DynamicImage;
use std::sync::Arc;

/// A produced thumbnail and the size it was produced for.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub image: DynamicImage,
    pub size: ThumbnailSize,
}

/// Serves thumbnails from the disk cache, generating them on a miss.
///
/// Every call blocks for the duration of file I/O and image processing.
/// Run it off the UI thread, for example through
/// [`ThumbnailExecutor`](crate::thumbnail::ThumbnailExecutor).
pub struct ThumbnailService {
    cache: ThumbnailCache,
    source: Arc<dyn ImageSource>,
    default_size: u32,
    cache_exact_matches: bool,
}

impl ThumbnailService {
    /// Create a service that decodes sources from local files.
    pub fn new(cache: ThumbnailCache) -> Self {
        Self::with_source(cache, Arc::new(FileImageSource))
    }

    /// Create a service with a custom image source.
    pub fn with_source(cache: ThumbnailCache, source: Arc<dyn ImageSource>) -> Self {
        Self {
            cache,
            source,
            default_size: DEFAULT_THUMBNAIL_SIZE,
            cache_exact_matches: false,
        }
    }

    pub fn from_settings(settings: &ThumbnailSettings) -> Self {
        Self::new(ThumbnailCache::from_settings(settings))
            .with_default_size(settings.default_size)
            .with_cache_exact_matches(settings.cache_exact_matches)
    }

    /// Edge length used for requests without a size.
    pub fn with_default_size(mut self, edge: u32) -> Self {
        self.default_size = if edge > 0 { edge } else { DEFAULT_THUMBNAIL_SIZE };
        self
    }

    /// Whether sources that already match the requested size are cached.
    ///
    /// Off by default: such sources are returned as decoded and decoded
    /// again on every request.
    pub fn with_cache_exact_matches(mut self, enabled: bool) -> Self {
        self.cache_exact_matches = enabled;
        self
    }

    pub fn cache(&self) -> &ThumbnailCache {
        &self.cache
    }

    /// The size a request for `requested` will produce.
    pub fn resolve_size(&self, requested: Option<ThumbnailSize>) -> ThumbnailSize {
        ThumbnailSize::resolve(requested, self.default_size)
    }

    /// Return the thumbnail for `id`, generating and caching it on a miss.
    ///
    /// A failure to write the cache is logged and the thumbnail is still
    /// returned. A decode failure is returned as an error and not retried.
    pub fn request_image(
        &self,
        id: &str,
        requested: Option<ThumbnailSize>,
    ) -> Result<Thumbnail, ThumbnailError> {
        let size = self.resolve_size(requested);
        log::debug!("Requested image: {} at {}", id, size);

        if let Err(e) = self.cache.ensure_layout() {
            log::warn!("Couldn't create cache at {:?}: {}", self.cache.root(), e);
        }

        if let Some(image) = self.cache.lookup(id, size) {
            log::debug!("Read {} from cache", id);
            return Ok(Thumbnail { image, size });
        }

        let decoded = self.source.decode(id)?;
        if ThumbnailSize::of(&decoded) == size {
            if self.cache_exact_matches {
                self.write_cache(id, size, &decoded);
            }
            return Ok(Thumbnail {
                image: decoded,
                size,
            });
        }

        let image = resize_to_thumbnail(&decoded, size)?;
        self.write_cache(id, size, &image);
        Ok(Thumbnail { image, size })
    }

    fn write_cache(&self, id: &str, size: ThumbnailSize, image: &DynamicImage) {
        match self.cache.store(id, size, image) {
            Ok(_) => log::debug!("Wrote {} to cache", id),
            Err(e) => log::warn!("Couldn't cache {}: {}", id, e),
        }
    }
}

impl std::fmt::Debug for ThumbnailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailService")
            .field("cache", &self.cache)
            .field("default_size", &self.default_size)
            .field("cache_exact_matches", &self.cache_exact_matches)
            .finish_non_exhaustive()
    }
}
