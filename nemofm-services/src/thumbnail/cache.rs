// SPDX-License-Identifier: LGPL-3.0-only
//! On-disk thumbnail cache.
//!
//! Layout: `{root}/raw/{key}`, where the key is
//! `md5(id)` in hex, the literal `nemo`, then `{width}x{height}`.
//! Files hold JPEG data and are never expired.

use crate::settings::ThumbnailSettings;
use crate::thumbnail::error::ThumbnailError;
use crate::thumbnail::ThumbnailSize;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the cache root under the platform cache directory.
pub const CACHE_DIR_NAME: &str = ".nemothumbs";
/// Subdirectory holding unmodified thumbnails.
pub const RAW_DIR_NAME: &str = "raw";

const KEY_SEPARATOR: &str = "nemo";
/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Compute the cache key for a source identifier and size.
pub fn cache_key(id: &str, size: ThumbnailSize) -> String {
    let digest = md5::compute(id.as_bytes());
    format!("{:x}{}{}x{}", digest, KEY_SEPARATOR, size.width, size.height)
}

/// Default cache root: `{platform cache dir}/.nemothumbs`.
pub fn default_cache_root() -> PathBuf {
    let cache_base = dirs::cache_dir().unwrap_or_else(|| {
        PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string())).join(".cache")
    });

    cache_base.join(CACHE_DIR_NAME)
}

/// A content-addressed store of encoded thumbnails.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    root: PathBuf,
    jpeg_quality: u8,
}

impl ThumbnailCache {
    /// Create a cache rooted at `root`. Nothing is created on disk yet.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Create a cache at [`default_cache_root`].
    pub fn with_default_root() -> Self {
        Self::new(default_cache_root())
    }

    pub fn from_settings(settings: &ThumbnailSettings) -> Self {
        let root = settings.cache_root.clone().unwrap_or_else(default_cache_root);
        Self::new(root).with_jpeg_quality(settings.jpeg_quality)
    }

    /// Set the JPEG quality (1-100) used by [`store`](Self::store).
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the cached files.
    pub fn raw_dir(&self) -> PathBuf {
        self.root.join(RAW_DIR_NAME)
    }

    /// Path of the cache file for `id` at `size`.
    pub fn path_for(&self, id: &str, size: ThumbnailSize) -> PathBuf {
        self.raw_dir().join(cache_key(id, size))
    }

    /// Create the cache root and its raw subdirectory if missing.
    pub fn ensure_layout(&self) -> Result<(), ThumbnailError> {
        fs::create_dir_all(self.raw_dir())?;
        Ok(())
    }

    /// Read a cached thumbnail.
    ///
    /// Returns `None` when the file is missing or cannot be decoded.
    pub fn lookup(&self, id: &str, size: ThumbnailSize) -> Option<DynamicImage> {
        let path = self.path_for(id, size);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!("Failed to read cached thumbnail {:?}: {}", path, e);
                return None;
            },
        };

        match image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg) {
            Ok(img) => Some(img),
            Err(e) => {
                log::warn!("Discarding undecodable cached thumbnail {:?}: {}", path, e);
                None
            },
        }
    }

    /// Encode `image` as JPEG and write it under the key for `id` at `size`.
    ///
    /// The data is written to a temporary file in the same directory and
    /// renamed into place, so readers see either the old file or the whole
    /// new one. An existing entry is replaced.
    pub fn store(
        &self,
        id: &str,
        size: ThumbnailSize,
        image: &DynamicImage,
    ) -> Result<PathBuf, ThumbnailError> {
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality);
        image
            .to_rgb8()
            .write_with_encoder(encoder)
            .map_err(ThumbnailError::Encode)?;

        let path = self.path_for(id, size);
        let temp_path = self.raw_dir().join(format!(
            ".{}.{}.{}.tmp",
            cache_key(id, size),
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        fs::write(&temp_path, &bytes).map_err(|e| {
            ThumbnailError::CacheError(format!("Couldn't write {:?}: {}", temp_path, e))
        })?;

        if let Err(e) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(ThumbnailError::CacheError(format!(
                "Couldn't move thumbnail into {:?}: {}",
                path, e
            )));
        }

        log::debug!("Cached thumbnail {:?}", path);
        Ok(path)
    }
}
