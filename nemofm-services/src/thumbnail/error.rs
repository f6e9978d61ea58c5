// SPDX-License-Identifier: LGPL-3.0-only
//! Error types for thumbnail operations.

use thiserror::Error;

/// Errors that can occur during thumbnail operations.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    /// The source image could not be read or decoded.
    #[error("Failed to decode {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: image::ImageError,
    },

    /// The thumbnail could not be encoded for the cache.
    #[error("Failed to encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),

    /// A source or target dimension is zero.
    #[error("Invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Cache operation failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unknown error.
    #[error("Unknown error: {0}")]
    Unknown(String),
}
