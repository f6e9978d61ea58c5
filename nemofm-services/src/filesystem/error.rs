// SPDX-License-Identifier: LGPL-3.0-only
//! Error types for the filesystem module.

use std::fmt;

/// Errors that can occur in the directory model.
#[derive(Debug)]
pub enum FileSystemError {
    /// I/O error from std::fs operations.
    Io(std::io::Error),
    /// Row index outside the current listing.
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of entries at the time of the call.
        len: usize,
    },
    /// Name is empty or contains a path separator.
    InvalidName(String),
}

impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSystemError::Io(e) => write!(f, "I/O error: {}", e),
            FileSystemError::OutOfRange { index, len } => {
                write!(f, "Index {} out of range for {} entries", index, len)
            },
            FileSystemError::InvalidName(name) => write!(f, "Invalid file name: {:?}", name),
        }
    }
}

impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileSystemError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FileSystemError {
    fn from(err: std::io::Error) -> Self {
        FileSystemError::Io(err)
    }
}

/// Why a scan ended without listing the whole directory.
#[derive(Debug)]
pub enum ScanError {
    /// The directory could not be opened.
    Open(std::io::Error),
    /// Reading the directory failed part way through.
    Read(std::io::Error),
    /// The scan was superseded and stopped early.
    Cancelled,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Open(e) => write!(f, "Failed to open directory: {}", e),
            ScanError::Read(e) => write!(f, "Failed to read directory: {}", e),
            ScanError::Cancelled => write!(f, "Scan cancelled"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Open(e) | ScanError::Read(e) => Some(e),
            ScanError::Cancelled => None,
        }
    }
}
