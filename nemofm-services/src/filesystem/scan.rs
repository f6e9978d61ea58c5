// SPDX-License-Identifier: LGPL-3.0-only
//! Background directory enumeration in bounded batches.

use crate::filesystem::entry::{is_hidden_name, DirectoryEntry};
use crate::filesystem::error::ScanError;
use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Maximum number of entries per batch.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Identifies one scan's lifetime. Increases with every new scan.
pub type Generation = u64;

/// Messages sent from a scan worker to the owning model.
#[derive(Debug)]
pub enum ScanMessage {
    /// A batch of entries in enumeration order.
    Batch {
        generation: Generation,
        entries: Vec<DirectoryEntry>,
    },
    /// The scan ended. On success carries the number of entries listed.
    Finished {
        generation: Generation,
        result: Result<usize, ScanError>,
    },
}

impl ScanMessage {
    /// Generation of the scan that produced this message.
    pub fn generation(&self) -> Generation {
        match self {
            ScanMessage::Batch { generation, .. } | ScanMessage::Finished { generation, .. } => {
                *generation
            },
        }
    }
}

/// Shared flag used to stop a superseded scan.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Lazy batched iterator over a directory's visible entries.
///
/// Yields full batches of `batch_size` entries, then one final batch that
/// may be shorter or empty. A read error mid-way is yielded after the
/// entries collected before it, and ends the iteration.
#[derive(Debug)]
pub struct ScanBatches {
    read_dir: ReadDir,
    batch_size: usize,
    pending_error: Option<ScanError>,
    done: bool,
}

impl Iterator for ScanBatches {
    type Item = Result<Vec<DirectoryEntry>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.pending_error.take() {
            self.done = true;
            return Some(Err(err));
        }
        if self.done {
            return None;
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        loop {
            match self.read_dir.next() {
                None => {
                    self.done = true;
                    return Some(Ok(batch));
                },
                Some(Err(e)) => {
                    if batch.is_empty() {
                        self.done = true;
                        return Some(Err(ScanError::Read(e)));
                    }
                    self.pending_error = Some(ScanError::Read(e));
                    return Some(Ok(batch));
                },
                Some(Ok(dirent)) => {
                    if is_hidden_name(&dirent.file_name().to_string_lossy()) {
                        continue;
                    }
                    let path = dirent.path();
                    // Follow symlinks; fall back to the link itself when dangling.
                    let metadata = match fs::metadata(&path).or_else(|_| dirent.metadata()) {
                        Ok(metadata) => metadata,
                        Err(e) => {
                            log::debug!("Skipping {:?}: {}", path, e);
                            continue;
                        },
                    };
                    batch.push(DirectoryEntry::from_metadata(&path, &metadata));
                    if batch.len() >= self.batch_size {
                        return Some(Ok(batch));
                    }
                },
            }
        }
    }
}

/// Open `path` for batched enumeration.
pub fn scan_batches(path: &Path, batch_size: usize) -> Result<ScanBatches, ScanError> {
    let read_dir = fs::read_dir(path).map_err(ScanError::Open)?;
    Ok(ScanBatches {
        read_dir,
        batch_size: batch_size.max(1),
        pending_error: None,
        done: false,
    })
}

/// One enumeration of one directory, tagged with its generation.
#[derive(Debug)]
pub struct ScanTask {
    path: PathBuf,
    generation: Generation,
    batch_size: usize,
    cancel: CancelToken,
}

impl ScanTask {
    /// Create a task for `path`.
    pub fn new(path: PathBuf, generation: Generation, batch_size: usize) -> Self {
        Self {
            path,
            generation,
            batch_size,
            cancel: CancelToken::new(),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Token that stops this task at the next batch boundary.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Enumerate synchronously, handing each batch to `emit`.
    ///
    /// `emit` returns false to stop early. Returns the number of entries
    /// emitted.
    pub fn run<F>(&self, mut emit: F) -> Result<usize, ScanError>
    where
        F: FnMut(Vec<DirectoryEntry>) -> bool,
    {
        log::debug!(
            "Scanning {:?} (generation {})",
            self.path,
            self.generation
        );

        let mut total = 0;
        for batch in scan_batches(&self.path, self.batch_size)? {
            if self.cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            let batch = batch?;
            let count = batch.len();
            if !emit(batch) {
                return Err(ScanError::Cancelled);
            }
            total += count;
        }

        Ok(total)
    }

    /// Run on the blocking worker pool, sending batches through `tx`.
    ///
    /// The task always ends with a [`ScanMessage::Finished`] unless the
    /// receiver has gone away.
    pub fn spawn(self, tx: mpsc::Sender<ScanMessage>) {
        smol::unblock(move || {
            let generation = self.generation;
            let result = self.run(|entries| {
                log::trace!("Generation {} sending {} entries", generation, entries.len());
                tx.blocking_send(ScanMessage::Batch {
                    generation,
                    entries,
                })
                .is_ok()
            });

            if let Err(e) = &result {
                log::debug!("Scan of {:?} ended early: {}", self.path, e);
            }
            let _ = tx.blocking_send(ScanMessage::Finished { generation, result });
        })
        .detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_batches_are_bounded() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..7 {
            File::create(dir.path().join(format!("file{}", i))).unwrap();
        }
        File::create(dir.path().join(".hidden")).unwrap();

        let sizes: Vec<usize> = scan_batches(dir.path(), 3)
            .unwrap()
            .map(|batch| batch.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_exact_multiple_ends_with_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..4 {
            File::create(dir.path().join(format!("file{}", i))).unwrap();
        }

        let sizes: Vec<usize> = scan_batches(dir.path(), 2)
            .unwrap()
            .map(|batch| batch.unwrap().len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 0]);
    }

    #[test]
    fn test_missing_directory_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_batches(&dir.path().join("missing"), DEFAULT_BATCH_SIZE);
        assert!(matches!(result, Err(ScanError::Open(_))));
    }

    #[test]
    fn test_cancelled_task_stops() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a")).unwrap();

        let task = ScanTask::new(dir.path().to_path_buf(), 1, DEFAULT_BATCH_SIZE);
        task.cancel_token().cancel();
        let mut emitted = 0;
        let result = task.run(|_| {
            emitted += 1;
            true
        });
        assert!(matches!(result, Err(ScanError::Cancelled)));
        assert_eq!(emitted, 0);
    }
}
