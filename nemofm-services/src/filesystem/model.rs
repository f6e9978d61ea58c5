// SPDX-License-Identifier: LGPL-3.0-only
//! Directory listing model driving background scans into a sorted store.

use crate::filesystem::entry::{DirectoryEntry, EntryRole, EntryValue};
use crate::filesystem::error::FileSystemError;
use crate::filesystem::scan::{CancelToken, Generation, ScanMessage, ScanTask};
use crate::filesystem::store::{SortedEntryStore, StoreObserver};
use crate::settings::BrowserSettings;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, mpsc};

/// Coarse events emitted by the directory model.
///
/// Per-row changes go through [`StoreObserver`]; these are for consumers
/// that only care about scan progress.
#[derive(Debug, Clone)]
pub enum DirectoryEvent {
    /// A new scan started for `path`.
    PathChanged {
        path: PathBuf,
        generation: Generation,
    },
    /// The scan completed and listed `count` entries.
    ScanFinished {
        path: PathBuf,
        generation: Generation,
        count: usize,
    },
    /// The scan could not list the directory. The listing stays as far as it got.
    ScanFailed {
        path: PathBuf,
        generation: Generation,
        error: String,
    },
}

/// Outcome of [`DirectoryModel::remove`].
#[derive(Debug, Default)]
pub struct RemoveReport {
    /// Paths that were deleted.
    pub removed: Vec<PathBuf>,
    /// Paths that could not be deleted, with the reason.
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl RemoveReport {
    /// Check if every path was deleted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A flat listing of one directory, populated incrementally.
///
/// Scans run on a background worker and hand batches back over a bounded
/// channel. Batches are only merged when the owner calls
/// [`process_pending`](Self::process_pending) or
/// [`wait_for_scan`](Self::wait_for_scan), so every store mutation and its
/// notifications happen on the owner's thread.
pub struct DirectoryModel {
    path: Option<PathBuf>,
    store: SortedEntryStore,
    generation: Generation,
    scanning: bool,
    cancel: Option<CancelToken>,
    batch_size: usize,
    batch_tx: mpsc::Sender<ScanMessage>,
    batch_rx: mpsc::Receiver<ScanMessage>,
    event_tx: broadcast::Sender<DirectoryEvent>,
}

impl DirectoryModel {
    /// Create an empty model with default settings.
    pub fn new() -> Self {
        Self::with_settings(&BrowserSettings::default())
    }

    /// Create an empty model.
    pub fn with_settings(settings: &BrowserSettings) -> Self {
        let (batch_tx, batch_rx) = mpsc::channel(settings.channel_capacity.max(1));
        let (event_tx, _) = broadcast::channel(100);

        Self {
            path: None,
            store: SortedEntryStore::new(),
            generation: 0,
            scanning: false,
            cancel: None,
            batch_size: settings.batch_size,
            batch_tx,
            batch_rx,
            event_tx,
        }
    }

    /// Switch to `path` and start scanning it.
    ///
    /// The store is cleared before this returns. Batches still in flight
    /// from an earlier scan are dropped when they arrive.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();

        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.generation += 1;
        self.store.reset();

        log::debug!("Changing to {:?} (generation {})", path, self.generation);

        let task = ScanTask::new(path.clone(), self.generation, self.batch_size);
        self.cancel = Some(task.cancel_token());
        task.spawn(self.batch_tx.clone());

        self.scanning = true;
        self.path = Some(path.clone());
        let _ = self.event_tx.send(DirectoryEvent::PathChanged {
            path,
            generation: self.generation,
        });
    }

    /// Rescan the current path from scratch.
    pub fn refresh(&mut self) {
        match self.path.clone() {
            Some(path) => self.set_path(path),
            None => log::debug!("Refresh requested with no path set"),
        }
    }

    /// Merge every batch that has already arrived, without waiting.
    ///
    /// Returns the number of entries merged.
    pub fn process_pending(&mut self) -> usize {
        let mut merged = 0;
        while let Ok(message) = self.batch_rx.try_recv() {
            merged += self.apply(message);
        }
        merged
    }

    /// Merge batches until the current scan has finished.
    ///
    /// Returns the number of entries in the listing.
    pub async fn wait_for_scan(&mut self) -> usize {
        while self.scanning {
            match self.batch_rx.recv().await {
                Some(message) => {
                    self.apply(message);
                },
                // We hold a sender, so this only happens if the channel is torn down.
                None => break,
            }
        }
        self.store.len()
    }

    fn apply(&mut self, message: ScanMessage) -> usize {
        if message.generation() != self.generation {
            log::debug!(
                "Discarding stale scan message from generation {} (current {})",
                message.generation(),
                self.generation
            );
            return 0;
        }

        let path = self.path.clone().unwrap_or_default();
        match message {
            ScanMessage::Batch { entries, .. } => {
                log::debug!("Got {} new entries for {:?}", entries.len(), path);
                self.store.merge_batch(entries)
            },
            ScanMessage::Finished { generation, result } => {
                self.scanning = false;
                self.cancel = None;
                let event = match result {
                    Ok(count) => {
                        log::info!("Listed {} entries in {:?}", count, path);
                        DirectoryEvent::ScanFinished {
                            path,
                            generation,
                            count,
                        }
                    },
                    Err(e) => {
                        log::warn!("Failed to list {:?}: {}", path, e);
                        DirectoryEvent::ScanFailed {
                            path,
                            generation,
                            error: e.to_string(),
                        }
                    },
                };
                let _ = self.event_tx.send(event);
                0
            },
        }
    }

    /// Delete each path, then rescan.
    ///
    /// Directories are removed recursively. A failure on one path does not
    /// stop the others.
    pub fn remove<P: AsRef<Path>>(&mut self, paths: &[P]) -> RemoveReport {
        let mut report = RemoveReport::default();

        for path in paths {
            let path = path.as_ref();
            match remove_path(path) {
                Ok(()) => report.removed.push(path.to_path_buf()),
                Err(e) => {
                    log::warn!("Failed to remove {:?}: {}", path, e);
                    report.failed.push((path.to_path_buf(), e));
                },
            }
        }

        self.refresh();
        report
    }

    /// Rename the entry at `index` to `new_name` within its directory.
    ///
    /// On success the listing is rescanned and the new path is returned.
    /// On failure the listing is left untouched.
    ///
    /// The destination is checked for existence before renaming so an
    /// existing file or directory is never replaced. That check and the
    /// rename are not atomic, so a racing writer can still make the
    /// reported cause inaccurate.
    pub fn rename(&mut self, index: usize, new_name: &str) -> Result<PathBuf, FileSystemError> {
        log::debug!("Renaming {} to {:?}", index, new_name);

        let Some(entry) = self.store.get(index) else {
            log::warn!("Out of bounds rename: index {} of {}", index, self.store.len());
            return Err(FileSystemError::OutOfRange {
                index,
                len: self.store.len(),
            });
        };

        if new_name.is_empty() || new_name.contains(std::path::is_separator) {
            return Err(FileSystemError::InvalidName(new_name.to_string()));
        }

        let source = entry.path().to_path_buf();
        let target = entry
            .parent_path()
            .map(|parent| parent.join(new_name))
            .unwrap_or_else(|| PathBuf::from(new_name));

        if let Err(e) = rename_entry(&source, &target) {
            log::warn!("Rename of {:?} to {:?} failed: {}", source, target, e);
            return Err(e.into());
        }

        self.refresh();
        Ok(target)
    }

    /// Register an observer for per-row changes.
    pub fn add_observer(&mut self, observer: impl StoreObserver + 'static) {
        self.store.add_observer(observer);
    }

    /// Subscribe to scan progress events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.event_tx.subscribe()
    }

    /// Current path, if one has been set.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Generation of the current scan.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Check if the current scan is still running.
    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Entry at `index`.
    pub fn entry(&self, index: usize) -> Option<&DirectoryEntry> {
        self.store.get(index)
    }

    /// All entries in display order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        self.store.entries()
    }

    /// One attribute of the entry at `index`.
    pub fn data(&self, index: usize, role: EntryRole) -> Option<EntryValue> {
        match self.store.get(index) {
            Some(entry) => Some(entry.value(role)),
            None => {
                log::warn!("Attempted to access out of range row: {}", index);
                None
            },
        }
    }

    /// Like [`data`](Self::data), with the role given by its consumer key.
    pub fn data_by_name(&self, index: usize, role_name: &str) -> Option<EntryValue> {
        let role = EntryRole::from_name(role_name)?;
        self.data(index, role)
    }
}

impl Default for DirectoryModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DirectoryModel {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        log::debug!("DirectoryModel dropped, pending scan cancelled");
    }
}

fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

fn rename_entry(source: &Path, target: &Path) -> io::Result<()> {
    if fs::symlink_metadata(target).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{:?} already exists", target),
        ));
    }
    fs::rename(source, target)
}
