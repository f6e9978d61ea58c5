// SPDX-License-Identifier: LGPL-3.0-only
//! Sorted, observable collection of directory entries.

use crate::filesystem::entry::DirectoryEntry;
use crate::filesystem::ordering::insertion_index;
use std::path::Path;

/// Change notifications emitted by [`SortedEntryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent<'a> {
    /// Every entry was removed.
    Reset {
        /// Number of entries that were dropped.
        removed: usize,
    },
    /// One entry was inserted.
    Inserted {
        /// Position of the new entry.
        index: usize,
        /// The new entry.
        entry: &'a DirectoryEntry,
    },
}

/// Receives store change notifications.
///
/// Notifications are delivered after the store has been updated, so the
/// index in an `Inserted` event is valid for the store as it is at that time.
pub trait StoreObserver: Send {
    /// Called once per change.
    fn notify(&mut self, event: &StoreEvent<'_>);
}

impl<F> StoreObserver for F
where
    F: FnMut(&StoreEvent<'_>) + Send,
{
    fn notify(&mut self, event: &StoreEvent<'_>) {
        self(event)
    }
}

/// The authoritative listing, kept in display order.
#[derive(Default)]
pub struct SortedEntryStore {
    entries: Vec<DirectoryEntry>,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl SortedEntryStore {
    /// Create an empty store with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for subsequent changes.
    pub fn add_observer(&mut self, observer: impl StoreObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Remove every entry and notify observers.
    pub fn reset(&mut self) {
        let removed = self.entries.len();
        self.entries.clear();
        self.emit(&StoreEvent::Reset { removed });
    }

    /// Insert a single entry at its sorted position.
    ///
    /// Returns the index it landed at.
    pub fn insert(&mut self, entry: DirectoryEntry) -> usize {
        let index = insertion_index(&self.entries, &entry);
        self.entries.insert(index, entry);

        let Self { entries, observers } = self;
        let event = StoreEvent::Inserted {
            index,
            entry: &entries[index],
        };
        for observer in observers.iter_mut() {
            observer.notify(&event);
        }

        index
    }

    /// Merge a batch, one entry at a time in batch order.
    ///
    /// Each entry's position accounts for the entries inserted before it.
    pub fn merge_batch(&mut self, batch: Vec<DirectoryEntry>) -> usize {
        let count = batch.len();
        for entry in batch {
            self.insert(entry);
        }
        count
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&DirectoryEntry> {
        self.entries.get(index)
    }

    /// All entries in display order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Position of the entry with the given path.
    pub fn position(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path() == path)
    }

    fn emit(&mut self, event: &StoreEvent<'_>) {
        for observer in self.observers.iter_mut() {
            observer.notify(event);
        }
    }
}

impl std::fmt::Debug for SortedEntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedEntryStore")
            .field("entries", &self.entries)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::entry::FileType;
    use crate::filesystem::ordering::is_sorted;
    use std::sync::{Arc, Mutex};

    fn entry(name: &str, file_type: FileType) -> DirectoryEntry {
        DirectoryEntry::new(name, format!("/d/{}", name), file_type, 0, None, None)
    }

    fn names(store: &SortedEntryStore) -> Vec<&str> {
        store.entries().iter().map(|e| e.name()).collect()
    }

    fn sample() -> Vec<DirectoryEntry> {
        vec![
            entry("b.txt", FileType::File),
            entry("Photos", FileType::Directory),
            entry("a.txt", FileType::File),
            entry("C.txt", FileType::File),
            entry("Music", FileType::Directory),
            entry("archive", FileType::Directory),
        ]
    }

    #[test]
    fn test_merge_keeps_order_after_every_batch() {
        let mut store = SortedEntryStore::new();
        for batch in sample().chunks(2) {
            store.merge_batch(batch.to_vec());
            assert!(is_sorted(store.entries()));
        }
        assert_eq!(
            names(&store),
            vec!["archive", "Music", "Photos", "a.txt", "b.txt", "C.txt"]
        );
    }

    #[test]
    fn test_permutations_reach_same_state() {
        let forward = sample();
        let mut backward = sample();
        backward.reverse();
        let mut rotated = sample();
        rotated.rotate_left(3);

        let mut expected = SortedEntryStore::new();
        expected.merge_batch(forward);

        for order in [backward, rotated] {
            let mut store = SortedEntryStore::new();
            store.merge_batch(order);
            assert_eq!(store.entries(), expected.entries());
        }
    }

    #[test]
    fn test_reset_matches_fresh_store() {
        let mut reused = SortedEntryStore::new();
        reused.merge_batch(vec![entry("stale", FileType::File)]);
        reused.reset();
        reused.merge_batch(sample());

        let mut fresh = SortedEntryStore::new();
        fresh.merge_batch(sample());

        assert_eq!(reused.entries(), fresh.entries());
    }

    #[test]
    fn test_observer_sees_insert_positions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut store = SortedEntryStore::new();
        store.add_observer(move |event: &StoreEvent<'_>| {
            let record = match event {
                StoreEvent::Reset { removed } => format!("reset {}", removed),
                StoreEvent::Inserted { index, entry } => format!("{} at {}", entry.name(), index),
            };
            sink.lock().unwrap().push(record);
        });

        store.merge_batch(vec![
            entry("b", FileType::File),
            entry("a", FileType::File),
            entry("dir", FileType::Directory),
        ]);
        store.reset();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["b at 0", "a at 0", "dir at 0", "reset 3"]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut store = SortedEntryStore::new();
        store.merge_batch(vec![entry("x", FileType::File), entry("x", FileType::File)]);
        assert_eq!(store.len(), 2);
    }
}
