// SPDX-License-Identifier: LGPL-3.0-only
//! Listing order: directories first, then by name.

use crate::filesystem::entry::DirectoryEntry;
use std::cmp::Ordering;

/// Compare two entries for display order.
///
/// Directories always sort before everything else. Within the same kind,
/// names compare case-insensitively, with the exact name breaking ties so the
/// order stays total.
pub fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => compare_names(a.name(), b.name()),
    }
}

/// Case-insensitive name comparison with a case-sensitive tie-break.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded.then_with(|| a.cmp(b))
}

/// Index at which `entry` must be inserted to keep `entries` sorted.
///
/// Returns the position after any run of equal entries, so entries that
/// compare equal keep their arrival order.
pub fn insertion_index(entries: &[DirectoryEntry], entry: &DirectoryEntry) -> usize {
    entries.partition_point(|existing| compare_entries(existing, entry) != Ordering::Greater)
}

/// Returns true if `entries` is in display order.
pub fn is_sorted(entries: &[DirectoryEntry]) -> bool {
    entries
        .windows(2)
        .all(|pair| compare_entries(&pair[0], &pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::entry::FileType;

    fn entry(name: &str, file_type: FileType) -> DirectoryEntry {
        DirectoryEntry::new(name, format!("/x/{}", name), file_type, 0, None, None)
    }

    #[test]
    fn test_directories_before_files() {
        let dir = entry("zzz", FileType::Directory);
        let file = entry("aaa", FileType::File);
        assert_eq!(compare_entries(&dir, &file), Ordering::Less);
        assert_eq!(compare_entries(&file, &dir), Ordering::Greater);
    }

    #[test]
    fn test_names_ignore_case_first() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("Zebra", "apple"), Ordering::Greater);
        assert_ne!(compare_names("a", "A"), Ordering::Equal);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_insertion_index() {
        let entries = vec![
            entry("A", FileType::Directory),
            entry("a.txt", FileType::File),
            entry("c.txt", FileType::File),
        ];
        assert_eq!(insertion_index(&entries, &entry("b.txt", FileType::File)), 2);
        assert_eq!(insertion_index(&entries, &entry("B", FileType::Directory)), 1);
        assert_eq!(insertion_index(&entries, &entry("d.txt", FileType::File)), 3);
        assert_eq!(insertion_index(&[], &entry("d.txt", FileType::File)), 0);
    }
}
