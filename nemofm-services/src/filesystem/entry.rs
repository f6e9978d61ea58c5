// SPDX-License-Identifier: LGPL-3.0-only
//! Directory entry type and its consumer-facing attributes.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Type of filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link whose target could not be resolved.
    Symlink,
    /// Other type (e.g., device, socket, etc.).
    Other,
}

impl FileType {
    fn from_metadata(metadata: &Metadata) -> Self {
        if metadata.is_dir() {
            FileType::Directory
        } else if metadata.is_symlink() {
            FileType::Symlink
        } else if metadata.is_file() {
            FileType::File
        } else {
            FileType::Other
        }
    }
}

/// One filesystem object observed during a scan.
///
/// Entries are immutable. A rescan produces new entries rather than updating
/// old ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    name: String,
    path: PathBuf,
    file_type: FileType,
    size: u64,
    created: Option<SystemTime>,
    modified: Option<SystemTime>,
}

impl DirectoryEntry {
    /// Create a new entry from already gathered attributes.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        file_type: FileType,
        size: u64,
        created: Option<SystemTime>,
        modified: Option<SystemTime>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            file_type,
            size,
            created,
            modified,
        }
    }

    /// Build an entry from a path and its metadata.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            name,
            path: path.to_path_buf(),
            file_type: FileType::from_metadata(metadata),
            size: metadata.len(),
            created: metadata.created().ok(),
            modified: metadata.modified().ok(),
        }
    }

    /// Name of the entry (last path component).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute path of the entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Type of the entry.
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Creation time, if the platform reports one.
    pub fn created(&self) -> Option<SystemTime> {
        self.created
    }

    /// Last modification time.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Check if this entry is anything other than a directory.
    pub fn is_file(&self) -> bool {
        !self.is_dir()
    }

    /// Check if the name carries the hidden-file marker.
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }

    /// Directory containing this entry.
    pub fn parent_path(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Icon the consumer should show for this entry.
    pub fn icon_hint(&self) -> IconHint {
        if self.name.ends_with(".jpg") || self.name.ends_with(".png") {
            return IconHint::Preview(self.path.clone());
        }

        if self.is_dir() {
            IconHint::Theme(DIRECTORY_ICON)
        } else {
            IconHint::Theme(DOCUMENT_ICON)
        }
    }

    /// Look up one attribute by role.
    pub fn value(&self, role: EntryRole) -> EntryValue {
        match role {
            EntryRole::FileName => EntryValue::Text(self.name.clone()),
            EntryRole::CreationDate => EntryValue::Time(self.created),
            EntryRole::ModifiedDate => EntryValue::Time(self.modified),
            EntryRole::FileSize => EntryValue::Bytes(self.size),
            EntryRole::IconSource => EntryValue::Icon(self.icon_hint()),
            EntryRole::FilePath => EntryValue::Path(self.path.clone()),
            EntryRole::IsDir => EntryValue::Flag(self.is_dir()),
            EntryRole::IsFile => EntryValue::Flag(self.is_file()),
        }
    }
}

/// Names beginning with this marker are hidden.
pub const HIDDEN_MARKER: char = '.';

const DIRECTORY_ICON: &str = "image://theme/icon-m-common-directory";
const DOCUMENT_ICON: &str = "image://theme/icon-m-content-document";

/// Returns true if `name` should be excluded from listings.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with(HIDDEN_MARKER)
}

/// Icon hint for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconHint {
    /// The file is itself a previewable image.
    Preview(PathBuf),
    /// A named icon from the theme.
    Theme(&'static str),
}

/// The fixed set of attributes a list consumer can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryRole {
    FileName,
    CreationDate,
    ModifiedDate,
    FileSize,
    IconSource,
    FilePath,
    IsDir,
    IsFile,
}

impl EntryRole {
    /// Every role, in declaration order.
    pub const ALL: [EntryRole; 8] = [
        EntryRole::FileName,
        EntryRole::CreationDate,
        EntryRole::ModifiedDate,
        EntryRole::FileSize,
        EntryRole::IconSource,
        EntryRole::FilePath,
        EntryRole::IsDir,
        EntryRole::IsFile,
    ];

    /// Key used by list consumers for this role.
    pub fn role_name(self) -> &'static str {
        match self {
            EntryRole::FileName => "fileName",
            EntryRole::CreationDate => "creationDate",
            EntryRole::ModifiedDate => "modifiedDate",
            EntryRole::FileSize => "fileSize",
            EntryRole::IconSource => "iconSource",
            EntryRole::FilePath => "filePath",
            EntryRole::IsDir => "isDir",
            EntryRole::IsFile => "isFile",
        }
    }

    /// Parse a consumer key back into a role.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.role_name() == name)
    }
}

/// Value of a single entry attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    Text(String),
    Path(PathBuf),
    Time(Option<SystemTime>),
    Bytes(u64),
    Flag(bool),
    Icon(IconHint),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> DirectoryEntry {
        DirectoryEntry::new(name, format!("/tmp/{}", name), FileType::File, 10, None, None)
    }

    #[test]
    fn test_role_names_round_trip() {
        for role in EntryRole::ALL {
            assert_eq!(EntryRole::from_name(role.role_name()), Some(role));
        }
        assert_eq!(EntryRole::from_name("display"), None);
    }

    #[test]
    fn test_icon_hint() {
        assert_eq!(
            file("cat.png").icon_hint(),
            IconHint::Preview(PathBuf::from("/tmp/cat.png"))
        );
        assert_eq!(file("notes.txt").icon_hint(), IconHint::Theme(DOCUMENT_ICON));

        let dir = DirectoryEntry::new("Music", "/tmp/Music", FileType::Directory, 0, None, None);
        assert_eq!(dir.icon_hint(), IconHint::Theme(DIRECTORY_ICON));
        assert_eq!(dir.value(EntryRole::IsDir), EntryValue::Flag(true));
        assert_eq!(dir.value(EntryRole::IsFile), EntryValue::Flag(false));
    }

    #[test]
    fn test_hidden() {
        assert!(file(".bashrc").is_hidden());
        assert!(!file("bashrc").is_hidden());
    }
}
