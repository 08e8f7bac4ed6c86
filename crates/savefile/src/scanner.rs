//! Directory scanning for save files.

use std::ffi::OsString;
use std::fs::{self, FileType};
use std::io;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::naming;

/// A regular file in the save directory whose name carries a valid timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaveFile {
    name: String,
    timestamp: NaiveDateTime,
}

impl SaveFile {
    /// Interpret `name` as a save file name, or `None` if it is not one.
    pub fn from_name(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let timestamp = naming::parse_timestamp(&name)?;
        Some(Self { name, timestamp })
    }

    /// File name relative to the save directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// Outcome of a single directory listing.
#[derive(Debug, Clone, Default)]
pub struct DirectoryScan {
    /// Number of directory entries of any kind, save files or not.
    pub entries: usize,
    /// Valid save files, in directory order.
    pub save_files: Vec<SaveFile>,
}

impl DirectoryScan {
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn save_count(&self) -> usize {
        self.save_files.len()
    }
}

/// List `directory` and collect every regular file named like a save.
///
/// Subdirectories, symlinks and other special entries are skipped, as are
/// names that are not UTF-8 or do not parse. Only listing failures are errors.
pub fn scan(directory: &Path) -> Result<DirectoryScan> {
    let mut scan = DirectoryScan::default();

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        scan.entries += 1;

        if let Some(save) = save_file_of(entry.file_type(), entry.file_name()) {
            scan.save_files.push(save);
        }
    }

    Ok(scan)
}

/// Decide whether one directory entry is a save file.
///
/// An entry whose type cannot be read (e.g. removed since the listing) is
/// skipped like any other foreign entry.
fn save_file_of(file_type: io::Result<FileType>, file_name: OsString) -> Option<SaveFile> {
    match file_type {
        Ok(file_type) if file_type.is_file() => {}
        Ok(_) => {
            tracing::trace!("Skipping non-regular entry {:?}", file_name);
            return None;
        }
        Err(err) => {
            tracing::trace!("Skipping unreadable entry {:?}: {}", file_name, err);
            return None;
        }
    }

    let Ok(name) = file_name.into_string() else {
        tracing::trace!("Skipping non UTF-8 entry");
        return None;
    };

    let save = SaveFile::from_name(name.as_str());
    if save.is_none() {
        tracing::trace!("Ignoring foreign file {:?}", name);
    }
    save
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_from_name() {
        let save = SaveFile::from_name("save_20240101_120000.json").unwrap();
        assert_eq!(save.name(), "save_20240101_120000.json");
        assert_eq!(
            save.timestamp().format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-01 12:00:00"
        );
        assert!(SaveFile::from_name("save_garbage.json").is_none());
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp = TempDir::new().unwrap();
        let scan = scan(temp.path()).unwrap();
        assert!(scan.is_empty());
        assert_eq!(scan.save_count(), 0);
    }

    #[test]
    fn test_scan_filters_foreign_entries() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "save_20240101_120000.bin");
        touch(temp.path(), "save_20240102_120000.json");
        touch(temp.path(), "readme.txt");
        touch(temp.path(), "save_2024_broken_name.bin");
        fs::create_dir(temp.path().join("save_20240103_120000.bin")).unwrap();

        let scan = scan(temp.path()).unwrap();
        assert_eq!(scan.entries, 5);

        let mut names: Vec<_> = scan.save_files.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["save_20240101_120000.bin", "save_20240102_120000.json"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_symlinks() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "target.bin");
        std::os::unix::fs::symlink(
            temp.path().join("target.bin"),
            temp.path().join("save_20240101_120000.bin"),
        )
        .unwrap();

        let scan = scan(temp.path()).unwrap();
        assert_eq!(scan.entries, 2);
        assert_eq!(scan.save_count(), 0);
    }

    #[test]
    fn test_unreadable_entry_is_skipped() {
        let vanished = Err(io::Error::from(io::ErrorKind::NotFound));
        assert!(save_file_of(vanished, OsString::from("save_20240101_120000.bin")).is_none());
    }

    #[test]
    fn test_save_file_of_by_type() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "plain");
        let file_type = fs::metadata(temp.path().join("plain")).unwrap().file_type();
        let dir_type = fs::metadata(temp.path()).unwrap().file_type();

        let name = || OsString::from("save_20240101_120000.bin");
        assert_eq!(
            save_file_of(Ok(file_type), name()).unwrap().name(),
            "save_20240101_120000.bin"
        );
        assert!(save_file_of(Ok(dir_type), name()).is_none());
        assert!(save_file_of(Ok(file_type), OsString::from("notes.txt")).is_none());
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = scan(&temp.path().join("gone"));
        assert!(matches!(result, Err(crate::SaveError::Io(_))));
    }
}
