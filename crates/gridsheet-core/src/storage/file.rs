//! File-based storage implementation for native platforms.

use super::{BoxFuture, SavedSheet, Storage, StorageError, StorageResult};
use crate::record::NodeRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage for native platforms.
///
/// Stores one JSON file per sheet in a directory. File names are derived from
/// the title; the title itself is kept inside the file.
///
/// ASCII letters, digits and `-` are kept in the file name. Every other byte
/// of the title becomes `_XX` in hex, so distinct titles never share a file.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/gridsheet/sheets/`
    /// On Windows: `%LOCALAPPDATA%\gridsheet\sheets\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("gridsheet").join("sheets"))
    }

    fn sheet_path(&self, title: &str) -> PathBuf {
        let mut safe = String::with_capacity(title.len());
        for byte in title.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                safe.push(char::from(byte));
            } else {
                safe.push_str(&format!("_{byte:02X}"));
            }
        }
        self.base_path.join(format!("{}.json", safe))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

fn read_sheet(path: &Path) -> StorageResult<SavedSheet> {
    let json = fs::read_to_string(path)
        .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    SavedSheet::from_json(&json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl Storage for FileStorage {
    fn save(&self, title: &str, records: &[NodeRecord]) -> BoxFuture<'_, StorageResult<SavedSheet>> {
        let path = self.sheet_path(title);
        let sheet = SavedSheet::new(title, records.to_vec());

        Box::pin(async move {
            let json = sheet
                .to_json()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json).map_err(|e| {
                StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::debug!("saved sheet {:?} to {}", sheet.title, path.display());
            Ok(sheet)
        })
    }

    fn load(&self, title: &str) -> BoxFuture<'_, StorageResult<SavedSheet>> {
        let path = self.sheet_path(title);
        let title = title.to_string();

        Box::pin(async move {
            if !path.exists() {
                return Err(StorageError::NotFound(title));
            }
            let sheet = read_sheet(&path)?;
            if sheet.title != title {
                log::warn!("{} holds sheet {:?}, not {:?}", path.display(), sheet.title, title);
                return Err(StorageError::NotFound(title));
            }
            Ok(sheet)
        })
    }

    fn delete(&self, title: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.sheet_path(title);

        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut titles = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_none_or(|e| e != "json") {
                    continue;
                }
                match read_sheet(&path) {
                    Ok(sheet) => titles.push(sheet.title),
                    Err(e) => log::warn!("skipping unreadable sheet file: {}", e),
                }
            }
            Ok(titles)
        })
    }

    fn exists(&self, title: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.sheet_path(title);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellRect;
    use crate::node::{Node, NodeKind};
    use crate::storage::block_on;
    use tempfile::tempdir;

    fn records() -> Vec<NodeRecord> {
        let die = Node::new(NodeKind::Die, CellRect::new(5, 1, 1, 1));
        let list = Node::new(NodeKind::List, CellRect::new(1, 3, 3, 4));
        vec![NodeRecord::from_node(&die), NodeRecord::from_node(&list)]
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("Paladin", &records())).unwrap();
        let loaded = block_on(storage.load("Paladin")).unwrap();

        assert_eq!(loaded.title, "Paladin");
        assert_eq!(loaded.records, records());
        assert!(loaded.saved_at > 0);
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_returns_titles() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("My Sheet", &[])).unwrap();
        block_on(storage.save("other", &[])).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"My Sheet".to_string()));
        assert!(list.contains(&"other".to_string()));
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("test", &records())).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());

        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_file_storage_sanitizes_title() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("orc/shaman:v2*", &records())).unwrap();
        assert!(dir.path().join("orc_2Fshaman_3Av2_2A.json").exists());

        let loaded = block_on(storage.load("orc/shaman:v2*")).unwrap();
        assert_eq!(loaded.title, "orc/shaman:v2*");
    }

    #[test]
    fn test_file_storage_similar_titles_keep_separate_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("a_b", &records())).unwrap();
        block_on(storage.save("a b", &[])).unwrap();
        assert!(dir.path().join("a_5Fb.json").exists());
        assert!(dir.path().join("a_20b.json").exists());

        assert_eq!(block_on(storage.load("a_b")).unwrap().records, records());
        assert!(block_on(storage.load("a b")).unwrap().records.is_empty());

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"a_b".to_string()));
        assert!(list.contains(&"a b".to_string()));
    }

    #[test]
    fn test_file_storage_load_checks_stored_title() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let json = SavedSheet::new("someone else", records()).to_json().unwrap();
        fs::write(dir.path().join("mine.json"), json).unwrap();

        let result = block_on(storage.load("mine"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
        assert!(block_on(storage.list()).unwrap().is_empty());
    }
}
