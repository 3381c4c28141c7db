//! In-memory storage implementation.

use super::{BoxFuture, SavedSheet, Storage, StorageError, StorageResult};
use crate::record::NodeRecord;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    sheets: RwLock<HashMap<String, SavedSheet>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, title: &str, records: &[NodeRecord]) -> BoxFuture<'_, StorageResult<SavedSheet>> {
        let sheet = SavedSheet::new(title, records.to_vec());
        Box::pin(async move {
            let mut sheets = self.sheets.write().map_err(lock_error)?;
            sheets.insert(sheet.title.clone(), sheet.clone());
            Ok(sheet)
        })
    }

    fn load(&self, title: &str) -> BoxFuture<'_, StorageResult<SavedSheet>> {
        let title = title.to_string();
        Box::pin(async move {
            let sheets = self.sheets.read().map_err(lock_error)?;
            sheets.get(&title).cloned().ok_or(StorageError::NotFound(title))
        })
    }

    fn delete(&self, title: &str) -> BoxFuture<'_, StorageResult<()>> {
        let title = title.to_string();
        Box::pin(async move {
            let mut sheets = self.sheets.write().map_err(lock_error)?;
            sheets.remove(&title);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let sheets = self.sheets.read().map_err(lock_error)?;
            Ok(sheets.keys().cloned().collect())
        })
    }

    fn exists(&self, title: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let title = title.to_string();
        Box::pin(async move {
            let sheets = self.sheets.read().map_err(lock_error)?;
            Ok(sheets.contains_key(&title))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellRect;
    use crate::node::{Node, NodeKind};
    use crate::storage::block_on;

    fn records() -> Vec<NodeRecord> {
        let node = Node::new(NodeKind::Text, CellRect::new(2, 3, 3, 2));
        vec![NodeRecord::from_node(&node)]
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let saved = block_on(storage.save("Goblin", &records())).unwrap();
        let loaded = block_on(storage.load("Goblin")).unwrap();

        assert_eq!(saved, loaded);
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].x, 2);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_save_replaces() {
        let storage = MemoryStorage::new();
        block_on(storage.save("sheet", &records())).unwrap();
        block_on(storage.save("sheet", &[])).unwrap();
        assert!(block_on(storage.load("sheet")).unwrap().records.is_empty());
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        assert!(!block_on(storage.exists("sheet")).unwrap());
        block_on(storage.save("sheet", &records())).unwrap();
        assert!(block_on(storage.exists("sheet")).unwrap());

        block_on(storage.delete("sheet")).unwrap();
        assert!(!block_on(storage.exists("sheet")).unwrap());
        block_on(storage.delete("sheet")).unwrap();
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        block_on(storage.save("a", &[])).unwrap();
        block_on(storage.save("b", &[])).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"a".to_string()));
        assert!(list.contains(&"b".to_string()));
    }
}
