//! In-memory storage.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Storage;
use crate::error::Result;

/// Ephemeral storage; never fails.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.items().keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        self.items().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("dashboardTourStep").unwrap(), None);

        storage.set_item("dashboardTourStep", "dashboard1").unwrap();
        storage.set_item("dashboardTourStep", "dashboard2").unwrap();
        assert_eq!(
            storage.get_item("dashboardTourStep").unwrap().as_deref(),
            Some("dashboard2")
        );

        storage.remove_item("dashboardTourStep").unwrap();
        storage.remove_item("dashboardTourStep").unwrap();
        assert_eq!(storage.get_item("dashboardTourStep").unwrap(), None);
    }

    #[test]
    fn test_keys_and_clear() {
        let storage = MemoryStorage::new();
        storage.set_item("b", "2").unwrap();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);

        storage.clear().unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }
}
