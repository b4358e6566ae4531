//! Degrading storage wrapper.

use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

use super::{MemoryStorage, Scope, Storage};
use crate::error::Result;

/// Uses `primary` until it fails once, then serves every later call from an
/// in-memory store for the rest of its lifetime.
///
/// Calls on a degraded wrapper never fail, so a tour keeps running within the
/// current page even when persistent storage is unavailable.
pub struct FallbackStorage {
    primary: Box<dyn Storage>,
    memory: MemoryStorage,
    degraded: AtomicBool,
    scope: Scope,
}

impl FallbackStorage {
    pub fn new(primary: Box<dyn Storage>, scope: Scope) -> Self {
        Self {
            primary,
            memory: MemoryStorage::new(),
            degraded: AtomicBool::new(false),
            scope,
        }
    }

    /// Whether the wrapper has switched to memory.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn with_fallback<T>(
        &self,
        primary: impl FnOnce(&dyn Storage) -> Result<T>,
        memory: impl FnOnce(&MemoryStorage) -> Result<T>,
    ) -> Result<T> {
        if !self.is_degraded() {
            match primary(self.primary.as_ref()) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        "{} storage unavailable, continuing in memory: {e}",
                        self.scope
                    );
                    self.degraded.store(true, Ordering::Relaxed);
                }
            }
        }
        memory(&self.memory)
    }
}

impl Storage for FallbackStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.with_fallback(|s| s.get_item(key), |m| m.get_item(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.with_fallback(|s| s.set_item(key, value), |m| m.set_item(key, value))
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.with_fallback(|s| s.remove_item(key), |m| m.remove_item(key))
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.with_fallback(|s| s.keys(), |m| m.keys())
    }

    fn clear(&self) -> Result<()> {
        self.with_fallback(|s| s.clear(), |m| m.clear())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::TourError;

    /// Storage that fails every call.
    pub(crate) struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(broken())
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(broken())
        }

        fn remove_item(&self, _key: &str) -> Result<()> {
            Err(broken())
        }

        fn keys(&self) -> Result<Vec<String>> {
            Err(broken())
        }

        fn clear(&self) -> Result<()> {
            Err(broken())
        }
    }

    fn broken() -> TourError {
        TourError::storage("storage disabled").with_source(rusqlite::Error::InvalidQuery)
    }

    #[test]
    fn test_healthy_primary_is_used() {
        let storage = FallbackStorage::new(Box::new(MemoryStorage::new()), Scope::Durable);
        storage.set_item("k", "v").unwrap();
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
        assert!(!storage.is_degraded());
    }

    #[test]
    fn test_degrades_after_failure() {
        let storage = FallbackStorage::new(Box::new(BrokenStorage), Scope::Session);
        assert_eq!(storage.get_item("contactsTourStep").unwrap(), None);
        assert!(storage.is_degraded());

        storage.set_item("contactsTourStep", "contacts-step2").unwrap();
        assert_eq!(
            storage.get_item("contactsTourStep").unwrap().as_deref(),
            Some("contacts-step2")
        );
        assert_eq!(storage.keys().unwrap(), vec!["contactsTourStep"]);
        storage.clear().unwrap();
        assert!(storage.keys().unwrap().is_empty());
    }
}
