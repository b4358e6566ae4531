//! Key/value storage scopes backing the progress store.
//!
//! Two scopes with different lifetimes are used:
//!
//! - **Durable**: survives browser restarts (completion flags).
//! - **Session**: survives page navigations within one browsing session only
//!   (resume cursors).
//!
//! Implementations:
//!
//! - [`MemoryStorage`]: ephemeral, lives as long as the value.
//! - [`SqliteStorage`]: one scope of a SQLite file; several scopes can share a
//!   file.
//! - [`FallbackStorage`]: wraps another storage and degrades to memory after
//!   the first failure.

use std::fmt;

use crate::error::Result;

pub mod fallback;
pub mod memory;
pub mod sqlite;

pub use fallback::FallbackStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Lifetime class of a storage instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Durable,
    Session,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Durable => write!(f, "durable"),
            Scope::Session => write!(f, "session"),
        }
    }
}

/// A string key/value store in the shape of web storage.
pub trait Storage: Send + Sync {
    /// Reads a value; `Ok(None)` when the key is absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// All keys currently stored.
    fn keys(&self) -> Result<Vec<String>>;

    /// Removes every key.
    fn clear(&self) -> Result<()>;
}
