//! Durable key-value storage contract
//!
//! Preferences are persisted through this narrow surface so the playback core
//! never depends on a concrete backend. Tests substitute an in-memory fake.

use crate::error::Result;

/// Synchronous key-value persistence surface
///
/// Values are opaque strings; callers own their encoding (JSON in practice).
pub trait KeyValueStore: Send {
    /// Read the value stored under `key`, `Ok(None)` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key` if present
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
