//! In-memory backend.

use std::sync::{Mutex, PoisonError};

use super::DocumentStore;
use crate::error::Result;

/// A document held in process memory.
///
/// Behaves like [`super::JsonFileStore`] without touching the disk. Records
/// are cloned in and out, so callers never share state with the store.
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    records: Mutex<Vec<T>>,
}

impl<T> MemoryStore<T> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Create a store pre-filled with `records`.
    #[must_use]
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait::async_trait]
impl<T> DocumentStore<T> for MemoryStore<T>
where
    T: Clone + Send + Sync,
{
    fn location(&self) -> String {
        "memory".to_string()
    }

    async fn load(&self) -> Vec<T> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn save(&self, records: &[T]) -> Result<()> {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records.to_vec();
        Ok(())
    }
}
