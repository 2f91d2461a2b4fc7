//! Storage layer for vyra.
//!
//! Each store holds one document: an ordered list of records that is read
//! in full and rewritten in full on every mutation. The [`DocumentStore`]
//! trait is the seam between the services and the persistence backend:
//!
//! - [`JsonFileStore`] keeps the document as a human-readable JSON file,
//!   replaced atomically on every write.
//! - [`MemoryStore`] keeps it in process memory, for tests and embedding.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};

/// A persistence backend for one ordered list of records.
///
/// Loading never fails: a missing, unreadable or corrupt document is the
/// empty list. Saving replaces the whole document.
#[async_trait::async_trait]
pub trait DocumentStore<T>: Send + Sync
where
    T: Send + Sync,
{
    /// Human-readable location of the document, for logs.
    fn location(&self) -> String;

    /// Read the whole document.
    async fn load(&self) -> Vec<T>;

    /// Replace the whole document with `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    async fn save(&self, records: &[T]) -> Result<()>;
}

/// Name of the directory used when the configured data directory cannot be
/// created.
pub const FALLBACK_DIR_NAME: &str = "driver_shield_360";

/// Make sure the data directory exists, falling back to a directory under
/// the system temp dir when the preferred one cannot be created.
///
/// Returns the directory that is actually usable.
///
/// # Errors
///
/// Returns an error if neither directory can be created.
pub fn ensure_data_dir(preferred: &Path) -> Result<PathBuf> {
    match std::fs::create_dir_all(preferred) {
        Ok(()) => Ok(preferred.to_path_buf()),
        Err(err) => {
            let fallback = std::env::temp_dir().join(FALLBACK_DIR_NAME);
            warn!(
                "Cannot create data directory {}: {}; using {}",
                preferred.display(),
                err,
                fallback.display()
            );
            std::fs::create_dir_all(&fallback).map_err(|source| Error::DirectoryCreate {
                path: fallback.clone(),
                source,
            })?;
            Ok(fallback)
        }
    }
}
