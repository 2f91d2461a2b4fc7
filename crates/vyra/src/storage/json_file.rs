//! JSON file backend.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::DocumentStore;
use crate::error::{Error, Result};

/// A document kept as a pretty-printed JSON array in a single file.
///
/// Records are decoded one by one; a record that no longer fits `T` is
/// logged and skipped, and disappears at the next save.
///
/// Writes go to a `.tmp` sibling first and are then renamed over the
/// target, so a crash never leaves a half-written document behind.
#[derive(Debug)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Create a store backed by the file at `path`.
    ///
    /// The file does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    /// Get the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait::async_trait]
impl<T> DocumentStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn load(&self) -> Vec<T> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No document at {}, starting empty", self.path.display());
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "Cannot read {}: {}; treating as empty",
                    self.path.display(),
                    err
                );
                return Vec::new();
            }
        };

        let values: Vec<Value> = match serde_json::from_slice(&bytes) {
            Ok(values) => values,
            Err(err) => {
                warn!(
                    "Corrupt document at {}: {}; treating as empty",
                    self.path.display(),
                    err
                );
                return Vec::new();
            }
        };

        // One unreadable record must not cost the rest of the document.
        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(
                        "Skipping record {} in {}: {}",
                        index,
                        self.path.display(),
                        err
                    );
                    None
                }
            })
            .collect()
    }

    async fn save(&self, records: &[T]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        let tmp = self.temp_path();

        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|source| Error::StoreWrite {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| Error::StoreWrite {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            "Wrote {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}
