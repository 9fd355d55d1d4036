use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::{Result, store::KeyValueStore, validate_key};

const VALUE_EXTENSION: &str = "json";
const TEMP_SUFFIX: &str = ".tmp";

/// File-backed key-value store for device-local persistence.
///
/// Each key maps to `<root>/<key>.json`. Writes go to a uniquely named
/// temporary sibling file that is renamed over the target, so a crash mid-write
/// leaves either the old value or the new one on disk, never a truncated file.
/// Concurrent writers, including other processes sharing the directory, never
/// share a temporary file; the last rename wins.
#[derive(Debug, Clone)]
pub struct FileKvStore {
    root: PathBuf,
}

impl FileKvStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        tracing::debug!(root = %root.display(), "opened file key-value store");
        Ok(Self { root })
    }

    /// Returns the directory holding the stored values.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path used for `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{VALUE_EXTENSION}")))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;
        let root = self.root.clone();
        let prefix = format!(".{key}.");
        let bytes = value.len();

        // The temp file is removed on drop if any step fails.
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(TEMP_SUFFIX)
                .tempfile_in(&root)?;
            temp.write_all(value.as_bytes())?;
            temp.as_file().sync_all()?;
            temp.persist(&path)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;

        tracing::trace!(key, bytes, "value written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
