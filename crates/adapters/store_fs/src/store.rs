//! Directory implementation of [`KeyValueStore`].
//!
//! Each key is a file named after the key inside the store directory. Values
//! are first written to a hidden temporary file and renamed over the target,
//! so a reader never observes a partially written value. Hidden files are
//! never reported as keys.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use hapdemo_app::ports::KeyValueStore;
use hapdemo_app::ports::store::validate_key;
use hapdemo_domain::error::HapError;

use crate::error::StoreError;

/// Key/value store persisted in a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open the store rooted at `dir`, creating the directory (and its
    /// parents) when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotADirectory`] when `dir` exists but is not a
    /// directory, or [`StoreError::Io`] when it cannot be inspected or created.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = dir.as_ref().to_path_buf();
        match tokio::fs::metadata(&root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(StoreError::NotADirectory(root)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(&root)
                    .await
                    .map_err(StoreError::io(&root))?;
                tracing::debug!(path = %root.display(), "store directory created");
            }
            Err(err) => return Err(StoreError::io(&root)(err)),
        }
        Ok(Self { root })
    }

    /// Directory holding the store files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, key: &str) -> Result<PathBuf, HapError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

impl KeyValueStore for FsStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, HapError>> + Send {
        let entry = self.entry(key);
        async move {
            let path = entry?;
            match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
                Err(err) => Err(StoreError::io(path)(err).into()),
            }
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<(), HapError>> + Send {
        let entry = self.entry(key);
        let temp = self
            .root
            .join(format!(".{key}.{}.tmp", uuid::Uuid::new_v4().simple()));
        let value = value.to_vec();
        async move {
            let path = entry?;
            if let Err(err) = tokio::fs::write(&temp, &value).await {
                return Err(StoreError::io(temp)(err).into());
            }
            if let Err(err) = tokio::fs::rename(&temp, &path).await {
                let _ = tokio::fs::remove_file(&temp).await;
                return Err(StoreError::io(path)(err).into());
            }
            Ok(())
        }
    }

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), HapError>> + Send {
        let entry = self.entry(key);
        async move {
            let path = entry?;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
                Err(err) => Err(StoreError::io(path)(err).into()),
            }
        }
    }

    fn keys(&self) -> impl Future<Output = Result<Vec<String>, HapError>> + Send {
        let root = self.root.clone();
        async move {
            let mut dir = tokio::fs::read_dir(&root)
                .await
                .map_err(StoreError::io(&root))?;
            let mut keys = Vec::new();
            while let Some(entry) = dir.next_entry().await.map_err(StoreError::io(&root))? {
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                if validate_key(&name).is_err() {
                    continue;
                }
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(StoreError::io(entry.path()))?;
                if file_type.is_file() {
                    keys.push(name);
                }
            }
            keys.sort();
            Ok(keys)
        }
    }
}
