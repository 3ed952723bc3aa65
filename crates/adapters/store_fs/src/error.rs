//! Store-specific error type wrapping filesystem errors.

use std::path::PathBuf;

use hapdemo_domain::error::HapError;

/// Errors originating from the directory store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store path exists but is not a directory.
    #[error("store path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// A filesystem operation failed.
    #[error("filesystem error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

impl From<StoreError> for HapError {
    fn from(err: StoreError) -> Self {
        Self::Storage(Box::new(err))
    }
}
