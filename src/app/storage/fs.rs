use crate::{core::storage::BlobStore, err, error::StowageError, map_err};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Simple FS based implementation of a [BlobStore](crate::core::storage::BlobStore).
/// Every blob is a single file in the base directory, named by its ID.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    /// The base directory to store the blobs in.
    base: PathBuf,
}

impl FsBlobStore {
    pub fn new(path: &str) -> Self {
        std::fs::create_dir_all(path).expect("unable to create upload directory");

        let base = PathBuf::from_str(path)
            .expect("invalid path")
            .canonicalize()
            .expect("unable to canonicalize");

        if !base.is_dir() {
            panic!("not a directory: {path}");
        }

        info!("Initialising fs store at {}", base.display());

        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn blob_path(&self, blob_id: &str) -> Result<PathBuf, StowageError> {
        let valid = !blob_id.is_empty()
            && blob_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

        if !valid {
            return err!(InvalidFileName, "invalid blob ID: {blob_id}");
        }

        Ok(self.base.join(blob_id))
    }
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    fn id(&self) -> &'static str {
        "fs"
    }

    async fn write(&self, blob_id: &str, content: &[u8]) -> Result<(), StowageError> {
        let path = self.blob_path(blob_id)?;
        debug!("Writing {}", path.display());

        let blob = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        let mut blob = match blob {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return err!(AlreadyExists, "Blob '{blob_id}' at {}", path.display());
            }
            Err(e) => return Err(StowageError::new(file!(), line!(), column!(), e.into())),
        };

        map_err!(blob.write_all(content).await);
        map_err!(blob.flush().await);

        Ok(())
    }

    async fn read(&self, blob_id: &str) -> Result<Vec<u8>, StowageError> {
        let path = self.blob_path(blob_id)?;
        debug!("Reading {}", path.display());
        if !map_err!(tokio::fs::try_exists(&path).await) {
            return err!(DoesNotExist, "Blob '{blob_id}'");
        }
        Ok(map_err!(tokio::fs::read(&path).await))
    }

    async fn delete(&self, blob_id: &str) -> Result<(), StowageError> {
        let path = self.blob_path(blob_id)?;
        debug!("Removing {}", path.display());
        Ok(map_err!(tokio::fs::remove_file(&path).await))
    }
}
