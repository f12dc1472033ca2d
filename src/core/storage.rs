use crate::error::StowageError;

/// Holds file contents, addressed by blob ID.
/// Serves as indirection to decouple file records from where their bytes live.
#[async_trait::async_trait]
pub trait BlobStore {
    fn id(&self) -> &'static str;

    /// Write `content` under `blob_id`. Must not overwrite an existing blob.
    ///
    /// * `blob_id`: Blob identifier.
    /// * `content`: What to write.
    async fn write(&self, blob_id: &str, content: &[u8]) -> Result<(), StowageError>;

    /// Read the contents of a blob.
    ///
    /// * `blob_id`: Blob identifier.
    async fn read(&self, blob_id: &str) -> Result<Vec<u8>, StowageError>;

    /// Delete the blob from the underlying storage.
    ///
    /// * `blob_id`: Blob identifier.
    async fn delete(&self, blob_id: &str) -> Result<(), StowageError>;
}
