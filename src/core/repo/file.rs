use crate::{
    core::model::file::{File, FileCategory, FileInsert, FileSort},
    error::StowageError,
};
use uuid::Uuid;

/// Parameters for listing the files visible to a user.
#[derive(Debug, Clone, Copy)]
pub struct FileQuery<'a> {
    /// Files owned by this user are visible.
    pub user_id: Uuid,

    /// Files shared with this email are visible.
    pub email: &'a str,

    /// If not empty, only files in these categories.
    pub categories: &'a [FileCategory],

    /// Case insensitive substring of the file name.
    pub search: Option<&'a str>,

    pub sort: FileSort,

    pub limit: Option<i64>,
}

/// Keeps track of file records. The content lives in a
/// [BlobStore](crate::core::storage::BlobStore).
#[async_trait::async_trait]
pub trait FileRepo {
    /// Get file metadata based on ID.
    ///
    /// * `id`: File ID.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<File>, StowageError>;

    /// List the files a user owns or has been given access to.
    ///
    /// * `query`: Visibility, filter and ordering params.
    async fn list(&self, query: FileQuery<'_>) -> Result<Vec<File>, StowageError>;

    /// List every file owned by the user, regardless of sharing.
    ///
    /// * `owner_id`: User ID.
    async fn list_owned(&self, owner_id: Uuid) -> Result<Vec<File>, StowageError>;

    /// Insert file metadata.
    ///
    /// * `file`: Insert payload.
    async fn insert(&self, file: FileInsert<'_>) -> Result<File, StowageError>;

    /// Set the file name, returning the updated file if it exists.
    ///
    /// * `id`: File ID.
    /// * `name`: The full new name, extension included.
    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<File>, StowageError>;

    /// Replace the collaborator list, returning the updated file if it exists.
    ///
    /// * `id`: File ID.
    /// * `emails`: The new list of collaborator emails.
    async fn update_shared_with(
        &self,
        id: Uuid,
        emails: &[String],
    ) -> Result<Option<File>, StowageError>;

    /// Remove file metadata by id.
    ///
    /// * `id`: File ID.
    async fn remove_by_id(&self, id: Uuid) -> Result<u64, StowageError>;
}
