use crate::{
    core::{
        model::{
            file::{human_size, with_extension, File, FileInsert},
            quota::QuotaSummary,
            user::User,
        },
        repo::file::{FileQuery, FileRepo},
        storage::BlobStore,
    },
    err,
    error::StowageError,
    map_err,
};
use dto::{FileDisplay, FileRename, FileShare, FileUpload, ListFiles};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use validify::{Validate, Validify};

/// Settings for [FileService].
#[derive(Debug, Clone)]
pub struct FileServiceConfig {
    /// Base URL used to build view and download links.
    pub public_url: String,

    /// Largest accepted upload in bytes.
    pub max_upload_size: usize,
}

/// High level operations for file management. Every operation takes the
/// authenticated user. Only the owner of a file may mutate it.
#[derive(Clone)]
pub struct FileService<R> {
    pub repo: R,
    store: Arc<dyn BlobStore + Send + Sync>,
    config: FileServiceConfig,
}

impl<R> FileService<R>
where
    R: FileRepo + Send + Sync,
{
    pub fn new(repo: R, store: Arc<dyn BlobStore + Send + Sync>, config: FileServiceConfig) -> Self {
        Self {
            repo,
            store,
            config,
        }
    }

    /// List the files the user owns or that were shared with them.
    ///
    /// * `user`: The caller.
    /// * `params`: Filtering and ordering options.
    pub async fn list(&self, user: &User, params: ListFiles) -> Result<Vec<File>, StowageError> {
        map_err!(params.validate());

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let query = FileQuery {
            user_id: user.id,
            email: &user.email,
            categories: &params.types,
            search,
            sort: params.sort,
            limit: params.limit.map(|limit| limit as i64),
        };

        self.repo.list(query).await
    }

    /// Get a file the user owns or has access to.
    ///
    /// * `user`: The caller.
    /// * `id`: File ID.
    pub async fn get(&self, user: &User, id: Uuid) -> Result<File, StowageError> {
        let file = self.get_existing(id).await?;

        if !file.is_accessible_by(user.id, &user.email) {
            return err!(Forbidden, "File '{id}' is not shared with you");
        }

        Ok(file)
    }

    /// Get a file along with its contents.
    ///
    /// * `user`: The caller.
    /// * `id`: File ID.
    pub async fn download(&self, user: &User, id: Uuid) -> Result<(File, Vec<u8>), StowageError> {
        let file = self.get(user, id).await?;
        let content = self.store.read(&file.blob_id).await?;
        Ok((file, content))
    }

    /// Persist the contents in the blob store and insert the file metadata.
    /// If the insert fails the blob is removed so it does not linger without a record.
    ///
    /// * `user`: The owner of the new file.
    /// * `params`: Upload params.
    pub async fn upload(
        &self,
        user: &User,
        mut params: FileUpload<'_>,
    ) -> Result<File, StowageError> {
        map_err!(params.validify());

        let FileUpload { ref name, file } = params;

        if file.len() > self.config.max_upload_size {
            return err!(
                PayloadTooLarge,
                "'{name}' is {}, the limit is {}",
                human_size(file.len() as u64),
                human_size(self.config.max_upload_size as u64)
            );
        }

        let blob_id = Uuid::new_v4().to_string();

        self.store.write(&blob_id, file).await?;

        let insert = FileInsert::new(name, file.len() as i64, user.id, user.account_id, &blob_id);

        match self.repo.insert(insert).await {
            Ok(file) => {
                info!(
                    "Uploaded '{}' ({}, {}) to '{}' for {}",
                    file.name,
                    file.category,
                    human_size(file.size as u64),
                    self.store.id(),
                    user.id
                );
                Ok(file)
            }
            Err(e) => {
                error!("Unable to insert '{name}', removing blob '{blob_id}'");
                if let Err(cleanup) = self.store.delete(&blob_id).await {
                    warn!("Blob '{blob_id}' left without a record");
                    cleanup.print();
                }
                Err(e)
            }
        }
    }

    /// Rename a file. The stored extension is appended unless the new name already ends with it.
    ///
    /// * `user`: The caller, must be the owner.
    /// * `id`: File ID.
    /// * `params`: The new name and, optionally, the extension to check against.
    pub async fn rename(
        &self,
        user: &User,
        id: Uuid,
        mut params: FileRename,
    ) -> Result<File, StowageError> {
        map_err!(params.validify());

        let file = self.get_owned(user, id).await?;

        if let Some(ref extension) = params.extension {
            let extension = extension.trim_start_matches('.');
            if !extension.eq_ignore_ascii_case(&file.extension) {
                return err!(
                    InvalidFileName,
                    "'{id}' is a '{}' file and cannot be renamed to '{extension}'",
                    file.extension
                );
            }
        }

        let name = with_extension(&params.name, &file.extension);

        let Some(file) = self.repo.update_name(id, &name).await? else {
            return err!(DoesNotExist, "File with ID '{id}'");
        };

        info!("Renamed '{id}' to '{name}'");

        Ok(file)
    }

    /// Replace the list of collaborators of a file.
    ///
    /// * `user`: The caller, must be the owner.
    /// * `id`: File ID.
    /// * `params`: The complete new list of emails.
    pub async fn update_sharing(
        &self,
        user: &User,
        id: Uuid,
        params: FileShare,
    ) -> Result<File, StowageError> {
        let params = params.normalized();
        map_err!(params.validate());

        self.get_owned(user, id).await?;

        let Some(file) = self.repo.update_shared_with(id, &params.emails).await? else {
            return err!(DoesNotExist, "File with ID '{id}'");
        };

        info!("'{id}' now shared with {} user(s)", file.shared_with.len());

        Ok(file)
    }

    /// Remove the file record, then its blob. The blob is only touched once the
    /// record is gone.
    ///
    /// * `user`: The caller, must be the owner.
    /// * `id`: File ID.
    pub async fn delete(&self, user: &User, id: Uuid) -> Result<(), StowageError> {
        let file = self.get_owned(user, id).await?;

        if self.repo.remove_by_id(id).await? == 0 {
            return err!(DoesNotExist, "File with ID '{id}'");
        }

        self.store.delete(&file.blob_id).await?;

        info!("Deleted '{}' ({id})", file.name);

        Ok(())
    }

    /// Per category usage of the user's own files.
    ///
    /// * `user`: The caller.
    pub async fn quota(&self, user: &User) -> Result<QuotaSummary, StowageError> {
        let files = self.repo.list_owned(user.id).await?;
        let summary = QuotaSummary::from_files(&files);

        debug!(
            "User '{}' uses {}% of their storage, {} remaining",
            user.id,
            summary.percentage(),
            human_size(summary.remaining())
        );

        Ok(summary)
    }

    /// Attach view and download links to a file.
    pub fn display(&self, file: File) -> FileDisplay {
        let base = self.config.public_url.trim_end_matches('/');
        FileDisplay {
            url: format!("{base}/files/{}/view", file.id),
            download_url: format!("{base}/files/{}/download", file.id),
            file,
        }
    }

    async fn get_existing(&self, id: Uuid) -> Result<File, StowageError> {
        match self.repo.get_by_id(id).await? {
            Some(file) => Ok(file),
            None => err!(DoesNotExist, "File with ID '{id}'"),
        }
    }

    async fn get_owned(&self, user: &User, id: Uuid) -> Result<File, StowageError> {
        let file = self.get_existing(id).await?;

        if !file.is_owned_by(user.id) {
            warn!("User '{}' attempted to modify '{id}' without owning it", user.id);
            return err!(Forbidden, "Only the owner can modify file '{id}'");
        }

        Ok(file)
    }
}

/// File service DTOs.
pub mod dto {
    use crate::core::model::file::{File, FileCategory, FileSort};
    use serde::{Deserialize, Serialize};
    use validify::{schema_err, schema_validation, Validate, ValidationErrors, Validify};

    #[derive(Debug, Validify)]
    #[validate(Self::validate_schema)]
    pub struct FileUpload<'a> {
        /// File name, including the extension.
        #[modify(trim)]
        #[validate(length(min = 1, max = 255, message = "File name cannot be empty."))]
        pub name: String,

        /// File contents.
        pub file: &'a [u8],
    }

    impl<'a> FileUpload<'a> {
        pub fn new(name: String, file: &'a [u8]) -> Self {
            Self { name, file }
        }

        #[schema_validation]
        fn validate_schema(&self) -> Result<(), ValidationErrors> {
            if has_control_chars(&self.name) {
                schema_err! {
                    "invalid_file_name",
                    "file name cannot contain control characters"
                }
            }
        }
    }

    /// Filters for listing files.
    #[derive(Debug, Default, Clone, Validate)]
    pub struct ListFiles {
        /// Only files in these categories. All categories if empty.
        pub types: Vec<FileCategory>,

        /// Case insensitive substring of the name.
        pub search: Option<String>,

        pub sort: FileSort,

        #[validate(range(min = 1., max = 1000.))]
        pub limit: Option<usize>,
    }

    #[derive(Debug, Deserialize, Validify, utoipa::ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[validate(Self::validate_schema)]
    pub struct FileRename {
        /// The new name. Gets the extension appended if it is missing.
        #[modify(trim)]
        #[validate(length(min = 1, max = 255, message = "File name cannot be empty."))]
        pub name: String,

        /// Must match the current extension of the file if set.
        pub extension: Option<String>,
    }

    impl FileRename {
        #[schema_validation]
        fn validate_schema(&self) -> Result<(), ValidationErrors> {
            if has_control_chars(&self.name) {
                schema_err! {
                    "invalid_file_name",
                    "file name cannot contain control characters"
                }
            }
        }
    }

    fn has_control_chars(name: &str) -> bool {
        name.chars().any(char::is_control)
    }

    #[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
    #[serde(rename_all = "camelCase")]
    #[validate(Self::validate_schema)]
    pub struct FileShare {
        /// Replaces the current collaborators.
        pub emails: Vec<String>,
    }

    impl FileShare {
        /// Trim, lowercase and deduplicate, keeping the first occurrence.
        pub fn normalized(self) -> Self {
            let mut emails: Vec<String> = Vec::with_capacity(self.emails.len());

            for email in self.emails {
                let email = email.trim().to_lowercase();
                if !email.is_empty() && !emails.contains(&email) {
                    emails.push(email);
                }
            }

            Self { emails }
        }

        #[schema_validation]
        fn validate_schema(&self) -> Result<(), ValidationErrors> {
            if self.emails.iter().any(|email| !looks_like_email(email)) {
                schema_err! {
                    "invalid_email",
                    "every collaborator must be a valid email address"
                }
            }
        }
    }

    fn looks_like_email(email: &str) -> bool {
        match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
                    && !domain.contains('@')
                    && !email.chars().any(char::is_whitespace)
            }
            None => false,
        }
    }

    /// A file with the links to its content.
    #[derive(Debug, Serialize, utoipa::ToSchema)]
    #[serde(rename_all = "camelCase")]
    pub struct FileDisplay {
        pub file: File,

        /// Inline view link.
        pub url: String,

        /// Attachment download link.
        pub download_url: String,
    }

}
