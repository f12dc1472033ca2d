use crate::{err, error::StowageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Holds file metadata.
/// Main file model for the `files` table.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Primary key.
    pub id: Uuid,

    /// Display name, always suffixed with the extension if the file has one.
    pub name: String,

    /// Lowercase extension without the leading dot. Empty if the file has none.
    pub extension: String,

    /// Size in bytes.
    pub size: i64,

    /// Derived from the extension on upload and never changed afterwards.
    pub category: FileCategory,

    /// The user with mutation rights over the file.
    pub owner_id: Uuid,

    /// Account of the owner at the time of upload.
    pub account_id: Uuid,

    /// Collaborator emails with read access.
    pub shared_with: Vec<String>,

    /// Identifier of the content in the blob store.
    pub blob_id: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl File {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Owners and collaborators can read a file.
    pub fn is_accessible_by(&self, user_id: Uuid, email: &str) -> bool {
        self.is_owned_by(user_id)
            || self
                .shared_with
                .iter()
                .any(|shared| shared.eq_ignore_ascii_case(email))
    }
}

/// Broad file classes used for filtering and quota accounting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Image,
    Video,
    Audio,
    Other,
}

impl FileCategory {
    /// Classify by extension. Matching is case insensitive and unknown
    /// extensions fall into [FileCategory::Other].
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" | "doc" | "docx" | "txt" | "xls" | "xlsx" | "csv" | "rtf" | "ods" | "ppt"
            | "odp" | "md" | "html" | "htm" | "epub" | "pages" | "fig" | "psd" | "ai" | "indd"
            | "xd" | "sketch" | "afdesign" | "afphoto" => Self::Document,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" => Self::Image,
            "mp4" | "avi" | "mov" | "mkv" | "webm" => Self::Video,
            "mp3" | "wav" | "ogg" | "flac" => Self::Audio,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FileCategory {
    type Err = StowageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(Self::Document),
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "other" => Ok(Self::Other),
            _ => err!(DoesNotExist, "File category '{s}'"),
        }
    }
}

/// Get the lowercase extension of a file name, without the dot.
/// Returns an empty string for names without one. Dotfiles such as `.env`
/// and names ending in a dot have no extension.
pub fn extension_of(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Suffix `name` with `.ext` unless it already ends with it (case insensitive).
pub fn with_extension(name: &str, ext: &str) -> String {
    let ext = ext.trim_start_matches('.');

    if ext.is_empty() {
        return name.to_string();
    }

    let suffix = format!(".{}", ext.to_lowercase());

    if name.to_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}.{ext}")
    }
}

/// Renders a byte count for humans, e.g. `1.50 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;

    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{size:.2} {}", UNITS[unit])
}

/// DTO for inserting.
#[derive(Debug)]
pub struct FileInsert<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub extension: String,
    pub size: i64,
    pub category: FileCategory,
    pub owner_id: Uuid,
    pub account_id: Uuid,
    pub blob_id: &'a str,
}

impl<'a> FileInsert<'a> {
    /// Extension and category are derived from `name` here, and only here.
    pub fn new(
        name: &'a str,
        size: i64,
        owner_id: Uuid,
        account_id: Uuid,
        blob_id: &'a str,
    ) -> Self {
        let extension = extension_of(name);
        let category = FileCategory::from_extension(&extension);
        Self {
            id: Uuid::new_v4(),
            name,
            extension,
            size,
            category,
            owner_id,
            account_id,
            blob_id,
        }
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Name,
    Size,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Name => "name",
            Self::Size => "size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordering for file listings, written as `<field>-<direction>`, e.g. `createdAt-desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl FileSort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl std::fmt::Display for FileSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = match self.field {
            SortField::CreatedAt => "createdAt",
            SortField::Name => "name",
            SortField::Size => "size",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{field}-{direction}")
    }
}

impl std::str::FromStr for FileSort {
    type Err = StowageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((field, direction)) = s.rsplit_once('-') else {
            return err!(ParseSort, "expected <field>-<direction>, got '{s}'");
        };

        let field = match field {
            "createdAt" | "$createdAt" | "created_at" => SortField::CreatedAt,
            "name" => SortField::Name,
            "size" => SortField::Size,
            _ => return err!(ParseSort, "unknown sort field '{field}'"),
        };

        let direction = match direction.to_lowercase().as_str() {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return err!(ParseSort, "unknown sort direction '{direction}'"),
        };

        Ok(Self { field, direction })
    }
}
