//! Http specific DTOs.

use crate::{
    core::{
        model::file::{FileCategory, FileSort},
        service::file::dto::{FileDisplay, ListFiles},
    },
    error::StowageError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct UploadResult {
    pub files: Vec<FileDisplay>,
    /// Map file names to errors
    pub errors: HashMap<String, Vec<String>>,
}

#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub(super) struct ListFilesPayload {
    /// Comma separated categories, e.g. `image,video`.
    pub types: Option<String>,

    /// Case insensitive substring of the file name.
    pub search: Option<String>,

    /// `<field>-<direction>` where field is one of `createdAt`, `name`, `size`
    /// and direction is `asc` or `desc`. Defaults to `createdAt-desc`.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub sort: Option<FileSort>,

    /// Maximum number of files to return.
    pub limit: Option<usize>,
}

impl TryFrom<ListFilesPayload> for ListFiles {
    type Error = StowageError;

    fn try_from(payload: ListFilesPayload) -> Result<Self, Self::Error> {
        let types = match payload.types.as_deref() {
            Some(types) => types
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::parse::<FileCategory>)
                .collect::<Result<Vec<_>, _>>()?,
            None => vec![],
        };

        Ok(ListFiles {
            types,
            search: payload.search,
            sort: payload.sort.unwrap_or_default(),
            limit: payload.limit,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct VerifyPayload {
    /// Account the code was sent for.
    pub account_id: Uuid,

    /// The one-time code.
    pub code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountResponse {
    /// Verify the one-time code against this account.
    pub account_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct SessionResponse {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::ListFilesPayload;
    use crate::{
        core::{
            model::file::{FileCategory, FileSort, SortDirection, SortField},
            service::file::dto::ListFiles,
        },
        error::StowageErr,
    };

    #[test]
    fn list_payload_parses_categories() {
        let payload = ListFilesPayload {
            types: Some("image, video,,".to_string()),
            sort: Some(FileSort::new(SortField::Name, SortDirection::Asc)),
            ..Default::default()
        };

        let params = ListFiles::try_from(payload).unwrap();
        assert_eq!(vec![FileCategory::Image, FileCategory::Video], params.types);
        assert_eq!(SortField::Name, params.sort.field);
    }

    #[test]
    fn list_payload_rejects_unknown_categories() {
        let payload = ListFilesPayload {
            types: Some("image,spreadsheet".to_string()),
            ..Default::default()
        };

        let err = ListFiles::try_from(payload).unwrap_err();
        assert!(matches!(err.error, StowageErr::DoesNotExist(_)));
    }

    #[test]
    fn list_payload_defaults() {
        let params = ListFiles::try_from(ListFilesPayload::default()).unwrap();
        assert!(params.types.is_empty());
        assert_eq!(FileSort::default(), params.sort);
        assert!(params.limit.is_none());
    }
}
