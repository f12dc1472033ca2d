#[rustfmt::skip]
use super::router::{
    // Files
    file::__path_list_files,
    file::__path_get_file,
    file::__path_upload_files,
    file::__path_rename_file,
    file::__path_share_file,
    file::__path_delete_file,
    file::__path_view_file,
    file::__path_download_file,
    file::__path_quota,
    // Auth
    user::__path_sign_up,
    user::__path_sign_in,
    user::__path_verify,
    user::__path_sign_out,
    user::__path_me,
};
use super::dto::{AccountResponse, SessionResponse, UploadResult, VerifyPayload};
use crate::core::{
    model::{
        file::{File, FileCategory},
        quota::{CategoryUsage, QuotaSummary},
        user::User,
    },
    service::{
        file::dto::{FileDisplay, FileRename, FileShare},
        user::dto::{SignIn, SignUp},
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Files
        list_files,
        get_file,
        upload_files,
        rename_file,
        share_file,
        delete_file,
        view_file,
        download_file,
        quota,
        // Auth
        sign_up,
        sign_in,
        verify,
        sign_out,
        me,
    ),
    components(schemas(
        File,
        FileCategory,
        FileDisplay,
        FileRename,
        FileShare,
        UploadResult,
        QuotaSummary,
        CategoryUsage,
        User,
        SignUp,
        SignIn,
        VerifyPayload,
        AccountResponse,
        SessionResponse,
    ))
)]
pub struct ApiDoc;
