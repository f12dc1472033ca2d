use crate::{
    app::{server::dto::{ListFilesPayload, UploadResult}, state::ServiceState},
    core::{
        model::{file::File, quota::QuotaSummary, user::User},
        service::file::dto::{FileDisplay, FileRename, FileShare, FileUpload, ListFiles},
    },
    error::StowageError,
    map_err,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use std::collections::HashMap;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/files",
    responses(
        (status = 200, description = "List files owned by or shared with the caller", body = [FileDisplay]),
        (status = 400, description = "Malformed query parameters"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Invalid query parameters"),
        (status = 500, description = "Internal server error")
    ),
    params(ListFilesPayload),
)]
pub(in crate::app::server) async fn list_files(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
    Query(params): Query<ListFilesPayload>,
) -> Result<Json<Vec<FileDisplay>>, StowageError> {
    let params = ListFiles::try_from(params)?;

    let files = services.file.list(&user, params).await?;

    Ok(Json(
        files
            .into_iter()
            .map(|file| services.file.display(file))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/files/{id}",
    responses(
        (status = 200, description = "Get file by id", body = FileDisplay),
        (status = 403, description = "File not accessible to the caller"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "File ID")
    )
)]
pub(in crate::app::server) async fn get_file(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<Json<FileDisplay>, StowageError> {
    let file = services.file.get(&user, id).await?;
    Ok(Json(services.file.display(file)))
}

#[utoipa::path(
    post,
    path = "/files",
    responses(
        (status = 200, description = "Upload files", body = UploadResult),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    ),
    request_body = axum::extract::Multipart
)]
pub(in crate::app::server) async fn upload_files(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
    mut form: axum::extract::Multipart,
) -> Result<Json<UploadResult>, StowageError> {
    let mut files = vec![];
    let mut errors = HashMap::<String, Vec<String>>::new();

    while let Some(field) = map_err!(form.next_field().await) {
        let Some(name) = field.file_name() else {
            continue;
        };

        let name = name.to_string();

        let content = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("error in form: {e}");
                errors.entry(name).or_default().push(e.body_text());
                continue;
            }
        };

        let upload = FileUpload::new(name.clone(), &content);

        match services.file.upload(&user, upload).await {
            Ok(file) => files.push(services.file.display(file)),
            Err(e) => {
                e.print();
                let message = if e.status().is_server_error() {
                    "Internal".to_string()
                } else {
                    e.error.to_string()
                };
                errors.entry(name).or_default().push(message);
            }
        }
    }

    Ok(Json(UploadResult { files, errors }))
}

#[utoipa::path(
    put,
    path = "/files/{id}/name",
    responses(
        (status = 200, description = "Rename a file", body = FileDisplay),
        (status = 403, description = "Caller does not own the file"),
        (status = 404, description = "File not found"),
        (status = 422, description = "Invalid name"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body = FileRename
)]
pub(in crate::app::server) async fn rename_file(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<FileRename>,
) -> Result<Json<FileDisplay>, StowageError> {
    let file = services.file.rename(&user, id, params).await?;
    Ok(Json(services.file.display(file)))
}

#[utoipa::path(
    put,
    path = "/files/{id}/sharing",
    responses(
        (status = 200, description = "Replace the collaborators of a file", body = FileDisplay),
        (status = 403, description = "Caller does not own the file"),
        (status = 404, description = "File not found"),
        (status = 422, description = "Invalid emails"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "File ID")
    ),
    request_body = FileShare
)]
pub(in crate::app::server) async fn share_file(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(params): Json<FileShare>,
) -> Result<Json<FileDisplay>, StowageError> {
    let file = services.file.update_sharing(&user, id, params).await?;
    Ok(Json(services.file.display(file)))
}

#[utoipa::path(
    delete,
    path = "/files/{id}",
    responses(
        (status = 204, description = "Delete file by id"),
        (status = 403, description = "Caller does not own the file"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "File ID")
    )
)]
pub(in crate::app::server) async fn delete_file(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StowageError> {
    services.file.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/files/{id}/view",
    responses(
        (status = 200, description = "File content, displayed inline"),
        (status = 403, description = "File not accessible to the caller"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "File ID")
    )
)]
pub(in crate::app::server) async fn view_file(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StowageError> {
    let (file, content) = services.file.download(&user, id).await?;
    Ok(content_response(&file, Disposition::Inline, content))
}

#[utoipa::path(
    get,
    path = "/files/{id}/download",
    responses(
        (status = 200, description = "File content, as an attachment"),
        (status = 403, description = "File not accessible to the caller"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = Uuid, Path, description = "File ID")
    )
)]
pub(in crate::app::server) async fn download_file(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StowageError> {
    let (file, content) = services.file.download(&user, id).await?;
    Ok(content_response(&file, Disposition::Attachment, content))
}

#[utoipa::path(
    get,
    path = "/quota",
    responses(
        (status = 200, description = "Storage usage of the caller", body = QuotaSummary),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub(in crate::app::server) async fn quota(
    services: State<ServiceState>,
    Extension(user): Extension<User>,
) -> Result<Json<QuotaSummary>, StowageError> {
    Ok(Json(services.file.quota(&user).await?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Inline,
    Attachment,
}

/// Builds the headers for serving file content. Types a browser would execute
/// are always sent as attachments.
fn content_response(file: &File, disposition: Disposition, content: Vec<u8>) -> impl IntoResponse {
    let disposition = match disposition {
        Disposition::Inline if !is_active(&file.extension) => "inline",
        _ => "attachment",
    };

    (
        [
            (header::CONTENT_TYPE, content_type(&file.extension).to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(disposition, &file.name),
            ),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
            (header::CONTENT_SECURITY_POLICY, "sandbox".to_string()),
        ],
        content,
    )
}

/// `filename` carries an ASCII fallback, `filename*` the UTF-8 name (RFC 6266).
fn content_disposition(disposition: &str, name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "{disposition}; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(name)
    )
}

/// Content a browser renders with scripting.
fn is_active(extension: &str) -> bool {
    matches!(
        extension,
        "html" | "htm" | "svg" | "xhtml" | "xml" | "js" | "mjs"
    )
}

fn content_type(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "txt" | "md" => "text/plain; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "csv" => "text/csv",
        "json" => "application/json",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}
