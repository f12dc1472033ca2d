use super::{StowageErr, StowageError};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

impl StowageError {
    pub fn status(&self) -> StatusCode {
        use StatusCode as SC;
        use StowageErr as E;
        match self.error {
            E::Unauthorized => SC::UNAUTHORIZED,
            E::Forbidden(_) => SC::FORBIDDEN,
            E::DoesNotExist(_) => SC::NOT_FOUND,
            E::AlreadyExists(_) => SC::CONFLICT,
            E::PayloadTooLarge(_) => SC::PAYLOAD_TOO_LARGE,
            E::Validation(_) | E::InvalidFileName(_) | E::ParseSort(_) => SC::UNPROCESSABLE_ENTITY,
            E::Multipart(ref e) => e.status(),
            E::IO(_) | E::Sqlx(_) => SC::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response wrapper.
#[derive(Debug, Serialize)]
struct ResponseError<T: Serialize> {
    error_type: ErrorType,
    body: T,
}

impl<T> ResponseError<T>
where
    T: Serialize,
{
    pub fn new(error_type: ErrorType, body: T) -> Self {
        Self { error_type, body }
    }
}

#[derive(Debug, Serialize)]
enum ErrorType {
    Internal,
    Api,
}

impl<T> IntoResponse for ResponseError<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        <Json<ResponseError<T>> as IntoResponse>::into_response(Json(self))
    }
}

/// Body returned when the caller is authenticated but is not allowed to touch a file.
/// Kept apart from [ResponseError] so clients can tell a refused operation from a failed one.
#[derive(Debug, Serialize)]
struct PermissionDenied {
    status: &'static str,
    message: String,
}

impl IntoResponse for StowageError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        self.print();

        use ErrorType as ET;
        use StowageErr as SE;

        match self.error {
            SE::Forbidden(message) => (
                status,
                Json(PermissionDenied {
                    status: "error",
                    message,
                }),
            )
                .into_response(),

            SE::Unauthorized => (
                status,
                ResponseError::new(ET::Api, "Unauthorized".to_string()),
            )
                .into_response(),

            SE::DoesNotExist(e)
            | SE::AlreadyExists(e)
            | SE::InvalidFileName(e)
            | SE::PayloadTooLarge(e)
            | SE::ParseSort(e) => (status, ResponseError::new(ET::Api, e)).into_response(),

            SE::Validation(errors) => (status, ResponseError::new(ET::Api, errors)).into_response(),

            SE::Multipart(e) => (status, ResponseError::new(ET::Api, e.body_text())).into_response(),

            SE::IO(_) | SE::Sqlx(_) => (
                status,
                ResponseError::new(ET::Internal, "Internal".to_string()),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{err, error::StowageError};
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::{json, Value};

    async fn body_json(e: StowageError) -> (StatusCode, Value) {
        let response = e.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn forbidden() -> Result<(), StowageError> {
        err!(Forbidden, "not the owner of {}", "foo.txt")
    }

    #[test]
    fn permission_errors_are_distinct_from_internal_ones() {
        let e = forbidden().unwrap_err();
        assert_eq!(StatusCode::FORBIDDEN, e.status());
        assert_eq!(StatusCode::FORBIDDEN, e.into_response().status());

        let io = StowageError::new(
            file!(),
            line!(),
            column!(),
            std::io::Error::other("disk on fire").into(),
        );
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, io.status());
    }

    #[test]
    fn located_errors_report_their_call_site() {
        let e = forbidden().unwrap_err();
        assert!(e.location().starts_with(file!()));
    }

    #[tokio::test]
    async fn permission_errors_carry_a_structured_body() {
        let (status, body) = body_json(forbidden().unwrap_err()).await;

        assert_eq!(StatusCode::FORBIDDEN, status);
        assert_eq!(
            json!({ "status": "error", "message": "not the owner of foo.txt" }),
            body
        );
    }

    #[tokio::test]
    async fn backend_errors_stay_opaque() {
        let io = StowageError::new(
            file!(),
            line!(),
            column!(),
            std::io::Error::other("disk on fire").into(),
        );

        let (status, body) = body_json(io).await;

        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
        assert_eq!(json!({ "error_type": "Internal", "body": "Internal" }), body);
        assert!(!body.to_string().contains("disk on fire"));
    }
}
