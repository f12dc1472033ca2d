use super::api::ApiDoc;
use crate::app::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower_http::{classify::ServerErrorsFailureClass, cors::CorsLayer, trace::TraceLayer};
use tracing::Span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub(super) mod file;
pub(super) mod user;

/// How many files of the maximum size a single upload request may carry.
const MAX_FILES_PER_UPLOAD: usize = 10;

pub fn router(state: AppState, origins: Vec<String>) -> Router {
    let origins = origins
        .into_iter()
        .map(|origin| {
            tracing::info!("Adding {origin} to allowed origins");
            HeaderValue::from_str(&origin)
        })
        .map(Result::unwrap);

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::list(origins))
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::PUT]);

    use file::*;
    use user::*;

    let body_limit = state
        .max_upload_size
        .saturating_mul(MAX_FILES_PER_UPLOAD);

    let public = Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/verify", post(verify))
        .with_state(state.services.clone());

    let protected = Router::new()
        .route("/files", get(list_files))
        .route("/files", post(upload_files))
        .layer(DefaultBodyLimit::max(body_limit))
        .route("/files/:id", get(get_file))
        .route("/files/:id", delete(delete_file))
        .route("/files/:id/name", put(rename_file))
        .route("/files/:id/sharing", put(share_file))
        .route("/files/:id/view", get(view_file))
        .route("/files/:id/download", get(download_file))
        .route("/quota", get(quota))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/me", get(me))
        .with_state(state.services.clone())
        .layer(axum::middleware::from_fn_with_state(
            state.services.user.clone(),
            crate::app::auth::auth_check,
        ));

    public
        .merge(protected)
        .layer(
            TraceLayer::new_for_http()
                .on_request(|req: &axum::http::Request<_>, _span: &Span| {
                    let ctype = req
                        .headers()
                        .get("content-type")
                        .map(|v| v.to_str().unwrap_or("none"))
                        .unwrap_or("none");

                    tracing::info!(
                        "Processing request | {} {} | content-type: {ctype}",
                        req.method(),
                        req.uri().path()
                    );
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                        let status = res.status();
                        let ctype = res
                            .headers()
                            .get("content-type")
                            .map(|v| v.to_str().unwrap_or("none"))
                            .unwrap_or("none");

                        tracing::info!(
                            "Sending response | {status} | {}ms | {ctype}",
                            latency.as_millis()
                        );
                    },
                )
                .on_failure(
                    |error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                        tracing::error!("Error in request: {error}")
                    },
                ),
        )
        .layer(cors)
        // Unprotected at all times
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Has to go last to exclude all the tracing/cors layers
        .route("/_health", get(health_check))
}

async fn health_check() -> impl IntoResponse {
    "OK"
}
