use crate::core::service::user::UserService;
use axum::{extract::Request, middleware::Next, response::Response};
use axum::{http::StatusCode, response::IntoResponse};
use axum_macros::debug_middleware;
use sqlx::PgPool;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "stowage_session";

/// Raw session token of the authenticated request, available to handlers
/// through request extensions.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Resolve the session from the `stowage_session` cookie, or from a bearer token if the
/// cookie is missing. On success the [User][crate::core::model::user::User] and the
/// [SessionToken] are inserted into the request extensions.
#[debug_middleware]
pub async fn auth_check(
    users: axum::extract::State<UserService<PgPool>>,
    cookies: axum_extra::extract::cookie::CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match cookies.get(SESSION_COOKIE) {
        Some(token) => token.value().to_string(),
        None => {
            tracing::debug!("No session cookie found, checking authorization header");

            let Some(header) = request.headers().get("Authorization") else {
                tracing::debug!("No authorization header found");
                return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
            };

            let header = match header.to_str() {
                Ok(header) => header,
                Err(e) => {
                    tracing::error!("Invalid header: {e}");
                    return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
                }
            };

            let Some(token) = header.strip_prefix("Bearer ") else {
                tracing::error!("Invalid authorization header");
                return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
            };

            token.to_string()
        }
    };

    let user = match users.current_user(&token).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(SessionToken(token));

    next.run(request).await
}
