use crate::{
    app::{
        auth::{SessionToken, SESSION_COOKIE},
        server::dto::{AccountResponse, SessionResponse, VerifyPayload},
        state::ServiceState,
    },
    core::{
        model::user::User,
        service::user::dto::{SignIn, SignUp},
    },
    error::StowageError,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;

#[utoipa::path(
    post,
    path = "/auth/sign-up",
    responses(
        (status = 200, description = "Create an account if needed and send a sign in code", body = AccountResponse),
        (status = 422, description = "Invalid name or email"),
        (status = 500, description = "Internal server error")
    ),
    request_body = SignUp
)]
pub(in crate::app::server) async fn sign_up(
    services: State<ServiceState>,
    Json(params): Json<SignUp>,
) -> Result<Json<AccountResponse>, StowageError> {
    let account_id = services.user.sign_up(params).await?;
    Ok(Json(AccountResponse { account_id }))
}

#[utoipa::path(
    post,
    path = "/auth/sign-in",
    responses(
        (status = 200, description = "Send a sign in code to an existing user", body = AccountResponse),
        (status = 404, description = "No user with the email"),
        (status = 422, description = "Invalid email"),
        (status = 500, description = "Internal server error")
    ),
    request_body = SignIn
)]
pub(in crate::app::server) async fn sign_in(
    services: State<ServiceState>,
    Json(params): Json<SignIn>,
) -> Result<Json<AccountResponse>, StowageError> {
    let account_id = services.user.sign_in(params).await?;
    Ok(Json(AccountResponse { account_id }))
}

#[utoipa::path(
    post,
    path = "/auth/verify",
    responses(
        (status = 200, description = "Exchange a sign in code for a session cookie", body = SessionResponse),
        (status = 401, description = "Wrong or expired code"),
        (status = 500, description = "Internal server error")
    ),
    request_body = VerifyPayload
)]
pub(in crate::app::server) async fn verify(
    services: State<ServiceState>,
    jar: CookieJar,
    Json(params): Json<VerifyPayload>,
) -> Result<(CookieJar, Json<SessionResponse>), StowageError> {
    let session = services
        .user
        .verify_otp(params.account_id, &params.code)
        .await?;

    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);

    let cookie = Cookie::build((SESSION_COOKIE, session.token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(cookie::time::Duration::seconds(max_age));

    Ok((
        jar.add(cookie),
        Json(SessionResponse {
            user_id: session.user_id,
            expires_at: session.expires_at,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses(
        (status = 204, description = "End the current session"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    )
)]
pub(in crate::app::server) async fn sign_out(
    services: State<ServiceState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), StowageError> {
    services.user.sign_out(&token).await?;
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Unauthorized")
    )
)]
pub(in crate::app::server) async fn me(Extension(user): Extension<User>) -> Json<User> {
    Json(user)
}
