//! Login, signup and "who am I" endpoints.
//!
//! Bodies are extracted as `Option<Json<_>>` so a missing or unparsable body is
//! answered with the same generic 400 as missing fields.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;
use std::sync::Arc;

use super::{
    principal::bearer_token,
    types::{IdentitySummary, LoginRequest, SignupRequest, TokenResponse},
};
use crate::auth::{AuthError, AuthService, Registration};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "auth"
)]
pub async fn login(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::InvalidInput("missing request body"));
    };

    let token = auth
        .login(&request.email, &SecretString::from(request.password))
        .await?;

    Ok((StatusCode::OK, Json(TokenResponse { token })))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Identity created", body = TokenResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 500, description = "Identity could not be created"),
    ),
    tag = "auth"
)]
pub async fn signup(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<SignupRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::InvalidInput("missing request body"));
    };

    let profile = request.profile();
    let token = auth
        .signup(Registration {
            email: request.email,
            password: SecretString::from(request.password),
            profile,
        })
        .await?;

    Ok((StatusCode::OK, Json(TokenResponse { token })))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated identity", body = IdentitySummary),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Token subject no longer exists"),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(
    headers: HeaderMap,
    auth: Extension<Arc<AuthService>>,
) -> Result<impl IntoResponse, AuthError> {
    let token = bearer_token(&headers).ok_or(AuthError::Unauthenticated)?;
    let identity = auth.current_user(token).await?;
    Ok(Json(IdentitySummary::from(identity)))
}
