//! User management endpoints.
//!
//! Updates are allowed for the owner or an administrator; deletes are
//! administrator only.

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::info;

use super::{
    principal::bearer_token,
    types::{IdentitySummary, MessageResponse, UpdateUserRequest},
};
use crate::auth::{AuthError, AuthService, ProfileChanges, Requirement};

#[utoipa::path(
    put,
    path = "/api/user/update/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated identity", body = IdentitySummary),
        (status = 400, description = "Invalid or empty update"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is neither the owner nor an administrator"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_user(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<UpdateUserRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    // A 401 takes precedence over a malformed id.
    let claims = auth.authenticate(bearer_token(&headers))?;
    let id = parse_user_id(&id)?;
    auth.authorize(Some(&claims), Requirement::SelfOrAdmin(id)).into_result()?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::InvalidInput("missing or invalid request body"));
    };

    let profile = request.profile();
    let identity = auth
        .update_user(
            id,
            ProfileChanges {
                email: request.email,
                password: request.password.map(SecretString::from),
                profile,
            },
        )
        .await?;

    info!(caller = claims.subject_id, user_id = id, "profile updated");
    Ok(Json(IdentitySummary::from(identity)))
}

#[utoipa::path(
    delete,
    path = "/api/user/delete/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_user(
    Path(id): Path<String>,
    headers: HeaderMap,
    auth: Extension<Arc<AuthService>>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = auth.gate(bearer_token(&headers), Requirement::AdminOnly)?;
    let id = parse_user_id(&id)?;
    auth.delete_user(id).await?;

    info!(caller = claims.subject_id, user_id = id, "user deleted by administrator");
    Ok(Json(MessageResponse {
        message: "User deleted.".to_string(),
    }))
}

fn parse_user_id(raw: &str) -> Result<i64, AuthError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AuthError::InvalidInput("user id must be an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_user_id_accepts_integers_only() {
        assert_eq!(parse_user_id("42").ok(), Some(42));
        assert_eq!(parse_user_id(" 7 ").ok(), Some(7));
        for raw in ["abc", "", "1.5", "99999999999999999999"] {
            assert!(matches!(parse_user_id(raw), Err(AuthError::InvalidInput(_))));
        }
    }
}
