/// Users API routes
use crate::{
    error::{Result, ServerError},
    extract::JsonBody,
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use dharma_core::{UpdateUser, User, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}

/// POST /api/users/authenticate
pub async fn authenticate(
    State(app_state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> Result<Json<AuthResponse>> {
    let user = app_state
        .gateway
        .authenticate(&request.email, &request.password)
        .await?;
    let access_token = app_state.auth_service.create_access_token(&user)?;

    tracing::info!(user = %user.id, "User authenticated");
    Ok(Json(AuthResponse { user, access_token }))
}

/// POST /api/users/register
pub async fn register(
    State(app_state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = app_state
        .gateway
        .register(&request.email, &request.password)
        .await?;

    tracing::info!(user = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/users
pub async fn list_users(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<User>>> {
    auth.require_admin()?;
    Ok(Json(app_state.gateway.list_users().await?))
}

/// PUT /api/users/:id
pub async fn update_user(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(update): JsonBody<UpdateUser>,
) -> Result<Json<User>> {
    let user_id = UserId::new(id);
    auth.require_self_or_admin(user_id)?;
    if update.is_admin.is_some() && !auth.is_admin {
        return Err(ServerError::Forbidden(
            "Only admins can change admin status".to_string(),
        ));
    }

    let user = app_state.gateway.update_user(user_id, update).await?;
    Ok(Json(user))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    Path(id): Path<i64>,
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<serde_json::Value>> {
    auth.require_admin()?;
    let user_id = UserId::new(id);
    app_state.gateway.delete_user(user_id).await?;

    tracing::info!(user = %user_id, by = %auth.user_id, "User deleted");
    Ok(Json(serde_json::json!({ "success": true })))
}
