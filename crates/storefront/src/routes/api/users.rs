//! User API handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use tracing::instrument;

use kedai_core::UserId;

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::models::{User, UserChangesRequest};
use crate::routes::AppJson;
use crate::state::AppState;

/// `{message, user}` response body.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: &'static str,
    pub user: User,
}

/// List all users.
///
/// # Errors
///
/// Returns 500 if the query fails.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

/// Update a user's username, email or role.
///
/// # Errors
///
/// Returns 400 for invalid fields, 404 if the user doesn't exist, 409 if the
/// username or email is taken.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    AppJson(request): AppJson<UserChangesRequest>,
) -> Result<Json<UserResponse>> {
    let changes = request.validate()?;
    let user = UserRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("User"),
            other => other.into(),
        })?;

    Ok(Json(UserResponse {
        message: "User updated",
        user,
    }))
}
