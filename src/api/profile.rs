use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentPrincipal;
use crate::api::validation::validated;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::user::{PasswordChangeRequest, ProfileResponse};
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(profile)).route("/password", put(change_password))
}

async fn profile(
    State(state): State<AppState>,
    CurrentPrincipal(caller): CurrentPrincipal,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = repositories::users::find_by_id(state.db(), &caller.principal_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load profile"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse::from_db(user)))
}

async fn change_password(
    State(state): State<AppState>,
    CurrentPrincipal(caller): CurrentPrincipal,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let payload = validated(payload)?;

    let user = repositories::users::find_by_id(state.db(), &caller.principal_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load profile"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let matches = security::verify_password(&payload.current_password, &user.hashed_password)
        .map_err(|e| ApiError::internal(e, "Failed to verify password"))?;
    if !matches {
        return Err(ApiError::BadRequest("Current password is incorrect".to_string()));
    }

    let hashed = security::hash_password(&payload.new_password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    repositories::users::update_password(state.db(), &user.id, &hashed, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update password"))?;

    tracing::info!(principal_id = %user.id, "Password changed");
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
