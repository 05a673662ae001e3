use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::validation::validated;
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::auth::{LoginRequest, RegisterRequest, TokenResponse};
use crate::schemas::user::ProfileResponse;
use crate::schemas::MessageResponse;
use crate::services::sessions::{bearer_token, SessionError};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/register", post(register))
}

fn presented_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(SessionError::MissingCredentials)?;
    Ok(bearer_token(value)?)
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let payload = validated(payload)?;

    let principal = state.sessions().authenticate(&payload.email, &payload.password).await?;
    let tokens = state.sessions().issue_tokens(&principal).await?;

    Ok(Json(tokens.into()))
}

async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = presented_token(&headers)?;
    let tokens = state.sessions().refresh(token).await?;
    Ok(Json(tokens.into()))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let token = presented_token(&headers)?;
    state.sessions().revoke(token).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

async fn register(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let payload = validated(payload)?;

    if !caller.role.can_register(payload.role) {
        return Err(ApiError::Forbidden("Teachers may only register students"));
    }

    let exists = repositories::users::exists_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if exists {
        return Err(ApiError::Conflict("User with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;
    let now = primitive_now_utc();
    let user_id = Uuid::new_v4().to_string();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let user = repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            id: &user_id,
            name: payload.name.trim(),
            email: &payload.email,
            hashed_password,
            role: payload.role,
            college_id: payload.college_id,
            secondary_email: payload.secondary_email.as_deref(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            ApiError::Conflict("User with this email already exists".to_string())
        } else if db::is_foreign_key_violation(&e) {
            ApiError::NotFound("College not found".to_string())
        } else {
            ApiError::internal(e, "Failed to create user")
        }
    })?;

    if payload.role == UserRole::Student {
        repositories::students::create(
            &mut *tx,
            repositories::students::CreateStudent {
                user_id: &user.id,
                branch: payload.branch.as_deref().unwrap_or_default(),
                gender: payload.gender.as_deref().unwrap_or_default(),
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create student profile"))?;
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit registration"))?;

    tracing::info!(
        registered_by = %caller.principal_id,
        user_id = %user.id,
        role = user.role.as_str(),
        "Registered user"
    );

    Ok((StatusCode::CREATED, Json(ProfileResponse::from_db(user))))
}
