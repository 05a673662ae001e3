use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::types::UserRole;
use crate::services::sessions::AuthContext;

/// Any authenticated principal.
pub(crate) struct CurrentPrincipal(pub(crate) AuthContext);

/// An authenticated admin or teacher.
pub(crate) struct CurrentStaff(pub(crate) AuthContext);

pub(crate) struct CurrentAdmin(pub(crate) AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for CurrentPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header =
            parts.headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok());

        let context = state.sessions().authorize(auth_header).await?;
        Ok(CurrentPrincipal(context))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStaff {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentPrincipal(context) = CurrentPrincipal::from_request_parts(parts, state).await?;

        if is_staff(context.role) {
            Ok(CurrentStaff(context))
        } else {
            Err(ApiError::Forbidden("Access denied"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentPrincipal(context) = CurrentPrincipal::from_request_parts(parts, state).await?;

        if context.role == UserRole::Admin {
            Ok(CurrentAdmin(context))
        } else {
            Err(ApiError::Forbidden("Unauthorized access"))
        }
    }
}

pub(crate) fn is_staff(role: UserRole) -> bool {
    match role {
        UserRole::Admin | UserRole::Teacher => true,
        UserRole::Student => false,
    }
}

/// Admins may act on any test; teachers only on the ones they own.
pub(crate) fn require_owner(
    context: &AuthContext,
    owner_id: &str,
    denied: &'static str,
) -> Result<(), ApiError> {
    match context.role {
        UserRole::Admin => Ok(()),
        UserRole::Teacher if context.principal_id == owner_id => Ok(()),
        UserRole::Teacher | UserRole::Student => Err(ApiError::Forbidden(denied)),
    }
}
