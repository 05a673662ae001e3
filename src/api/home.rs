use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::core::state::AppState;
use crate::services::dashboard::{HomeStats, TeacherStats};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/stats", get(home_stats)).route("/teacher/stats", get(teacher_stats))
}

async fn home_stats(
    State(state): State<AppState>,
    CurrentStaff(_caller): CurrentStaff,
) -> Result<Json<HomeStats>, ApiError> {
    let stats = state
        .dashboard()
        .home_stats()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load dashboard stats"))?;
    Ok(Json(stats))
}

async fn teacher_stats(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
) -> Result<Json<TeacherStats>, ApiError> {
    let stats = state
        .dashboard()
        .teacher_stats(&caller.principal_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load teacher stats"))?;
    Ok(Json(stats))
}
