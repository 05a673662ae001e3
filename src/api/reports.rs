use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::require_positive_id;
use crate::core::state::AppState;
use crate::db::models::{ParticipationRow, TestScoreRow};
use crate::repositories;
use crate::schemas::report::ReportResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/tests/:test_id/scores", get(test_scores))
        .route("/participation", get(participation_ranking))
}

async fn test_scores(
    Path(test_id): Path<i64>,
    State(state): State<AppState>,
    CurrentAdmin(caller): CurrentAdmin,
) -> Result<Json<ReportResponse<TestScoreRow>>, ApiError> {
    let test_id = require_positive_id("test_id", test_id)?;
    let data = repositories::reports::test_scores(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch test scores"))?;

    Ok(Json(ReportResponse { requested_by: caller.principal_id, data }))
}

async fn participation_ranking(
    State(state): State<AppState>,
    CurrentAdmin(caller): CurrentAdmin,
) -> Result<Json<ReportResponse<ParticipationRow>>, ApiError> {
    let data = repositories::reports::participation_ranking(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch participation ranking"))?;

    Ok(Json(ReportResponse { requested_by: caller.principal_id, data }))
}
