use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{require_owner, CurrentStaff};
use crate::api::pagination::PageWindow;
use crate::api::validation::{require_positive_id, validated};
use crate::core::cache;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::result::{ResultsPage, ResultsQuery, ScoreRequest, ScoreResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(score_test).get(list_results))
}

async fn score_test(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Json(payload): Json<ScoreRequest>,
) -> Result<(StatusCode, Json<ScoreResponse>), ApiError> {
    let payload = validated(payload)?;
    let test_id = require_positive_id("test_id", payload.test_id)?;

    let report = state.scorer().score(test_id, payload.user_id.trim()).await?;

    tracing::info!(
        scored_by = %caller.principal_id,
        test_id,
        user_id = %report.result.user_id,
        score = report.result.score,
        "Scored test"
    );
    Ok((StatusCode::CREATED, Json(report.into())))
}

async fn list_results(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<ResultsPage>, ApiError> {
    let test_id = require_positive_id("test_id", query.test_id)?;
    let window = PageWindow::new(query.page, query.limit);

    let test = repositories::test_papers::find_by_id(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))?;
    require_owner(&caller, &test.user_id, "Not allowed to view results for this test")?;

    // The generation is read before the database so a page built from rows
    // that predate a new result lands under the retired generation.
    let key = match cache::results_version(state.cache().as_ref(), test_id).await {
        Ok(version) => {
            Some(cache::results_cache_key(test_id, version, window.page, window.limit))
        }
        Err(err) => {
            tracing::warn!(error = %err, "Results cache lookup failed");
            None
        }
    };

    if let Some(key) = &key {
        match state.cache().get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<ResultsPage>(&raw) {
                Ok(page) => return Ok(Json(page)),
                Err(err) => {
                    tracing::warn!(error = %err, key = %key, "Discarding unreadable cached results")
                }
            },
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "Results cache lookup failed"),
        }
    }

    let total = repositories::results::count_for_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count results"))?;
    let results =
        repositories::results::list_enriched(state.db(), test_id, window.offset(), window.limit)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load results"))?;

    let page = ResultsPage {
        results,
        total,
        page: window.page,
        limit: window.limit,
        total_pages: window.total_pages(total),
    };

    let Some(key) = key else {
        return Ok(Json(page));
    };
    let ttl = Duration::from_secs(state.settings().limits().results_cache_ttl_seconds);
    match serde_json::to_string(&page) {
        Ok(raw) => {
            if let Err(err) = state.cache().set_with_ttl(&key, &raw, ttl).await {
                tracing::warn!(error = %err, "Failed to cache results page");
            }
        }
        Err(err) => tracing::warn!(error = %err, "Failed to serialize results page"),
    }

    Ok(Json(page))
}
