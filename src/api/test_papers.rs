use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::{require_owner, CurrentStaff};
use crate::api::validation::{require_positive_id, validated};
use crate::core::cache;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Test;
use crate::repositories;
use crate::schemas::college::{CollegeResponse, CollegesQuery, CollegesResponse, StatesResponse};
use crate::schemas::test::{
    AttachQuestionsRequest, AttachQuestionsResponse, SendTestRequest, SendTestResponse, TestCreate,
    TestResponse,
};
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_test))
        .route("/send", post(send_test))
        .route("/states", get(list_states))
        .route("/colleges", get(list_colleges))
        .route("/:test_id", delete(delete_test))
        .route("/:test_id/questions", post(attach_questions))
}

async fn load_test(state: &AppState, test_id: i64) -> Result<Test, ApiError> {
    repositories::test_papers::find_by_id(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load test"))?
        .ok_or_else(|| ApiError::NotFound("Test not found".to_string()))
}

async fn create_test(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Json(payload): Json<TestCreate>,
) -> Result<(StatusCode, Json<TestResponse>), ApiError> {
    let payload = validated(payload)?;

    let test = repositories::test_papers::create(
        state.db(),
        repositories::test_papers::CreateTest {
            test_name: payload.test_name.trim(),
            user_id: &caller.principal_id,
            min_questions: payload.min_questions,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create test"))?;

    tracing::info!(test_id = test.id, owner_id = %caller.principal_id, "Created test");
    Ok((StatusCode::CREATED, Json(TestResponse::from_db(test))))
}

async fn attach_questions(
    Path(test_id): Path<i64>,
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Json(payload): Json<AttachQuestionsRequest>,
) -> Result<Json<AttachQuestionsResponse>, ApiError> {
    let payload = validated(payload)?;
    let test = load_test(&state, test_id).await?;
    require_owner(&caller, &test.user_id, "Not allowed to modify this test")?;

    let attached =
        repositories::test_papers::attach_questions(state.db(), test.id, &payload.question_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to attach questions"))?;
    let total_questions = repositories::test_papers::count_questions(state.db(), test.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;

    Ok(Json(AttachQuestionsResponse { attached, total_questions }))
}

async fn send_test(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Json(payload): Json<SendTestRequest>,
) -> Result<Json<SendTestResponse>, ApiError> {
    let payload = validated(payload)?;
    let test_id = require_positive_id("test_id", payload.test_id)?;
    let college_id = require_positive_id("college_id", payload.college_id)?;

    let test = load_test(&state, test_id).await?;
    require_owner(&caller, &test.user_id, "Not allowed to send this test")?;

    let college = repositories::colleges::find_in_state(state.db(), college_id, &payload.state)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load college"))?
        .ok_or_else(|| ApiError::NotFound("College not found in given state".to_string()))?;

    let question_count = repositories::test_papers::count_questions(state.db(), test.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count questions"))?;
    if question_count < i64::from(test.min_questions) {
        return Err(ApiError::BadRequest(format!(
            "Test has {question_count} questions but requires at least {}",
            test.min_questions
        )));
    }

    let assigned = repositories::assignments::assign_to_college(
        state.db(),
        test.id,
        college.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to assign test"))?;

    tracing::info!(test_id = test.id, college_id = college.id, assigned, "Sent test to college");
    Ok(Json(SendTestResponse { message: "Test sent successfully".to_string(), assigned }))
}

async fn delete_test(
    Path(test_id): Path<i64>,
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
) -> Result<Json<MessageResponse>, ApiError> {
    let test_id = require_positive_id("test_id", test_id)?;
    let test = load_test(&state, test_id).await?;
    require_owner(&caller, &test.user_id, "You are not allowed to delete this test")?;

    let removed = repositories::test_papers::delete(state.db(), test.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete test"))?;
    if !removed {
        return Err(ApiError::NotFound("Test not found".to_string()));
    }

    if let Err(err) = cache::invalidate_results(state.cache().as_ref(), test.id).await {
        tracing::warn!(error = %err, test_id = test.id, "Failed to invalidate cached results");
    }

    tracing::info!(test_id = test.id, deleted_by = %caller.principal_id, "Deleted test");
    Ok(Json(MessageResponse::new("Test deleted successfully")))
}

async fn list_states(
    State(state): State<AppState>,
    CurrentStaff(_caller): CurrentStaff,
) -> Result<Json<StatesResponse>, ApiError> {
    let states = repositories::colleges::list_states(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch states"))?;
    Ok(Json(StatesResponse { states }))
}

async fn list_colleges(
    State(state): State<AppState>,
    CurrentStaff(_caller): CurrentStaff,
    Query(query): Query<CollegesQuery>,
) -> Result<Json<CollegesResponse>, ApiError> {
    let state_name = query.state.trim();
    if state_name.is_empty() {
        return Err(ApiError::BadRequest("State is required".to_string()));
    }

    let colleges = repositories::colleges::list_in_state(state.db(), state_name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch colleges"))?;
    Ok(Json(CollegesResponse {
        colleges: colleges.into_iter().map(CollegeResponse::from_db).collect(),
    }))
}
