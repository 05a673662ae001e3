use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::validation::{require_positive_id, validated};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db;
use crate::repositories;
use crate::schemas::answer::AnswerBatch;

#[derive(Debug, Serialize)]
struct AnswersStored {
    stored: u64,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_answers))
}

async fn submit_answers(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Json(batch): Json<AnswerBatch>,
) -> Result<(StatusCode, Json<AnswersStored>), ApiError> {
    let batch = validated(batch)?;

    let mut rows = Vec::with_capacity(batch.answers.len());
    for answer in &batch.answers {
        rows.push(repositories::answers::CreateAnswer {
            test_id: require_positive_id("test_id", answer.test_id)?,
            student_id: require_positive_id("student_id", answer.student_id)?,
            question_id: require_positive_id("question_id", answer.question_id)?,
            selected: answer.selected.trim(),
        });
    }

    let stored = repositories::answers::create_many(state.db(), &rows, primitive_now_utc())
        .await
        .map_err(answer_write_error)?;

    tracing::info!(submitted_by = %caller.principal_id, stored, "Stored answers");
    Ok((StatusCode::CREATED, Json(AnswersStored { stored })))
}

fn answer_write_error(err: sqlx::Error) -> ApiError {
    if db::is_unique_violation(&err) {
        return ApiError::Conflict("Answer already submitted for this question".to_string());
    }
    if db::is_foreign_key_violation(&err) {
        return ApiError::NotFound("Referenced test or student not found".to_string());
    }
    ApiError::internal(err, "Failed to store answers")
}
