use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::validation::validated;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::question::{QuestionCreate, QuestionResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(create_question))
}

async fn create_question(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    let payload = validated(payload)?;
    payload.check_shape().map_err(ApiError::BadRequest)?;

    let options: Vec<String> =
        payload.options.iter().map(|option| option.trim().to_string()).collect();

    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            question_type: payload.question_type,
            question_text: payload.question_text.trim(),
            difficulty: payload.difficulty,
            options: &options,
            correct_option: payload.correct_option,
            created_by: &caller.principal_id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    tracing::debug!(question_id = question.question.id, "Created question");
    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}
