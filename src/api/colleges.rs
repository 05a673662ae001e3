use axum::{extract::State, http::StatusCode, routing::post, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStaff;
use crate::api::validation::validated;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::college::{CollegeCreate, CollegeResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(create_college))
}

async fn create_college(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    Json(payload): Json<CollegeCreate>,
) -> Result<(StatusCode, Json<CollegeResponse>), ApiError> {
    let payload = validated(payload)?;
    let name = payload.name.trim();
    let state_name = payload.state.trim();
    if name.is_empty() || state_name.is_empty() {
        return Err(ApiError::BadRequest("name and state must not be blank".to_string()));
    }

    let college = repositories::colleges::create(
        state.db(),
        repositories::colleges::CreateCollege {
            name,
            description: payload.description.trim(),
            state: state_name,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create college"))?;

    tracing::info!(college_id = college.id, created_by = %caller.principal_id, "Created college");
    Ok((StatusCode::CREATED, Json(CollegeResponse::from_db(college))))
}
