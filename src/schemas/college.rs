use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::College;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CollegeCreate {
    #[validate(length(min = 1, max = 200, message = "name must be 1..200 characters"))]
    pub(crate) name: String,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub(crate) description: String,
    #[validate(length(min = 1, max = 100, message = "state must be 1..100 characters"))]
    pub(crate) state: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CollegeResponse {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) state: String,
    pub(crate) active_candidates: i32,
}

impl CollegeResponse {
    pub(crate) fn from_db(college: College) -> Self {
        Self {
            id: college.id,
            name: college.name,
            description: college.description,
            state: college.state,
            active_candidates: college.active_candidates,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CollegesQuery {
    #[serde(default)]
    pub(crate) state: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatesResponse {
    pub(crate) states: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CollegesResponse {
    pub(crate) colleges: Vec<CollegeResponse>,
}
