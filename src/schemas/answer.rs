use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub(crate) struct AnswerInput {
    pub(crate) test_id: i64,
    /// Student profile id (`students.id`), not the user id.
    pub(crate) student_id: i64,
    pub(crate) question_id: i64,
    #[serde(default)]
    #[validate(length(max = 64, message = "selected must be at most 64 characters"))]
    pub(crate) selected: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(transparent)]
pub(crate) struct AnswerBatch {
    #[validate(length(min = 1, max = 500, message = "1..500 answers per request"), nested)]
    pub(crate) answers: Vec<AnswerInput>,
}
