use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::EnrichedResult;
use crate::services::scoring::ScoreReport;

pub(crate) const DEFAULT_PAGE_SIZE: i64 = 20;
pub(crate) const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ScoreRequest {
    pub(crate) test_id: i64,
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub(crate) user_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreResponse {
    pub(crate) id: i64,
    pub(crate) test_id: i64,
    pub(crate) user_id: String,
    pub(crate) student_name: String,
    pub(crate) college_name: Option<String>,
    pub(crate) branch: String,
    pub(crate) score: i32,
    pub(crate) correct: i32,
    pub(crate) incorrect: i32,
    pub(crate) ignored: i32,
    pub(crate) time_taken: String,
}

impl From<ScoreReport> for ScoreResponse {
    fn from(report: ScoreReport) -> Self {
        let result = report.result;
        Self {
            id: result.id,
            test_id: result.test_id,
            user_id: result.user_id,
            student_name: report.student_name,
            college_name: report.college_name,
            branch: report.branch,
            score: result.score,
            correct: result.correct,
            incorrect: result.incorrect,
            ignored: result.ignored,
            time_taken: result.time_taken,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsQuery {
    pub(crate) test_id: i64,
    #[serde(default)]
    pub(crate) page: Option<i64>,
    #[serde(default)]
    pub(crate) limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ResultsPage {
    pub(crate) results: Vec<EnrichedResult>,
    pub(crate) total: i64,
    pub(crate) page: i64,
    pub(crate) limit: i64,
    pub(crate) total_pages: i64,
}
