use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::PrimitiveDateTime;

use crate::db::types::{DifficultyLevel, MemberStatus, QuestionType, UserRole};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) college_id: Option<i64>,
    pub(crate) secondary_email: Option<String>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub(crate) struct PrincipalSummary {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) college_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Student {
    pub(crate) id: i64,
    pub(crate) user_id: String,
    pub(crate) status: MemberStatus,
    pub(crate) branch: String,
    pub(crate) gender: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct College {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) state: String,
    pub(crate) active_candidates: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Test {
    pub(crate) id: i64,
    pub(crate) test_name: String,
    pub(crate) user_id: String,
    pub(crate) min_questions: i32,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Question {
    pub(crate) id: i64,
    pub(crate) question_type: QuestionType,
    pub(crate) question_text: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) correct_option_id: Option<i64>,
    pub(crate) created_by: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct QuestionOption {
    pub(crate) id: i64,
    pub(crate) question_id: i64,
    pub(crate) option_index: i32,
    pub(crate) option_text: String,
}

/// A question together with its options ordered by `option_index`.
#[derive(Debug, Clone)]
pub(crate) struct QuestionWithOptions {
    pub(crate) question: Question,
    pub(crate) options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestAssignment {
    pub(crate) id: i64,
    pub(crate) student_id: String,
    pub(crate) test_id: i64,
    pub(crate) start_time: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct StudentAnswer {
    pub(crate) id: i64,
    pub(crate) test_id: i64,
    pub(crate) student_id: i64,
    pub(crate) question_id: i64,
    pub(crate) selected: String,
    pub(crate) created_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestResult {
    pub(crate) id: i64,
    pub(crate) test_id: i64,
    pub(crate) user_id: String,
    pub(crate) score: i32,
    pub(crate) correct: i32,
    pub(crate) incorrect: i32,
    pub(crate) ignored: i32,
    pub(crate) time_taken: String,
    pub(crate) created_at: PrimitiveDateTime,
}

/// Result row joined with the student details shown to teachers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct EnrichedResult {
    pub(crate) id: i64,
    pub(crate) test_id: i64,
    pub(crate) user_id: String,
    pub(crate) student_name: String,
    pub(crate) college_name: Option<String>,
    pub(crate) branch: Option<String>,
    pub(crate) score: i32,
    pub(crate) correct: i32,
    pub(crate) incorrect: i32,
    pub(crate) ignored: i32,
    pub(crate) time_taken: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct TestScoreRow {
    pub(crate) student_name: String,
    pub(crate) score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct ParticipationRow {
    pub(crate) student_name: String,
    pub(crate) test_count: i64,
}
