use sqlx::PgPool;

use crate::db::types::{MemberStatus, UserRole};
use crate::services::dashboard::{HomeMetric, TeacherMetric};

pub(crate) async fn count(pool: &PgPool, metric: HomeMetric) -> Result<i64, sqlx::Error> {
    match metric {
        HomeMetric::Users => scalar(pool, "SELECT COUNT(*) FROM users").await,
        HomeMetric::Colleges => scalar(pool, "SELECT COUNT(*) FROM colleges").await,
        HomeMetric::Teachers => {
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
                .bind(UserRole::Teacher)
                .fetch_one(pool)
                .await
        }
        HomeMetric::ActiveStudents => {
            sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE status = $1")
                .bind(MemberStatus::Active)
                .fetch_one(pool)
                .await
        }
        HomeMetric::Questions => scalar(pool, "SELECT COUNT(*) FROM questions").await,
        HomeMetric::Tests => scalar(pool, "SELECT COUNT(*) FROM tests").await,
        HomeMetric::Assignments => scalar(pool, "SELECT COUNT(*) FROM student_tests").await,
        HomeMetric::Results => scalar(pool, "SELECT COUNT(*) FROM results").await,
    }
}

pub(crate) async fn count_for_teacher(
    pool: &PgPool,
    metric: TeacherMetric,
    teacher_id: &str,
) -> Result<i64, sqlx::Error> {
    let sql = match metric {
        TeacherMetric::TestsCreated => "SELECT COUNT(*) FROM tests WHERE user_id = $1",
        TeacherMetric::QuestionsInTests => {
            "SELECT COUNT(*) FROM test_questions tq
             JOIN tests t ON t.id = tq.test_id
             WHERE t.user_id = $1"
        }
        TeacherMetric::StudentsAssigned => {
            "SELECT COUNT(DISTINCT st.student_id) FROM student_tests st
             JOIN tests t ON t.id = st.test_id
             WHERE t.user_id = $1"
        }
        TeacherMetric::ResultsRecorded => {
            "SELECT COUNT(*) FROM results r
             JOIN tests t ON t.id = r.test_id
             WHERE t.user_id = $1"
        }
    };

    sqlx::query_scalar(sql).bind(teacher_id).fetch_one(pool).await
}

async fn scalar(pool: &PgPool, sql: &'static str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(sql).fetch_one(pool).await
}
