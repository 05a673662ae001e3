use sqlx::PgPool;

use crate::db::models::{EnrichedResult, TestResult};

const COLUMNS: &str = "\
    id, test_id, user_id, score, correct, incorrect, ignored, time_taken, created_at";

pub(crate) async fn exists(pool: &PgPool, test_id: i64, user_id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM results WHERE test_id = $1 AND user_id = $2)",
    )
    .bind(test_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateResult<'a> {
    pub test_id: i64,
    pub user_id: &'a str,
    pub score: i32,
    pub correct: i32,
    pub incorrect: i32,
    pub ignored: i32,
    pub time_taken: &'a str,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateResult<'_>) -> Result<TestResult, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "INSERT INTO results (
            test_id, user_id, score, correct, incorrect, ignored, time_taken, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}",
    ))
    .bind(params.test_id)
    .bind(params.user_id)
    .bind(params.score)
    .bind(params.correct)
    .bind(params.incorrect)
    .bind(params.ignored)
    .bind(params.time_taken)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn count_for_test(pool: &PgPool, test_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM results WHERE test_id = $1")
        .bind(test_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_enriched(
    pool: &PgPool,
    test_id: i64,
    offset: i64,
    limit: i64,
) -> Result<Vec<EnrichedResult>, sqlx::Error> {
    sqlx::query_as::<_, EnrichedResult>(
        "SELECT r.id,
                r.test_id,
                r.user_id,
                u.name AS student_name,
                c.name AS college_name,
                s.branch,
                r.score,
                r.correct,
                r.incorrect,
                r.ignored,
                r.time_taken
         FROM results r
         JOIN users u ON u.id = r.user_id
         LEFT JOIN colleges c ON c.id = u.college_id
         LEFT JOIN students s ON s.user_id = r.user_id
         WHERE r.test_id = $1
         ORDER BY r.id
         OFFSET $2
         LIMIT $3",
    )
    .bind(test_id)
    .bind(offset.max(0))
    .bind(limit)
    .fetch_all(pool)
    .await
}
