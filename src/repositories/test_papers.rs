use sqlx::PgPool;

use crate::db::models::Test;

const COLUMNS: &str = "id, test_name, user_id, min_questions, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Test>, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!("SELECT {COLUMNS} FROM tests WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateTest<'a> {
    pub test_name: &'a str,
    pub user_id: &'a str,
    pub min_questions: i32,
    pub created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateTest<'_>) -> Result<Test, sqlx::Error> {
    sqlx::query_as::<_, Test>(&format!(
        "INSERT INTO tests (test_name, user_id, min_questions, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.test_name)
    .bind(params.user_id)
    .bind(params.min_questions)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn count_questions(pool: &PgPool, test_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM test_questions WHERE test_id = $1")
        .bind(test_id)
        .fetch_one(pool)
        .await
}

/// Links existing questions to a test, skipping ones already linked.
/// Returns how many links were added.
pub(crate) async fn attach_questions(
    pool: &PgPool,
    test_id: i64,
    question_ids: &[i64],
) -> Result<u64, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        "INSERT INTO test_questions (test_id, question_id)
         SELECT $1, q.id FROM questions q WHERE q.id = ANY($2)
         ON CONFLICT (test_id, question_id) DO NOTHING",
    )
    .bind(test_id)
    .bind(question_ids)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Removes a test; links, assignments, answers and results go with it.
pub(crate) async fn delete(pool: &PgPool, test_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tests WHERE id = $1").bind(test_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
