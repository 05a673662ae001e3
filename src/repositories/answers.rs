use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::StudentAnswer;

const COLUMNS: &str = "id, test_id, student_id, question_id, selected, created_at";

pub(crate) struct CreateAnswer<'a> {
    pub test_id: i64,
    pub student_id: i64,
    pub question_id: i64,
    pub selected: &'a str,
}

/// Stores a batch of answers in one statement; either all rows land or none.
pub(crate) async fn create_many(
    pool: &PgPool,
    answers: &[CreateAnswer<'_>],
    created_at: time::PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    if answers.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO student_answers (test_id, student_id, question_id, selected, created_at) ",
    );
    builder.push_values(answers, |mut row, answer| {
        row.push_bind(answer.test_id)
            .push_bind(answer.student_id)
            .push_bind(answer.question_id)
            .push_bind(answer.selected)
            .push_bind(created_at);
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn list_for_student_test(
    pool: &PgPool,
    student_id: i64,
    test_id: i64,
) -> Result<Vec<StudentAnswer>, sqlx::Error> {
    sqlx::query_as::<_, StudentAnswer>(&format!(
        "SELECT {COLUMNS} FROM student_answers
         WHERE student_id = $1 AND test_id = $2
         ORDER BY id"
    ))
    .bind(student_id)
    .bind(test_id)
    .fetch_all(pool)
    .await
}
