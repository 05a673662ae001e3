use sqlx::PgPool;

use crate::db::models::{ParticipationRow, TestScoreRow};

/// Every recorded score for a test, best first.
pub(crate) async fn test_scores(
    pool: &PgPool,
    test_id: i64,
) -> Result<Vec<TestScoreRow>, sqlx::Error> {
    sqlx::query_as::<_, TestScoreRow>(
        "SELECT u.name AS student_name, r.score
         FROM results r
         JOIN users u ON u.id = r.user_id
         WHERE r.test_id = $1
         ORDER BY r.score DESC, r.id",
    )
    .bind(test_id)
    .fetch_all(pool)
    .await
}

/// Students ranked by how many tests have been assigned to them.
pub(crate) async fn participation_ranking(
    pool: &PgPool,
) -> Result<Vec<ParticipationRow>, sqlx::Error> {
    sqlx::query_as::<_, ParticipationRow>(
        "SELECT u.name AS student_name, COUNT(st.test_id) AS test_count
         FROM student_tests st
         JOIN users u ON u.id = st.student_id
         GROUP BY u.id, u.name
         ORDER BY test_count DESC, u.name",
    )
    .fetch_all(pool)
    .await
}
