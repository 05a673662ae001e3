use sqlx::PgPool;

use crate::db::models::TestAssignment;
use crate::db::types::UserRole;

const COLUMNS: &str = "id, student_id, test_id, start_time";

pub(crate) async fn find_for_student_test(
    pool: &PgPool,
    student_id: &str,
    test_id: i64,
) -> Result<Option<TestAssignment>, sqlx::Error> {
    sqlx::query_as::<_, TestAssignment>(&format!(
        "SELECT {COLUMNS} FROM student_tests
         WHERE student_id = $1 AND test_id = $2
         ORDER BY start_time
         LIMIT 1"
    ))
    .bind(student_id)
    .bind(test_id)
    .fetch_optional(pool)
    .await
}

/// Assigns a test to every student principal of a college, skipping students
/// who already have it. Returns the number of new assignments.
pub(crate) async fn assign_to_college(
    pool: &PgPool,
    test_id: i64,
    college_id: i64,
    start_time: time::PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO student_tests (student_id, test_id, start_time)
         SELECT u.id, $1, $2
         FROM users u
         WHERE u.college_id = $3
           AND u.role = $4
           AND NOT EXISTS (
               SELECT 1 FROM student_tests st
               WHERE st.student_id = u.id AND st.test_id = $1
           )",
    )
    .bind(test_id)
    .bind(start_time)
    .bind(college_id)
    .bind(UserRole::Student)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
