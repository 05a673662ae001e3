use sqlx::PgPool;

use crate::db::models::Student;
use crate::db::types::MemberStatus;

const COLUMNS: &str = "id, user_id, status, branch, gender";

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateStudent<'a> {
    pub user_id: &'a str,
    pub branch: &'a str,
    pub gender: &'a str,
}

pub(crate) async fn create<'e, E>(
    executor: E,
    params: CreateStudent<'_>,
) -> Result<Student, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (user_id, status, branch, gender)
         VALUES ($1,$2,$3,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.user_id)
    .bind(MemberStatus::Active)
    .bind(params.branch)
    .bind(params.gender)
    .fetch_one(executor)
    .await
}
