use sqlx::PgPool;

use crate::db::models::{PrincipalSummary, User};
use crate::db::types::UserRole;

const COLUMNS: &str = "\
    id, name, email, hashed_password, role, college_id, secondary_email, \
    created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

/// Name and college of a user, as printed on a result sheet.
pub(crate) async fn find_summary(
    pool: &PgPool,
    id: &str,
) -> Result<Option<PrincipalSummary>, sqlx::Error> {
    sqlx::query_as::<_, PrincipalSummary>(
        "SELECT u.id, u.name, c.name AS college_name
         FROM users u
         LEFT JOIN colleges c ON c.id = u.college_id
         WHERE u.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await
}

pub(crate) struct CreateUser<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub hashed_password: String,
    pub role: UserRole,
    pub college_id: Option<i64>,
    pub secondary_email: Option<&'a str>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create<'e, E>(executor: E, params: CreateUser<'_>) -> Result<User, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (
            id, name, email, hashed_password, role, college_id, secondary_email,
            created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.college_id)
    .bind(params.secondary_email)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_password(
    pool: &PgPool,
    id: &str,
    hashed_password: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $1, updated_at = $2 WHERE id = $3")
        .bind(hashed_password)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
