use sqlx::PgPool;

use crate::db::models::College;

const COLUMNS: &str = "id, name, description, state, active_candidates";

/// Looks a college up by id, accepting it only when it is located in `state`.
pub(crate) async fn find_in_state(
    pool: &PgPool,
    id: i64,
    state: &str,
) -> Result<Option<College>, sqlx::Error> {
    sqlx::query_as::<_, College>(&format!(
        "SELECT {COLUMNS} FROM colleges WHERE id = $1 AND state = $2"
    ))
    .bind(id)
    .bind(state.trim())
    .fetch_optional(pool)
    .await
}

pub(crate) struct CreateCollege<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub state: &'a str,
}

/// Inserts a college. `active_candidates` is the number of users already
/// pointing at it, which is zero for a fresh row.
pub(crate) async fn create(
    pool: &PgPool,
    params: CreateCollege<'_>,
) -> Result<College, sqlx::Error> {
    sqlx::query_as::<_, College>(&format!(
        "INSERT INTO colleges (name, description, state, active_candidates)
         VALUES ($1, $2, $3, 0)
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.description)
    .bind(params.state)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_states(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT DISTINCT state FROM colleges ORDER BY state")
        .fetch_all(pool)
        .await
}

pub(crate) async fn list_in_state(pool: &PgPool, state: &str) -> Result<Vec<College>, sqlx::Error> {
    sqlx::query_as::<_, College>(&format!(
        "SELECT {COLUMNS} FROM colleges WHERE state = $1 ORDER BY name, id"
    ))
    .bind(state.trim())
    .fetch_all(pool)
    .await
}
