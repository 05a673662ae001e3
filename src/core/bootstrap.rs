use sqlx::PgPool;
use uuid::Uuid;

use crate::core::config::AdminSettings;
use crate::core::security;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeedOutcome {
    Created,
    SkippedNoPassword,
    SkippedExistingUsers,
}

/// Creates the first admin account on an empty database.
pub(crate) async fn seed_admin(pool: &PgPool, admin: &AdminSettings) -> anyhow::Result<SeedOutcome> {
    if admin.password.is_empty() {
        tracing::warn!("ADMIN_PASSWORD not configured; skipping admin seed");
        return Ok(SeedOutcome::SkippedNoPassword);
    }

    if repositories::users::count(pool).await? > 0 {
        tracing::debug!("Users already present; skipping admin seed");
        return Ok(SeedOutcome::SkippedExistingUsers);
    }

    let hashed_password = security::hash_password(&admin.password)?;
    let now = primitive_now_utc();

    repositories::users::create(
        pool,
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            name: &admin.name,
            email: &admin.email,
            hashed_password,
            role: UserRole::Admin,
            college_id: None,
            secondary_email: None,
            created_at: now,
            updated_at: now,
        },
    )
    .await?;

    tracing::info!(email = %admin.email, "Created admin account");
    Ok(SeedOutcome::Created)
}
