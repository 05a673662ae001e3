use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::core::cache::{self, Cache, CacheEntry, WHITELIST_MARKER};
use crate::core::config::SecuritySettings;
use crate::core::security::{self, Claims, SecurityError};
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authorization header required")]
    MissingCredentials,
    #[error("Invalid token")]
    SignatureInvalid,
    #[error("Token has expired")]
    Expired,
    #[error("Session is not active")]
    Unauthenticated,
    #[error("Refresh token expired or invalidated")]
    RefreshStale,
    #[error("Token already logged out or invalid")]
    NotFound,
    #[error("Failed to sign token")]
    Signing,
    #[error("{0}")]
    StorageUnavailable(&'static str),
}

fn storage_failure(err: impl std::fmt::Display, context: &'static str) -> SessionError {
    tracing::error!(error = %err, "{context}");
    SessionError::StorageUnavailable(context)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone)]
pub(crate) struct Principal {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
}

impl From<User> for Principal {
    fn from(user: User) -> Self {
        Self { id: user.id, email: user.email, hashed_password: user.hashed_password, role: user.role }
    }
}

/// Who is making the request, as established by a whitelisted access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AuthContext {
    pub(crate) principal_id: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
}

#[derive(Debug, Clone)]
pub(crate) struct TokenPair {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
}

#[async_trait]
pub(crate) trait PrincipalDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, sqlx::Error>;
}

#[async_trait]
impl PrincipalDirectory for PgPool {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, sqlx::Error> {
        let user = repositories::users::find_by_email(self, email).await?;
        Ok(user.map(Principal::from))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TokenSettings {
    pub(crate) access_secret: String,
    pub(crate) refresh_secret: String,
    pub(crate) access_ttl: Duration,
    pub(crate) refresh_ttl: Duration,
    pub(crate) role_ttl: Duration,
}

impl TokenSettings {
    pub(crate) fn from_security(security: &SecuritySettings) -> Self {
        Self {
            access_secret: security.access_secret.clone(),
            refresh_secret: security.refresh_secret.clone(),
            access_ttl: Duration::from_secs(security.access_token_ttl_minutes * 60),
            refresh_ttl: Duration::from_secs(security.refresh_token_ttl_days * 24 * 60 * 60),
            role_ttl: Duration::from_secs(security.role_cache_ttl_minutes * 60),
        }
    }

    fn secret(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }
}

fn jwt_lifetime(ttl: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively.
pub(crate) fn bearer_token(header: &str) -> Result<&str, SessionError> {
    let (scheme, token) = header.trim().split_once(' ').ok_or(SessionError::MissingCredentials)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(SessionError::MissingCredentials);
    }
    Ok(token)
}

#[derive(Clone)]
pub(crate) struct SessionManager {
    cache: Arc<dyn Cache>,
    principals: Arc<dyn PrincipalDirectory>,
    tokens: TokenSettings,
}

impl SessionManager {
    pub(crate) fn new(
        cache: Arc<dyn Cache>,
        principals: Arc<dyn PrincipalDirectory>,
        tokens: TokenSettings,
    ) -> Self {
        Self { cache, principals, tokens }
    }

    pub(crate) async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Principal, SessionError> {
        let principal = self
            .principals
            .find_by_email(email)
            .await
            .map_err(|e| storage_failure(e, "Failed to load principal"))?
            .ok_or(SessionError::InvalidCredentials)?;

        match security::verify_password(password, &principal.hashed_password) {
            Ok(true) => Ok(principal),
            Ok(false) => Err(SessionError::InvalidCredentials),
            Err(err) => {
                tracing::warn!(error = %err, principal_id = %principal.id, "Stored password hash is unreadable");
                Err(SessionError::InvalidCredentials)
            }
        }
    }

    /// Signs a fresh access/refresh pair and whitelists both in a single
    /// cache transaction. Replaces any refresh token stored for the principal.
    pub(crate) async fn issue_tokens(&self, principal: &Principal) -> Result<TokenPair, SessionError> {
        let access_token = security::sign_token(
            &principal.email,
            &principal.id,
            &self.tokens.access_secret,
            jwt_lifetime(self.tokens.access_ttl),
        )
        .map_err(|_| SessionError::Signing)?;
        let refresh_token = security::sign_token(
            &principal.email,
            &principal.id,
            &self.tokens.refresh_secret,
            jwt_lifetime(self.tokens.refresh_ttl),
        )
        .map_err(|_| SessionError::Signing)?;

        let access_key = cache::access_token_key(&access_token);
        let refresh_key = cache::refresh_token_key(&principal.email);
        let entries = [
            CacheEntry { key: &access_key, value: WHITELIST_MARKER, ttl: self.tokens.access_ttl },
            CacheEntry { key: &refresh_key, value: &refresh_token, ttl: self.tokens.refresh_ttl },
        ];
        self.cache
            .set_many_with_ttl(&entries)
            .await
            .map_err(|e| storage_failure(e, "Failed to store session tokens"))?;

        tracing::info!(principal_id = %principal.id, "Issued session tokens");
        Ok(TokenPair { access_token, refresh_token })
    }

    pub(crate) fn validate_token(&self, token: &str, kind: TokenKind) -> Result<Claims, SessionError> {
        security::decode_token(token, self.tokens.secret(kind)).map_err(|err| match err {
            SecurityError::JwtExpired => SessionError::Expired,
            _ => SessionError::SignatureInvalid,
        })
    }

    pub(crate) async fn authorize(&self, header: Option<&str>) -> Result<AuthContext, SessionError> {
        let token = bearer_token(header.ok_or(SessionError::MissingCredentials)?)?;
        let claims = self.validate_token(token, TokenKind::Access)?;

        let whitelisted = self
            .cache
            .exists(&cache::access_token_key(token))
            .await
            .map_err(|e| storage_failure(e, "Failed to check session"))?;
        if !whitelisted {
            return Err(SessionError::Unauthenticated);
        }

        let role = self.resolve_role(&claims.email).await?;

        Ok(AuthContext { principal_id: claims.user_id, email: claims.email, role })
    }

    async fn resolve_role(&self, email: &str) -> Result<UserRole, SessionError> {
        let key = cache::role_key(email);
        match self.cache.get(&key).await {
            Ok(Some(value)) => {
                if let Some(role) = UserRole::parse(&value) {
                    return Ok(role);
                }
                tracing::warn!(value = %value, "Ignoring unknown cached role");
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "Role cache lookup failed"),
        }

        let principal = self
            .principals
            .find_by_email(email)
            .await
            .map_err(|e| storage_failure(e, "Failed to load principal"))?
            .ok_or(SessionError::Unauthenticated)?;

        if let Err(err) =
            self.cache.set_with_ttl(&key, principal.role.as_str(), self.tokens.role_ttl).await
        {
            tracing::warn!(error = %err, "Failed to cache role");
        }

        Ok(principal.role)
    }

    /// Exchanges the principal's current refresh token for a new pair. Any
    /// other refresh token, even a validly signed one, is stale.
    pub(crate) async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, SessionError> {
        let claims = self.validate_token(refresh_token, TokenKind::Refresh)?;

        let stored = self
            .cache
            .get(&cache::refresh_token_key(&claims.email))
            .await
            .map_err(|e| storage_failure(e, "Failed to load refresh token"))?;
        if stored.as_deref() != Some(refresh_token) {
            return Err(SessionError::RefreshStale);
        }

        let principal = self
            .principals
            .find_by_email(&claims.email)
            .await
            .map_err(|e| storage_failure(e, "Failed to load principal"))?
            .ok_or(SessionError::Unauthenticated)?;

        self.issue_tokens(&principal).await
    }

    pub(crate) async fn revoke(&self, access_token: &str) -> Result<(), SessionError> {
        let access_key = cache::access_token_key(access_token);
        let whitelisted = self
            .cache
            .exists(&access_key)
            .await
            .map_err(|e| storage_failure(e, "Failed to check session"))?;
        if !whitelisted {
            return Err(SessionError::NotFound);
        }

        let claims = self.validate_token(access_token, TokenKind::Access)?;

        self.cache
            .delete(&access_key)
            .await
            .map_err(|e| storage_failure(e, "Failed to delete access token"))?;

        if let Err(err) = self.cache.delete(&cache::refresh_token_key(&claims.email)).await {
            tracing::error!(
                error = %err,
                principal_id = %claims.user_id,
                "Access token revoked but refresh token could not be deleted"
            );
            return Err(SessionError::StorageUnavailable("Failed to delete refresh token"));
        }

        tracing::info!(principal_id = %claims.user_id, "Session revoked");
        Ok(())
    }
}
