use std::sync::Arc;

use sqlx::PgPool;

use crate::core::cache::Cache;
use crate::core::config::Settings;
use crate::services::dashboard::{Dashboard, StatsSource};
use crate::services::scoring::{Scorer, ScoringStore};
use crate::services::sessions::{PrincipalDirectory, SessionManager, TokenSettings};

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    cache: Arc<dyn Cache>,
    sessions: SessionManager,
    scorer: Scorer,
    dashboard: Dashboard,
}

/// Storage seams behind the services. Production wires every one of them to
/// the Postgres pool.
pub(crate) struct Backends {
    pub(crate) principals: Arc<dyn PrincipalDirectory>,
    pub(crate) scoring: Arc<dyn ScoringStore>,
    pub(crate) stats: Arc<dyn StatsSource>,
}

impl Backends {
    pub(crate) fn postgres(db: &PgPool) -> Self {
        Self {
            principals: Arc::new(db.clone()),
            scoring: Arc::new(db.clone()),
            stats: Arc::new(db.clone()),
        }
    }
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, cache: Arc<dyn Cache>) -> Self {
        let backends = Backends::postgres(&db);
        Self::with_backends(settings, db, cache, backends)
    }

    pub(crate) fn with_backends(
        settings: Settings,
        db: PgPool,
        cache: Arc<dyn Cache>,
        backends: Backends,
    ) -> Self {
        let sessions = SessionManager::new(
            cache.clone(),
            backends.principals,
            TokenSettings::from_security(settings.security()),
        );
        let scorer = Scorer::new(backends.scoring, cache.clone());
        let dashboard = Dashboard::new(backends.stats);

        Self { inner: Arc::new(InnerState { settings, db, cache, sessions, scorer, dashboard }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn cache(&self) -> &Arc<dyn Cache> {
        &self.inner.cache
    }

    pub(crate) fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    pub(crate) fn scorer(&self) -> &Scorer {
        &self.inner.scorer
    }

    pub(crate) fn dashboard(&self) -> &Dashboard {
        &self.inner.dashboard
    }
}
