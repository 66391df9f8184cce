use crate::config::Config;
use crate::ledger::SubmissionLedger;
use axum::extract::FromRef;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub ledger: SubmissionLedger,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        let ledger = SubmissionLedger::new(pool.clone(), config.attempt_policy);
        Self {
            pool,
            config,
            ledger,
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for SubmissionLedger {
    fn from_ref(state: &AppState) -> Self {
        state.ledger.clone()
    }
}
