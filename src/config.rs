// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Policy applied when a user submits a test they already have a graded
/// attempt for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptPolicy {
    /// Every submission creates a new graded attempt.
    AllowMultiple,
    /// Only the first graded attempt per (user, test) is accepted;
    /// later submissions are rejected with a conflict.
    FirstAttemptOnly,
}

impl AttemptPolicy {
    fn parse(s: &str) -> Self {
        match s {
            "first-attempt-only" => AttemptPolicy::FirstAttemptOnly,
            _ => AttemptPolicy::AllowMultiple,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub rust_log: String,
    pub port: u16,
    pub attempt_policy: AttemptPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://assessment.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let attempt_policy = env::var("ATTEMPT_POLICY")
            .map(|s| AttemptPolicy::parse(&s))
            .unwrap_or(AttemptPolicy::AllowMultiple);

        Self {
            database_url,
            rust_log,
            port,
            attempt_policy,
        }
    }
}
