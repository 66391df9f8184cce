// src/ledger.rs

use std::collections::BTreeMap;

use sqlx::{SqlitePool, types::Json};

use crate::{
    config::AttemptPolicy, error::AppError, models::attempt::SubmissionAttempt,
    scoring::ScoreResult,
};

const ATTEMPT_COLUMNS: &str =
    "id, test_id, user_id, answers, score, is_graded, breakdown, submitted_at";

/// Append-only store of graded attempts.
///
/// Attempts are inserted already graded and never updated. Under the
/// first-attempt-only policy the ledger claims a (user, test) marker
/// row inside the same transaction as the attempt insert; the marker's
/// primary key makes the claim a single atomic write-check, so two
/// concurrent submissions can never both land as the "first" graded
/// attempt.
#[derive(Clone)]
pub struct SubmissionLedger {
    pool: SqlitePool,
    policy: AttemptPolicy,
}

impl SubmissionLedger {
    pub fn new(pool: SqlitePool, policy: AttemptPolicy) -> Self {
        Self { pool, policy }
    }

    /// Persists a graded attempt for (user, test).
    ///
    /// Returns `Conflict` when the first-attempt-only policy is active
    /// and a graded attempt already exists; callers may recover by
    /// listing existing attempts instead.
    pub async fn record_attempt(
        &self,
        user_id: i64,
        test_id: i64,
        answers: BTreeMap<i64, String>,
        result: ScoreResult,
    ) -> Result<SubmissionAttempt, AppError> {
        let mut tx = self.pool.begin().await?;

        if self.policy == AttemptPolicy::FirstAttemptOnly {
            sqlx::query("INSERT INTO first_graded_attempts (user_id, test_id) VALUES (?, ?)")
                .bind(user_id)
                .bind(test_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if e.as_database_error()
                        .is_some_and(|db| db.is_unique_violation())
                    {
                        AppError::Conflict(
                            "A graded attempt already exists for this user and test".to_string(),
                        )
                    } else {
                        tracing::error!("Failed to claim first graded attempt: {:?}", e);
                        AppError::InternalServerError(e.to_string())
                    }
                })?;
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO submission_attempts
            (test_id, user_id, answers, breakdown, score, is_graded)
            VALUES (?, ?, ?, ?, ?, TRUE)
            "#,
        )
        .bind(test_id)
        .bind(user_id)
        .bind(Json(&answers))
        .bind(Json(&result.breakdown))
        .bind(result.score)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to record attempt: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        let attempt = sqlx::query_as::<_, SubmissionAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM submission_attempts WHERE id = ?"
        ))
        .bind(inserted.last_insert_rowid())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            user_id,
            test_id,
            attempt_id = attempt.id,
            score = attempt.score,
            "Recorded graded attempt"
        );

        Ok(attempt)
    }

    /// Lists a user's attempts for one test, most recent first.
    pub async fn list_attempts(
        &self,
        user_id: i64,
        test_id: i64,
    ) -> Result<Vec<SubmissionAttempt>, AppError> {
        let attempts = sqlx::query_as::<_, SubmissionAttempt>(&format!(
            r#"
            SELECT {ATTEMPT_COLUMNS}
            FROM submission_attempts
            WHERE user_id = ? AND test_id = ?
            ORDER BY submitted_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    pub async fn get_attempt(&self, id: i64) -> Result<SubmissionAttempt, AppError> {
        sqlx::query_as::<_, SubmissionAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM submission_attempts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))
    }
}
