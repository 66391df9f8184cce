// src/models/attempt.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

/// Represents the 'submission_attempts' table in the database.
///
/// Ledger semantics: a row is inserted already graded and is never
/// mutated afterwards. Re-submission creates a new attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubmissionAttempt {
    pub id: i64,
    pub test_id: i64,
    pub user_id: i64,

    /// Normalized answers: question id -> submitted answer.
    pub answers: Json<BTreeMap<i64, String>>,

    /// Overall percentage score in [0, 100], two decimal places.
    pub score: f64,

    pub is_graded: bool,

    /// Per-question grading results, in test question order.
    pub breakdown: Json<Vec<AnswerBreakdown>>,

    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One entry of the per-question grading breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerBreakdown {
    pub question_id: i64,
    /// `None` when the learner left the question unanswered.
    pub submitted: Option<String>,
    pub correct_answer: String,
    pub correct: bool,
    pub weight: f64,
}

/// DTO for submitting answers to a test.
///
/// User identity is passed explicitly rather than taken from ambient
/// session state. `answers` stays a raw JSON value here so the
/// normalizer can reject non-object payloads with a 400 instead of a
/// deserialization failure.
#[derive(Debug, Deserialize)]
pub struct SubmitAttemptRequest {
    pub user_id: i64,
    #[serde(default)]
    pub answers: serde_json::Value,
}
