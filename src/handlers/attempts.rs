// src/handlers/attempts.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    handlers::test_defs,
    models::attempt::SubmitAttemptRequest,
    scoring::{normalize_answers, score_submission},
    state::AppState,
};

/// Submits answers for a test and grades them in one synchronous unit:
/// normalize, score, persist.
///
/// Unknown question ids in the payload are ignored; an unanswered
/// question earns zero credit. The graded attempt is returned with its
/// score and per-question breakdown.
pub async fn submit_attempt(
    State(state): State<AppState>,
    Path(test_id): Path<i64>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 404 before 400: a submission to a missing test is not a
    // validation problem.
    test_defs::fetch_test(&state.pool, test_id).await?;

    let questions = test_defs::test_questions(&state.pool, test_id).await?;

    let normalized = normalize_answers(&payload.answers, &questions)?;
    let result = score_submission(&questions, &normalized);

    let attempt = state
        .ledger
        .record_attempt(payload.user_id, test_id, normalized, result)
        .await?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

#[derive(Debug, Deserialize)]
pub struct AttemptHistoryQuery {
    pub user_id: i64,
}

/// Lists a user's graded attempts for a test, most recent first.
pub async fn list_test_attempts(
    State(state): State<AppState>,
    Path(test_id): Path<i64>,
    Query(query): Query<AttemptHistoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    test_defs::fetch_test(&state.pool, test_id).await?;

    let attempts = state.ledger.list_attempts(query.user_id, test_id).await?;

    Ok(Json(attempts))
}

/// Retrieves a single graded attempt by ID.
pub async fn get_attempt(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = state.ledger.get_attempt(id).await?;
    Ok(Json(attempt))
}
