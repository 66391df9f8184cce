// src/scoring/normalize.rs

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use crate::{error::AppError, models::question::Question};

/// Validates and canonicalizes a raw answers payload against a test's
/// question set.
///
/// Clients send `{"<question_id>": "<answer>", ...}` with string keys.
/// Keys that do not parse as ids, ids not in the test, and non-string
/// values are dropped rather than rejected, so a partial or garbled
/// payload never aborts grading. Questions the client skipped simply
/// have no entry and earn zero credit.
///
/// Fails when the test has no questions (ungradable) or the payload is
/// not a JSON object.
pub fn normalize_answers(
    raw: &Value,
    questions: &[Question],
) -> Result<BTreeMap<i64, String>, AppError> {
    if questions.is_empty() {
        return Err(AppError::Validation(
            "Test has no questions and cannot be graded".to_string(),
        ));
    }

    let Some(entries) = raw.as_object() else {
        return Err(AppError::Validation(
            "Answers must be a JSON object mapping question ids to answer strings".to_string(),
        ));
    };

    let known: HashSet<i64> = questions.iter().map(|q| q.id).collect();

    let mut normalized = BTreeMap::new();
    for (key, value) in entries {
        let Ok(question_id) = key.parse::<i64>() else {
            continue;
        };
        if !known.contains(&question_id) {
            continue;
        }
        if let Some(answer) = value.as_str() {
            normalized.insert(question_id, answer.to_string());
        }
    }

    Ok(normalized)
}
