// src/scoring/score.rs

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{attempt::AnswerBreakdown, question::Question};

/// Result of scoring one submission: overall percentage plus the
/// per-question breakdown, one entry per test question in test order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: f64,
    pub breakdown: Vec<AnswerBreakdown>,
}

/// Scores normalized answers against the test's questions.
///
/// Comparison policy: exact case-sensitive string equality, no trimming
/// and no case folding. Any normalization ("a" vs "A", stray
/// whitespace) is the client's responsibility; exactness here keeps
/// grading unambiguous.
///
/// Score = 100 * (weight of correct answers) / (total weight), rounded
/// half-up to two decimals. A test whose total weight is somehow zero
/// scores 0 rather than dividing by zero.
///
/// Pure function: no side effects, same inputs always produce the same
/// result.
pub fn score_submission(
    questions: &[Question],
    answers: &BTreeMap<i64, String>,
) -> ScoreResult {
    let mut total_weight = 0.0;
    let mut earned_weight = 0.0;
    let mut breakdown = Vec::with_capacity(questions.len());

    for question in questions {
        total_weight += question.weight;

        let submitted = answers.get(&question.id);
        let correct = submitted.is_some_and(|a| a == &question.answer);
        if correct {
            earned_weight += question.weight;
        }

        breakdown.push(AnswerBreakdown {
            question_id: question.id,
            submitted: submitted.cloned(),
            correct_answer: question.answer.clone(),
            correct,
            weight: question.weight,
        });
    }

    let score = if total_weight > 0.0 {
        round_half_up_2(earned_weight / total_weight * 100.0)
    } else {
        0.0
    };

    ScoreResult { score, breakdown }
}

fn round_half_up_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
