// src/scoring/mod.rs
//
// The pure core of the grading pipeline: normalize raw client answers,
// then score them against the test's questions. No I/O on this path;
// persistence is the ledger's job.

pub mod normalize;
pub mod score;

pub use normalize::normalize_answers;
pub use score::{ScoreResult, score_submission};
