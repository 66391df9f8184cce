// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

/// Represents the 'questions' table in the database.
///
/// Invariants (enforced at create/update time): `answer` is one of
/// `options`, `weight` is strictly positive.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    /// The text content of the question.
    pub prompt: String,

    /// Ordered list of options (e.g., ["Option A", "Option B"]).
    /// Stored as a JSON array in the database.
    pub options: Json<Vec<String>>,

    /// The correct answer. Compared against submissions with exact,
    /// case-sensitive string equality.
    pub answer: String,

    /// Relative weight of this question when scoring a test.
    pub weight: f64,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for sending a question to learners (excludes the answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub prompt: String,
    pub options: Json<Vec<String>>,
    pub weight: f64,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        PublicQuestion {
            id: q.id,
            prompt: q.prompt,
            options: q.options,
            weight: q.weight,
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

/// DTO for creating a new question.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub prompt: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub answer: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// DTO for updating a question. Fields are optional; the merged record
/// is re-validated before being written.
#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub prompt: Option<String>,
    pub options: Option<Vec<String>>,
    pub answer: Option<String>,
    pub weight: Option<f64>,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.is_empty() {
        return Err(validator::ValidationError::new("options_cannot_be_empty"));
    }
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}
