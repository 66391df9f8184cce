// src/models/test_def.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::PublicQuestion;

/// Represents the 'test_definitions' table in the database.
/// A test is an ordered set of question references graded as one unit.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestDefinition {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for returning a test together with its questions, in position
/// order and with correct answers withheld.
#[derive(Debug, Serialize)]
pub struct TestDetail {
    #[serde(flatten)]
    pub test: TestDefinition,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for creating a test definition.
/// Duplicate question ids are deduplicated preserving first position;
/// references to missing questions fail validation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub question_ids: Vec<i64>,
}
