// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{SqlitePool, types::Json as SqlJson};
use validator::Validate;

use crate::{
    error::AppError,
    models::question::{CreateQuestionRequest, Question, UpdateQuestionRequest},
};

const QUESTION_COLUMNS: &str = "id, prompt, options, answer, weight, created_at";

/// Cross-field invariants not expressible as per-field validators:
/// the correct answer must be one of the options, weight must be
/// strictly positive.
fn check_invariants(options: &[String], answer: &str, weight: f64) -> Result<(), AppError> {
    if !options.iter().any(|opt| opt == answer) {
        return Err(AppError::Validation(
            "Answer must be one of the options".to_string(),
        ));
    }
    if weight <= 0.0 {
        return Err(AppError::Validation(
            "Weight must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Lists all questions in the bank.
pub async fn list_questions(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let questions = sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY id"
    ))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list questions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(questions))
}

/// Creates a new question.
pub async fn create_question(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    check_invariants(&payload.options, &payload.answer, payload.weight)?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO questions (prompt, options, answer, weight)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&payload.prompt)
    .bind(SqlJson(&payload.options))
    .bind(&payload.answer)
    .bind(payload.weight)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let question = fetch_question(&pool, inserted.last_insert_rowid()).await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Retrieves a single question, including its answer (authoring view).
pub async fn get_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = fetch_question(&pool, id).await?;
    Ok(Json(question))
}

/// Updates a question by ID.
///
/// The stored record is merged with the provided fields and the result
/// re-validated, so a partial update cannot break the invariants.
pub async fn update_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut question = fetch_question(&pool, id).await?;

    if let Some(prompt) = payload.prompt {
        question.prompt = prompt;
    }
    if let Some(options) = payload.options {
        question.options = SqlJson(options);
    }
    if let Some(answer) = payload.answer {
        question.answer = answer;
    }
    if let Some(weight) = payload.weight {
        question.weight = weight;
    }

    if question.prompt.is_empty() || question.options.0.is_empty() {
        return Err(AppError::Validation(
            "Prompt and options must not be empty".to_string(),
        ));
    }
    check_invariants(&question.options.0, &question.answer, question.weight)?;

    sqlx::query(
        r#"
        UPDATE questions SET prompt = ?, options = ?, answer = ?, weight = ?
        WHERE id = ?
        "#,
    )
    .bind(&question.prompt)
    .bind(SqlJson(&question.options.0))
    .bind(&question.answer)
    .bind(question.weight)
    .bind(id)
    .execute(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update question: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(question))
}

/// Deletes a question by ID.
///
/// Past graded attempts keep their breakdown snapshot; they are not
/// invalidated by question deletion.
pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_question(pool: &SqlitePool, id: i64) -> Result<Question, AppError> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Question not found".to_string()))
}
