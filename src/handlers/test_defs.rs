// src/handlers/test_defs.rs

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::Question,
        test_def::{CreateTestRequest, TestDefinition, TestDetail},
    },
};

/// Lists all test definitions (without their questions).
pub async fn list_tests(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let tests = sqlx::query_as::<_, TestDefinition>(
        "SELECT id, title, description, created_at FROM test_definitions ORDER BY id DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list tests: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(tests))
}

/// Creates a test definition from a list of question ids.
///
/// Duplicate ids are deduplicated keeping the first position. All
/// referenced questions must exist; a test with zero questions may be
/// created but stays ungradable until questions are attached.
pub async fn create_test(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut seen = HashSet::new();
    let question_ids: Vec<i64> = payload
        .question_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    if !question_ids.is_empty() {
        // Use QueryBuilder for dynamic IN clause
        let mut query_builder =
            QueryBuilder::<Sqlite>::new("SELECT id FROM questions WHERE id IN (");
        let mut separated = query_builder.separated(",");
        for id in &question_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let found: Vec<i64> = query_builder
            .build_query_scalar()
            .fetch_all(&pool)
            .await
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        let found: HashSet<i64> = found.into_iter().collect();
        let missing: Vec<i64> = question_ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Unknown question ids: {:?}",
                missing
            )));
        }
    }

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query("INSERT INTO test_definitions (title, description) VALUES (?, ?)")
        .bind(&payload.title)
        .bind(&payload.description)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create test: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;
    let test_id = inserted.last_insert_rowid();

    for (position, question_id) in question_ids.iter().enumerate() {
        sqlx::query("INSERT INTO test_questions (test_id, question_id, position) VALUES (?, ?, ?)")
            .bind(test_id)
            .bind(question_id)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": test_id}))))
}

/// Retrieves a test with its questions in position order.
/// Correct answers are withheld from this learner-facing view.
pub async fn get_test(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let test = fetch_test(&pool, id).await?;
    let questions = test_questions(&pool, id).await?;

    Ok(Json(TestDetail {
        test,
        questions: questions.into_iter().map(Into::into).collect(),
    }))
}

/// Deletes a test definition by ID. Join rows cascade; graded attempts
/// referencing the test are kept for audit.
pub async fn delete_test(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM test_definitions WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete test: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Test not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn fetch_test(pool: &SqlitePool, id: i64) -> Result<TestDefinition, AppError> {
    sqlx::query_as::<_, TestDefinition>(
        "SELECT id, title, description, created_at FROM test_definitions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Test not found".to_string()))
}

/// A test's questions in position order, answers included. Used for
/// grading; not exposed to clients directly.
pub(crate) async fn test_questions(
    pool: &SqlitePool,
    test_id: i64,
) -> Result<Vec<Question>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT q.id, q.prompt, q.options, q.answer, q.weight, q.created_at
        FROM questions q
        JOIN test_questions tq ON tq.question_id = q.id
        WHERE tq.test_id = ?
        ORDER BY tq.position
        "#,
    )
    .bind(test_id)
    .fetch_all(pool)
    .await?;

    Ok(questions)
}
