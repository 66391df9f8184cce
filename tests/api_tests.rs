// tests/api_tests.rs

use assessment_backend::{
    config::{AttemptPolicy, Config},
    routes,
    state::AppState,
};
use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// Each test gets its own in-memory SQLite database. The pool is pinned
/// to a single connection so the in-memory database survives for the
/// whole test.
async fn spawn_app(policy: AttemptPolicy) -> String {
    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        rust_log: "error".to_string(),
        port: 0,
        attempt_policy: policy,
    };

    let state = AppState::new(pool, config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn create_question(
    client: &reqwest::Client,
    address: &str,
    prompt: &str,
    answer: &str,
    weight: f64,
) -> i64 {
    let response = client
        .post(format!("{}/api/questions", address))
        .json(&json!({
            "prompt": prompt,
            "options": ["A", "B", "C", "D"],
            "answer": answer,
            "weight": weight,
        }))
        .send()
        .await
        .expect("Failed to create question");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn create_test(client: &reqwest::Client, address: &str, question_ids: &[i64]) -> i64 {
    let response = client
        .post(format!("{}/api/tests", address))
        .json(&json!({
            "title": "Sample test",
            "question_ids": question_ids,
        }))
        .send()
        .await
        .expect("Failed to create test");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

async fn submit(
    client: &reqwest::Client,
    address: &str,
    test_id: i64,
    user_id: i64,
    answers: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/tests/{}/submissions", address, test_id))
        .json(&json!({ "user_id": user_id, "answers": answers }))
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn health_check_works() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn create_question_enforces_invariants() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    // Answer not among the options
    let response = client
        .post(format!("{}/api/questions", address))
        .json(&json!({
            "prompt": "Pick one",
            "options": ["A", "B"],
            "answer": "Z",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Non-positive weight
    let response = client
        .post(format!("{}/api/questions", address))
        .json(&json!({
            "prompt": "Pick one",
            "options": ["A", "B"],
            "answer": "A",
            "weight": 0.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn half_right_submission_scores_fifty() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let q1 = create_question(&client, &address, "Q1", "A", 1.0).await;
    let q2 = create_question(&client, &address, "Q2", "B", 1.0).await;
    let test_id = create_test(&client, &address, &[q1, q2]).await;

    // Unknown ids and garbage keys must be ignored, not rejected.
    let response = submit(
        &client,
        &address,
        test_id,
        7,
        json!({
            (q1.to_string()): "A",
            (q2.to_string()): "C",
            "999999": "A",
            "not-an-id": "B",
        }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 201);
    let attempt: Value = response.json().await.unwrap();

    assert_eq!(attempt["score"].as_f64(), Some(50.0));
    assert_eq!(attempt["is_graded"], true);

    let breakdown = attempt["breakdown"].as_array().unwrap();
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0]["question_id"].as_i64(), Some(q1));
    assert_eq!(breakdown[0]["correct"], true);
    assert_eq!(breakdown[1]["correct"], false);
    assert_eq!(breakdown[1]["submitted"], "C");
    assert_eq!(breakdown[1]["correct_answer"], "B");

    // The graded attempt is retrievable by id.
    let id = attempt["id"].as_i64().unwrap();
    let fetched: Value = client
        .get(format!("{}/api/submissions/{}", address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["score"].as_f64(), Some(50.0));
}

#[tokio::test]
async fn all_correct_scores_one_hundred_and_empty_scores_zero() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let q1 = create_question(&client, &address, "Q1", "A", 1.0).await;
    let q2 = create_question(&client, &address, "Q2", "B", 2.0).await;
    let test_id = create_test(&client, &address, &[q1, q2]).await;

    let response = submit(
        &client,
        &address,
        test_id,
        1,
        json!({ (q1.to_string()): "A", (q2.to_string()): "B" }),
    )
    .await;
    let attempt: Value = response.json().await.unwrap();
    assert_eq!(attempt["score"].as_f64(), Some(100.0));

    let response = submit(&client, &address, test_id, 2, json!({})).await;
    assert_eq!(response.status().as_u16(), 201);
    let attempt: Value = response.json().await.unwrap();
    assert_eq!(attempt["score"].as_f64(), Some(0.0));
}

#[tokio::test]
async fn weights_are_respected() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let q1 = create_question(&client, &address, "Q1", "A", 1.0).await;
    let q2 = create_question(&client, &address, "Q2", "B", 3.0).await;
    let test_id = create_test(&client, &address, &[q1, q2]).await;

    // Only the weight-3 question answered correctly: 75%.
    let response = submit(
        &client,
        &address,
        test_id,
        1,
        json!({ (q2.to_string()): "B" }),
    )
    .await;
    let attempt: Value = response.json().await.unwrap();
    assert_eq!(attempt["score"].as_f64(), Some(75.0));
}

#[tokio::test]
async fn empty_test_is_ungradable() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let test_id = create_test(&client, &address, &[]).await;

    let response = submit(&client, &address, test_id, 1, json!({ "1": "A" })).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn non_object_answers_are_rejected() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let q1 = create_question(&client, &address, "Q1", "A", 1.0).await;
    let test_id = create_test(&client, &address, &[q1]).await;

    let response = submit(&client, &address, test_id, 1, json!(["A", "B"])).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn submitting_to_missing_test_returns_404() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let response = submit(&client, &address, 424242, 1, json!({})).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn missing_attempt_returns_404() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/submissions/424242", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_detail_hides_correct_answers() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let q1 = create_question(&client, &address, "Q1", "A", 1.0).await;
    let test_id = create_test(&client, &address, &[q1]).await;

    let detail: Value = client
        .get(format!("{}/api/tests/{}", address, test_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let questions = detail["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0]["prompt"], "Q1");
    assert!(questions[0].get("answer").is_none());
}

#[tokio::test]
async fn allow_multiple_policy_keeps_attempt_history() {
    let address = spawn_app(AttemptPolicy::AllowMultiple).await;
    let client = reqwest::Client::new();

    let q1 = create_question(&client, &address, "Q1", "A", 1.0).await;
    let test_id = create_test(&client, &address, &[q1]).await;

    let first = submit(&client, &address, test_id, 7, json!({})).await;
    assert_eq!(first.status().as_u16(), 201);
    let second = submit(
        &client,
        &address,
        test_id,
        7,
        json!({ (q1.to_string()): "A" }),
    )
    .await;
    assert_eq!(second.status().as_u16(), 201);

    let attempts: Value = client
        .get(format!(
            "{}/api/tests/{}/submissions?user_id=7",
            address, test_id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let attempts = attempts.as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    // Most recent first
    assert_eq!(attempts[0]["score"].as_f64(), Some(100.0));
    assert_eq!(attempts[1]["score"].as_f64(), Some(0.0));
    assert!(attempts[0]["id"].as_i64() > attempts[1]["id"].as_i64());
}

#[tokio::test]
async fn first_attempt_only_policy_rejects_repeat_submission() {
    let address = spawn_app(AttemptPolicy::FirstAttemptOnly).await;
    let client = reqwest::Client::new();

    let q1 = create_question(&client, &address, "Q1", "A", 1.0).await;
    let test_id = create_test(&client, &address, &[q1]).await;

    let first = submit(
        &client,
        &address,
        test_id,
        7,
        json!({ (q1.to_string()): "A" }),
    )
    .await;
    assert_eq!(first.status().as_u16(), 201);

    let second = submit(&client, &address, test_id, 7, json!({})).await;
    assert_eq!(second.status().as_u16(), 409);

    // A different user is unaffected.
    let other = submit(&client, &address, test_id, 8, json!({})).await;
    assert_eq!(other.status().as_u16(), 201);

    let attempts: Value = client
        .get(format!(
            "{}/api/tests/{}/submissions?user_id=7",
            address, test_id
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(attempts.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_first_attempts_never_both_succeed() {
    let address = spawn_app(AttemptPolicy::FirstAttemptOnly).await;
    let client = reqwest::Client::new();

    let q1 = create_question(&client, &address, "Q1", "A", 1.0).await;
    let test_id = create_test(&client, &address, &[q1]).await;

    let (a, b) = tokio::join!(
        submit(&client, &address, test_id, 7, json!({ (q1.to_string()): "A" })),
        submit(&client, &address, test_id, 7, json!({ (q1.to_string()): "B" })),
    );

    let statuses = [a.status().as_u16(), b.status().as_u16()];
    assert_eq!(
        statuses.iter().filter(|s| **s == 201).count(),
        1,
        "exactly one submission must win, got {:?}",
        statuses
    );
    assert_eq!(statuses.iter().filter(|s| **s == 409).count(), 1);
}
