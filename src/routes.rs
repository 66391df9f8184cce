// src/routes.rs

use std::time::Duration;

use axum::{
    Json, Router,
    http::Method,
    response::IntoResponse,
    routing::get,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{attempts, questions, test_defs},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (questions, tests, submissions).
/// * Applies global middleware (Trace, CORS, request timeout).
/// * Injects global state (pool, config, ledger).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:5173".parse().unwrap(),
        "http://127.0.0.1:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let question_routes = Router::new()
        .route(
            "/",
            get(questions::list_questions).post(questions::create_question),
        )
        .route(
            "/{id}",
            get(questions::get_question)
                .put(questions::update_question)
                .delete(questions::delete_question),
        );

    let test_routes = Router::new()
        .route("/", get(test_defs::list_tests).post(test_defs::create_test))
        .route(
            "/{id}",
            get(test_defs::get_test).delete(test_defs::delete_test),
        )
        .route(
            "/{id}/submissions",
            get(attempts::list_test_attempts).post(attempts::submit_attempt),
        );

    Router::new()
        .route("/api/health", get(health))
        .nest("/api/questions", question_routes)
        .nest("/api/tests", test_routes)
        .route("/api/submissions/{id}", get(attempts::get_attempt))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Grading is short-running; anything slower than this is stuck.
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
