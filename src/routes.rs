// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, catalog, parent, quiz, student},
    state::AppState,
    utils::jwt::{auth_middleware, parent_middleware, student_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quiz, catalog, student, parent).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (document store, paths, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    let session_routes = Router::new()
        .route("/", get(auth::session))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Submit checks the token itself; anonymous callers are allowed.
    let quiz_routes = Router::new()
        .route("/questions", get(quiz::get_questions))
        .route("/submit", post(quiz::submit_quiz));

    let catalog_routes = Router::new()
        .route("/roadmap", get(catalog::get_roadmap))
        .route("/streams/{slug}", get(catalog::get_stream_guide));

    // Auth first, then the role check
    let student_routes = Router::new()
        .route("/results", get(student::get_results))
        .route("/results/stream", get(student::stream_results))
        .route("/roadmap/{step_id}/complete", post(student::complete_step))
        .route("/recommendations", get(student::get_recommendations))
        .layer(middleware::from_fn(student_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let parent_routes = Router::new()
        .route("/link", post(parent::link_student))
        .route("/student", get(parent::get_student))
        .route("/demo", get(parent::get_demo))
        .layer(middleware::from_fn(parent_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/session", session_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/catalog", catalog_routes)
        .nest("/api/student", student_routes)
        .nest("/api/parent", parent_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
