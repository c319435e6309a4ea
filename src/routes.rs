// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, quiz},
    state::AppState,
    utils::jwt::{auth_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quiz, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (quiz engine and configuration).
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
        .route("/login", post(auth::login))
        .route("/teacher", post(auth::teacher_login));

    let quiz_routes = Router::new()
        .route("/bank", get(quiz::bank_summary))
        .route("/sessions", post(quiz::start_session))
        .route("/sessions/{id}", get(quiz::get_paper))
        .route("/sessions/{id}/answers/{row_id}", put(quiz::set_answer))
        .route("/sessions/{id}/finish", post(quiz::finish_session))
        .route("/sessions/{id}/result", get(quiz::get_result))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/questions", post(admin::create_question))
        .route("/questions/import", post(admin::import_questions))
        .route("/questions/{id}", delete(admin::delete_question))
        // Auth runs first (outermost), then the teacher check
        .layer(middleware::from_fn(teacher_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
