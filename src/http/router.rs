//! Router configuration for the HTTP API.
//!
//! One route prefix per entity, five CRUD operations each, plus a health
//! endpoint. Middleware: request tracing and permissive CORS.

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS for development; restrict in production deployments.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/subjects",
            get(handlers::list_subjects).post(handlers::create_subject),
        )
        .route(
            "/subjects/{id}",
            get(handlers::get_subject)
                .put(handlers::update_subject)
                .delete(handlers::delete_subject),
        )
        .route(
            "/teachers",
            get(handlers::list_teachers).post(handlers::create_teacher),
        )
        .route(
            "/teachers/{id}",
            get(handlers::get_teacher)
                .put(handlers::update_teacher)
                .delete(handlers::delete_teacher),
        )
        .route(
            "/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/students/{id}",
            get(handlers::get_student)
                .put(handlers::update_student)
                .delete(handlers::delete_student),
        )
        .route(
            "/grades",
            get(handlers::list_grades).post(handlers::create_grade),
        )
        .route(
            "/grades/{id}",
            get(handlers::get_grade)
                .put(handlers::update_grade)
                .delete(handlers::delete_grade),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RepositoryFactory;

    #[test]
    fn router_builds_with_local_repository() {
        let state = AppState::new(RepositoryFactory::create_local());
        let _router = create_router(state);
    }
}
