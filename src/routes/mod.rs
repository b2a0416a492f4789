pub mod auth;
pub mod categories;
pub mod health;
pub mod todos;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit, Path,
    },
    http::{header, Method},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::{AppError, AppResult},
    middleware::auth::JwtSecret,
    state::AppState,
};

/// Full application router: public health check, `/api/v1` resources and the
/// shared middleware stack.
pub fn router(state: AppState) -> Router {
    let jwt_secret = JwtSecret(state.config.jwt_secret.clone());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(AllowOrigin::any());

    let api = Router::new()
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        // Todos
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{id}",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo),
        )
        .route("/todos/{id}/toggle", patch(todos::toggle_todo));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api)
        .layer(Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Unwrap a JSON body, turning any rejection into a 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        AppError::invalid_input("Invalid request body")
    })
}

/// Unwrap a numeric `{id}` path segment, turning any rejection into a 400.
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>, entity: &str) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::invalid_input(format!("Invalid {entity} ID")))
}
