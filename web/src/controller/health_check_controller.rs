use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET liveness of the API router
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}
