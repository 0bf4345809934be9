use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::AppState;
use log::*;

/// GET current subscription count and delivery counters of the event hub
pub async fn stats(State(app_state): State<AppState>) -> impl IntoResponse {
    let stats = app_state.hub.stats();
    trace!("GET Hub stats: {stats:?}");

    Json(ApiResponse::new(StatusCode::OK.into(), stats))
}
