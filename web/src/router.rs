use crate::controller::{
    dispatch_controller, health_check_controller, hub_controller, trip_controller,
};
use crate::{sse, ws, AppState};
use axum::{
    http::HeaderValue,
    routing::{get, put},
    Router,
};
use log::*;
use service::config::Config;
use tower_http::cors::{Any, CorsLayer};

pub fn define_routes(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config);

    Router::new()
        .merge(health_routes())
        .merge(trip_routes(app_state.clone()))
        .merge(dispatch_routes(app_state.clone()))
        .merge(hub_routes(app_state.clone()))
        .merge(sse_routes(app_state.clone()))
        .merge(ws_routes(app_state))
        .layer(cors)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn trip_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/admin/trips", get(trip_controller::index))
        .route(
            "/admin/trips/{id}",
            get(trip_controller::read)
                .put(trip_controller::update)
                .delete(trip_controller::delete),
        )
        .route("/admin/trips/{id}/complete", put(trip_controller::complete))
        .route(
            "/admin/trips/{id}/location",
            put(trip_controller::update_location),
        )
        .with_state(app_state)
}

fn dispatch_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/admin/dispatches",
            get(dispatch_controller::index).post(dispatch_controller::create),
        )
        .route("/admin/dispatches/{id}", get(dispatch_controller::read))
        .route(
            "/admin/dispatches/{id}/trips",
            get(trip_controller::index_by_dispatch),
        )
        .with_state(app_state)
}

fn hub_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/admin/hub/stats", get(hub_controller::stats))
        .with_state(app_state)
}

fn sse_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/admin/trips/stream", get(sse::handler::stream_handler))
        .with_state(app_state)
}

fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/driver/trips/ws", get(ws::handler::ws_handler))
        .with_state(app_state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}
