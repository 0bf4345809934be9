use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::params::trip::{LocationParams, UpdateParams};
use crate::{AppState, Error};
use domain::{trip as TripApi, trip_status::TripStatus, Id};
use log::*;

/// GET all trips that have not been completed
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all active Trips");

    let trips = TripApi::find_active(app_state.store_ref());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), trips)))
}

/// GET a particular Trip specified by its id.
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Trip by id: {id}");

    let trip = TripApi::find_by_id(app_state.store_ref(), id)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), trip)))
}

/// GET all trips created for a dispatch
pub async fn index_by_dispatch(
    State(app_state): State<AppState>,
    Path(dispatch_id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all Trips for Dispatch: {dispatch_id}");

    let trips = TripApi::find_by_dispatch_id(app_state.store_ref(), dispatch_id);

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), trips)))
}

/// PUT overwrite a Trip's status and position
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update Trip {id} with: {params:?}");

    let status = params.status.parse::<TripStatus>()?;
    let trip = TripApi::update(
        app_state.store_ref(),
        &app_state.event_publisher,
        id,
        status,
        params.latitude,
        params.longitude,
    )?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), trip)))
}

/// PUT a new position for a Trip that is still underway
pub async fn update_location(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<LocationParams>,
) -> Result<impl IntoResponse, Error> {
    trace!("PUT Trip {id} location: {params:?}");

    let trip = TripApi::update_location(
        app_state.store_ref(),
        &app_state.event_publisher,
        id,
        params.latitude,
        params.longitude,
    )?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), trip)))
}

/// PUT mark a Trip as completed
pub async fn complete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Complete Trip: {id}");

    TripApi::complete(app_state.store_ref(), &app_state.event_publisher, id)?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE a Trip specified by its id.
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE Trip by id: {id}");

    TripApi::delete(app_state.store_ref(), &app_state.event_publisher, id)?;

    Ok(StatusCode::NO_CONTENT)
}
