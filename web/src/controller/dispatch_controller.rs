use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::controller::ApiResponse;
use crate::{AppState, Error};
use domain::{dispatch as DispatchApi, dispatches::Model, Id};
use log::*;

/// POST create a new Dispatch along with the Trip that carries it out
pub async fn create(
    State(app_state): State<AppState>,
    Json(dispatch_model): Json<Model>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST Create a New Dispatch from: {dispatch_model:?}");

    let created = DispatchApi::create(
        app_state.store_ref(),
        &app_state.event_publisher,
        dispatch_model,
    )?;

    debug!("New Dispatch: {:?}", created.dispatch);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), created)),
    ))
}

/// GET all Dispatches
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all Dispatches");

    let dispatches = DispatchApi::find_all(app_state.store_ref());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), dispatches)))
}

/// GET a particular Dispatch specified by its id.
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET Dispatch by id: {id}");

    let dispatch = DispatchApi::find_by_id(app_state.store_ref(), id)?;

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), dispatch)))
}
