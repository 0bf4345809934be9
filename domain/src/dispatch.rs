use crate::error::Error;
use crate::trip;
use entity_api::dispatch as dispatch_api;
use entity_api::trip::NewTrip;
use entity_api::{dispatches, trips, Store};
use events::EventPublisher;
use serde::Serialize;

use log::*;

pub use entity_api::dispatch::{find_all, find_by_id};

/// A dispatch together with the trip created to carry it out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedDispatch {
    pub dispatch: dispatches::Model,
    pub trip: trips::Model,
}

/// Record a dispatch and create its trip, announcing the trip to observers.
pub fn create(
    store: &Store,
    publisher: &EventPublisher,
    dispatch_model: dispatches::Model,
) -> Result<CreatedDispatch, Error> {
    let dispatch = dispatch_api::create(store, dispatch_model)?;
    debug!("New Dispatch: {dispatch:?}");

    let trip = trip::create(
        store,
        publisher,
        NewTrip {
            dispatch_id: dispatch.id,
            driver_id: dispatch.driver_id,
            vehicle_id: dispatch.vehicle_id,
            destination: dispatch.location.clone(),
            recipient_name: dispatch.recipient.clone(),
        },
    )?;

    Ok(CreatedDispatch { dispatch, trip })
}
