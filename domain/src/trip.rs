use crate::error::Error;
use entity_api::trip as trip_api;
use entity_api::{trip_status::TripStatus, trips::Model, Id, Store};
use events::{EventPublisher, TripEvent};

use log::*;

pub use entity_api::trip::{find_active, find_by_dispatch_id, find_by_id, NewTrip};

pub fn create(
    store: &Store,
    publisher: &EventPublisher,
    new_trip: NewTrip,
) -> Result<Model, Error> {
    let trip = trip_api::create(store, new_trip)?;
    info!("Created trip {} for driver {}", trip.id, trip.driver_id);

    publisher.publish(TripEvent::created(trip.clone()));
    Ok(trip)
}

pub fn update(
    store: &Store,
    publisher: &EventPublisher,
    id: Id,
    status: TripStatus,
    latitude: f64,
    longitude: f64,
) -> Result<Model, Error> {
    let trip = trip_api::update(store, id, status, latitude, longitude)?;

    publisher.publish(TripEvent::updated(trip.clone()));
    Ok(trip)
}

/// Record a new position for a trip that is still underway and publish it to
/// the trip's observers.
pub fn update_location(
    store: &Store,
    publisher: &EventPublisher,
    id: Id,
    latitude: f64,
    longitude: f64,
) -> Result<Model, Error> {
    let trip = trip_api::update_location(store, id, latitude, longitude)?;
    trace!("Trip {id} moved to ({latitude}, {longitude})");

    publisher.publish(TripEvent::location_changed(trip.clone()));
    Ok(trip)
}

pub fn complete(store: &Store, publisher: &EventPublisher, id: Id) -> Result<Model, Error> {
    let trip = trip_api::complete(store, id)?;
    info!("Completed trip {id}");

    publisher.publish(TripEvent::completed(trip.clone()));
    Ok(trip)
}

pub fn delete(store: &Store, publisher: &EventPublisher, id: Id) -> Result<Model, Error> {
    let trip = trip_api::delete(store, id)?;
    info!("Deleted trip {id}");

    publisher.publish(TripEvent::deleted(trip.clone()));
    Ok(trip)
}
