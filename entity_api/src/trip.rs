use super::error::Error;
use crate::Store;
use entity::trip_status::TripStatus;
use entity::trips::Model;
use entity::Id;

use log::*;

/// Fields supplied by the caller when a trip is created for a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub dispatch_id: Id,
    pub driver_id: Id,
    pub vehicle_id: Id,
    pub destination: String,
    pub recipient_name: String,
}

/// Insert a new trip. Trips start out `started` at (0, 0).
pub fn create(store: &Store, new_trip: NewTrip) -> Result<Model, Error> {
    debug!("New Trip to be inserted: {new_trip:?}");

    let trip = Model {
        id: store.next_trip_id(),
        dispatch_id: new_trip.dispatch_id,
        driver_id: new_trip.driver_id,
        vehicle_id: new_trip.vehicle_id,
        destination: new_trip.destination,
        recipient_name: new_trip.recipient_name,
        status: TripStatus::Started,
        latitude: 0.0,
        longitude: 0.0,
        last_updated: chrono::Utc::now(),
    };

    store.trips.insert(trip.id, trip.clone());
    Ok(trip)
}

pub fn find_by_id(store: &Store, id: Id) -> Result<Model, Error> {
    store
        .trips
        .get(&id)
        .map(|trip| trip.clone())
        .ok_or_else(Error::not_found)
}

/// All trips that have not been completed, ordered by id.
pub fn find_active(store: &Store) -> Vec<Model> {
    let mut trips: Vec<Model> = store
        .trips
        .iter()
        .filter(|trip| !trip.is_completed())
        .map(|trip| trip.clone())
        .collect();
    trips.sort_by_key(|trip| trip.id);
    trips
}

pub fn find_by_dispatch_id(store: &Store, dispatch_id: Id) -> Vec<Model> {
    let mut trips: Vec<Model> = store
        .trips
        .iter()
        .filter(|trip| trip.dispatch_id == dispatch_id)
        .map(|trip| trip.clone())
        .collect();
    trips.sort_by_key(|trip| trip.id);
    trips
}

/// Overwrite a trip's status and position.
pub fn update(
    store: &Store,
    id: Id,
    status: TripStatus,
    latitude: f64,
    longitude: f64,
) -> Result<Model, Error> {
    match store.trips.get_mut(&id) {
        Some(mut trip) => {
            debug!("Existing Trip model to be Updated: {:?}", *trip);

            trip.status = status;
            trip.latitude = latitude;
            trip.longitude = longitude;
            trip.last_updated = chrono::Utc::now();
            Ok(trip.clone())
        }
        None => {
            error!("Trip with id {id} not found");
            Err(Error::not_found())
        }
    }
}

/// Move a trip that is still underway. Completed trips are left untouched.
pub fn update_location(
    store: &Store,
    id: Id,
    latitude: f64,
    longitude: f64,
) -> Result<Model, Error> {
    match store.trips.get_mut(&id) {
        Some(trip) if trip.is_completed() => {
            warn!("Trip {id} is already completed, ignoring location update");
            Err(Error::not_updated())
        }
        Some(mut trip) => {
            trip.latitude = latitude;
            trip.longitude = longitude;
            trip.last_updated = chrono::Utc::now();
            Ok(trip.clone())
        }
        None => {
            error!("Trip with id {id} not found");
            Err(Error::not_found())
        }
    }
}

pub fn complete(store: &Store, id: Id) -> Result<Model, Error> {
    match store.trips.get_mut(&id) {
        Some(mut trip) => {
            trip.status = TripStatus::Completed;
            trip.last_updated = chrono::Utc::now();
            Ok(trip.clone())
        }
        None => {
            error!("Trip with id {id} not found");
            Err(Error::not_found())
        }
    }
}

/// Remove a trip, returning its last state.
pub fn delete(store: &Store, id: Id) -> Result<Model, Error> {
    store
        .trips
        .remove(&id)
        .map(|(_, trip)| trip)
        .ok_or_else(Error::not_found)
}
