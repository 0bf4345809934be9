use super::error::Error;
use crate::Store;
use entity::dispatches::Model;
use entity::Id;

use log::*;

/// Insert a new, unverified dispatch dated now.
pub fn create(store: &Store, dispatch_model: Model) -> Result<Model, Error> {
    debug!("New Dispatch Model to be inserted: {dispatch_model:?}");

    if dispatch_model.recipient.trim().is_empty() {
        return Err(Error::validation("recipient must not be empty"));
    }
    if dispatch_model.location.trim().is_empty() {
        return Err(Error::validation("location must not be empty"));
    }

    let dispatch = Model {
        id: store.next_dispatch_id(),
        date: chrono::Utc::now(),
        verified: false,
        ..dispatch_model
    };

    store.dispatches.insert(dispatch.id, dispatch.clone());
    Ok(dispatch)
}

pub fn find_by_id(store: &Store, id: Id) -> Result<Model, Error> {
    store
        .dispatches
        .get(&id)
        .map(|dispatch| dispatch.clone())
        .ok_or_else(Error::not_found)
}

/// All dispatches, ordered by id.
pub fn find_all(store: &Store) -> Vec<Model> {
    let mut dispatches: Vec<Model> = store
        .dispatches
        .iter()
        .map(|dispatch| dispatch.clone())
        .collect();
    dispatches.sort_by_key(|dispatch| dispatch.id);
    dispatches
}
