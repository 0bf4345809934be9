use config::Config;
use entity_api::Store;
use events::EventPublisher;
use hub::{Hub, HubEventHandler};
use log::info;
use std::sync::Arc;

pub mod config;
pub mod logging;

// Application state shared by every handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub hub: Arc<Hub>,
    pub event_publisher: EventPublisher,
}

impl AppState {
    /// Build the process-wide hub and wire producers to it.
    pub fn new(app_config: Config) -> Self {
        let hub = Arc::new(Hub::with_queue_capacity(
            app_config.subscriber_queue_capacity,
        ));
        info!(
            "Event hub ready: subscriber queue capacity={}, max session lifetime={:?}",
            hub.queue_capacity(),
            app_config.max_session_lifetime()
        );

        let event_publisher =
            EventPublisher::new().with_handler(Arc::new(HubEventHandler::new(Arc::clone(&hub))));

        Self {
            config: app_config,
            store: Arc::new(Store::new()),
            hub,
            event_publisher,
        }
    }

    pub fn store_ref(&self) -> &Store {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub::Filter;

    #[test]
    fn publisher_is_wired_to_the_shared_hub() {
        let app_state = AppState::new(Config::from_args(["dispatch_hub"]));
        let mut registration = app_state.hub.register(Filter::All);

        let created = stored_trip(&app_state);
        app_state
            .event_publisher
            .publish(events::TripEvent::created(created));

        assert_eq!(registration.receiver.try_recv().unwrap().entity_id(), 1);
        assert_eq!(app_state.hub.queue_capacity(), 10);
    }

    fn stored_trip(app_state: &AppState) -> entity_api::trips::Model {
        entity_api::trip::create(
            app_state.store_ref(),
            entity_api::trip::NewTrip {
                dispatch_id: 1,
                driver_id: 2,
                vehicle_id: 3,
                destination: "Nakuru".to_string(),
                recipient_name: "Chebet".to_string(),
            },
        )
        .unwrap()
    }
}
