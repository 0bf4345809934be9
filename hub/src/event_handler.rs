use crate::Hub;
use events::{EventHandler, TripEvent};
use std::sync::Arc;

/// Handles published trip events by fanning them out through the hub.
///
/// This is the only link between producers and the hub: producers hold an
/// `events::EventPublisher` with this handler registered and never see the
/// hub itself.
pub struct HubEventHandler {
    hub: Arc<Hub>,
}

impl HubEventHandler {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}

impl EventHandler for HubEventHandler {
    fn handle(&self, event: &TripEvent) {
        self.hub.publish(event.clone());
    }
}
