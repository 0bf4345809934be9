use entity::Id;
use events::TripEvent;
use std::fmt;
use std::sync::Arc;

/// Decides whether a subscription is interested in an event.
#[derive(Clone, Default)]
pub enum Filter {
    /// Every event. Used by broadcast observers.
    All,
    /// No event. A driver channel starts here until it names its driver.
    #[default]
    Nothing,
    /// Only events whose trip is assigned to the given driver.
    Driver(Id),
    /// An arbitrary predicate.
    Predicate(Arc<dyn Fn(&TripEvent) -> bool + Send + Sync>),
}

impl Filter {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&TripEvent) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Arc::new(f))
    }

    pub fn accepts(&self, event: &TripEvent) -> bool {
        match self {
            Filter::All => true,
            Filter::Nothing => false,
            Filter::Driver(driver_id) => event.driver_id() == *driver_id,
            Filter::Predicate(f) => f(event),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => write!(f, "All"),
            Filter::Nothing => write!(f, "Nothing"),
            Filter::Driver(driver_id) => write!(f, "Driver({driver_id})"),
            Filter::Predicate(_) => write!(f, "Predicate(..)"),
        }
    }
}
