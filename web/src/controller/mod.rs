use serde::Serialize;

pub(crate) mod dispatch_controller;
pub(crate) mod health_check_controller;
pub(crate) mod hub_controller;
pub(crate) mod trip_controller;

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    status_code: u16,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status_code: u16, data: T) -> Self {
        Self { status_code, data }
    }
}
