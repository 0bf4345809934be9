use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateParams {
    /// One of `started`, `in-progress` or `completed`.
    pub(crate) status: String,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationParams {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}
