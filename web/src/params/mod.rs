//! Request bodies accepted by the admin API.

pub(crate) mod trip;
