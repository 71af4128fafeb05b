//! Docker Hub passthrough endpoints. These need no credentials.

pub mod handlers;
pub mod routes;
