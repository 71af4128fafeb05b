//! Listing endpoints backed by the Artifact Registry adapter.

pub mod handlers;
pub mod models;
pub mod routes;
