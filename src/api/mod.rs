//! Request/response types shared by the backend and the CLI.
//!
//! Display records are produced by the formatters in `crate::format` and
//! serialized as-is by the HTTP API.

pub mod models;
