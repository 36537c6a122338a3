//! HTTP web UI and JSON API

pub mod handlers;
pub mod routes;

pub use routes::create_router;
