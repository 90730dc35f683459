//! HTTP surface for request submission and status polling.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::RequestAppState;
pub use routes::request_routes;
