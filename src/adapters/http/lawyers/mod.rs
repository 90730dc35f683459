//! HTTP surface for lawyer listing, recommendation and reviews.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::LawyersAppState;
pub use routes::lawyer_routes;
