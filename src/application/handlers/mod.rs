//! Command and query handlers, one per operation.

pub mod chat;
pub mod lawyers;
pub mod request;
