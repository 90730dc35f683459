//! LEXy - legal assistance service.
//!
//! Clients describe a legal problem, the system analyzes it, routes them
//! to a matching AI lawyer persona and carries the chat, with conversation
//! continuity held in an expiring session cache.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
