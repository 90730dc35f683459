//! Emergency request aggregate and its analysis lifecycle.

mod aggregate;
mod status;

pub use aggregate::{
    EmergencyRequest, RequestOrigin, MIN_PROBLEM_CHARS, TEXT_SUMMARY_CHARS, UNRESPONSIVE_SUMMARY,
};
pub use status::{RequestStatus, ResponseFormat, Urgency};
