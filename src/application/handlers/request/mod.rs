//! Request lifecycle handlers.

mod get_status;
mod submit_request;

pub use get_status::{GetRequestStatusHandler, GetStatusError, RequestSnapshot};
pub use submit_request::{
    SubmitRequestCommand, SubmitRequestError, SubmitRequestHandler, SubmitRequestResult,
};
