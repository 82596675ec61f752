mod api;
mod errors;

pub use api::OrderFlowApi;
pub use errors::{OrderFlowError, ValidationError};
