//! HTTP API module for the Crew Tax Engine.
//!
//! This module provides the REST endpoint that turns a roster into a
//! deduction report.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::CalculationRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
