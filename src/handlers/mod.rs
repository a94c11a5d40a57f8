//! HTTP handlers, one module per resource.
//!
//! Every protected handler names exactly one `Section` and calls
//! `session.require(section)?` before reading or writing anything.

pub mod account;
pub mod admin;
pub mod candidates;
pub mod communications;
pub mod documents;
pub mod evaluations;
pub mod jobs;

use crate::error::ApiError;

/// Lifts a request's `validate()` result into a 400.
pub(crate) fn validated(result: Result<(), String>) -> Result<(), ApiError> {
    result.map_err(ApiError::Validation)
}
