//! HTTP handlers, one module per resource.

mod comments;
mod entities;
mod projects;
mod stages;
mod system;
mod tasks;


pub use comments::*;
pub use entities::*;
pub use projects::*;
pub use stages::*;
pub use system::*;
pub use tasks::*;

use std::str::FromStr;

use axum::http::StatusCode;

use super::error::{ApiError, api_error};

/// Parse an optional enum query parameter, rejecting unknown values with 400.
pub(crate) fn parse_filter<T: FromStr<Err = String>>(
    raw: Option<&str>,
) -> Result<Option<T>, ApiError> {
    raw.map(|s| s.trim().parse::<T>())
        .transpose()
        .map_err(|message| api_error(StatusCode::BAD_REQUEST, "validation", message))
}
