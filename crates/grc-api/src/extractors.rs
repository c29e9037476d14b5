//! # Extraction Helpers
//!
//! Handlers take `Result<Extractor<T>, Rejection>` and pass it through one
//! of these helpers, so malformed bodies, paths and query strings become
//! [`AppError::BadRequest`] with the structured error body instead of
//! axum's plain-text rejection.
//!
//! ```ignore
//! async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
//!     let req = extract_json(body)?;
//! }
//! ```

use std::str::FromStr;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use grc_core::GrcError;

use crate::error::AppError;

pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Parse a comma-separated id list such as `framework_ids=a,b`.
///
/// Blank segments are ignored; a list with no ids at all is `None`
/// (no restriction). A malformed id is a validation error.
pub fn parse_id_list<T>(raw: Option<&str>) -> Result<Option<Vec<T>>, AppError>
where
    T: FromStr<Err = GrcError>,
{
    let Some(raw) = raw else {
        return Ok(None);
    };
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(T::from_str)
        .collect::<Result<Vec<T>, GrcError>>()?;
    Ok(if ids.is_empty() { None } else { Some(ids) })
}

/// Treat an empty query value as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
