//! Request extractors.

use crate::errors::AppError;
use axum::extract::FromRequest;

/// JSON body extractor whose rejections are reported as [`AppError`].
///
/// Syntax errors, type mismatches and a missing `Content-Type` all become
/// `AppError::MalformedRequest` with the usual `{"error": ...}` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
