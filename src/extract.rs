//! Body extractors whose rejections render in the JSON error shape.

use axum::body::Bytes;
use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json<T>` whose parse, content-type and size rejections become `AppError`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Raw request body; an over-limit body is answered as JSON too.
#[derive(Debug, FromRequest)]
#[from_request(rejection(AppError))]
pub struct RawBody(pub Bytes);
