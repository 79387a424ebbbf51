//! Response envelopes.
//!
//! Every successful API response is `{ "data": ... }`. [`DataResponse`]
//! owns that envelope and renders itself, so handlers return
//! `DataResponse::new(payload)` (or [`created`] for 201s) instead of
//! hand-assembling status/JSON pairs.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

/// The standard `{ "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    data: T,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for DataResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// A `201 Created` response wrapping the new resource in the envelope.
pub fn created<T: Serialize>(data: T) -> (StatusCode, DataResponse<T>) {
    (StatusCode::CREATED, DataResponse::new(data))
}
