// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response envelope and the mapping from domain errors to HTTP status.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nostalgic_core::NostalgicError;
use serde::Serialize;

/// Message sent for every server-side failure.
const INTERNAL_ERROR: &str = "internal error";

#[derive(Debug, Serialize)]
struct Success<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct Failure<'a> {
    success: bool,
    error: &'a str,
}

/// `{"success": true, "data": data}` with status 200.
pub fn ok<T: Serialize>(data: T) -> Response {
    Json(Success {
        success: true,
        data,
    })
    .into_response()
}

/// A domain error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub NostalgicError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(NostalgicError::validation(message))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            NostalgicError::Validation(_) => StatusCode::BAD_REQUEST,
            NostalgicError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<NostalgicError> for ApiError {
    fn from(err: NostalgicError) -> Self {
        Self(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self(NostalgicError::Internal(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
            INTERNAL_ERROR.to_string()
        } else {
            self.0.to_string()
        };
        let body = Failure {
            success: false,
            error: &message,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError(NostalgicError::not_found("x")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(NostalgicError::storage("disk")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(NostalgicError::Internal("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
