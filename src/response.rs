//! The JSON envelope that wraps every API response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// The body of every `/api` response.
///
/// Successful responses carry `data` and optionally a human readable
/// `message`. Failed responses carry `error` instead of `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// The requested resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// A message describing the outcome of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// A description of what went wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful response containing `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Attach a message to the response.
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
}

impl ApiResponse<()> {
    /// A failed response with the error message `error`.
    pub fn error(error: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(error.to_owned()),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// Serialize the envelope as the body of a response with `status`.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        self.into_response_with_status(StatusCode::OK)
    }
}
