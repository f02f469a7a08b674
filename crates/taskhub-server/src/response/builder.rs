//! Response builder utilities.

use super::pagination::PageMeta;
use super::types::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Builder for constructing API responses.
pub struct ResponseBuilder<T> {
    status: StatusCode,
    body: ApiResponse<T>,
}

impl<T: Serialize> ResponseBuilder<T> {
    /// Create a new response builder.
    pub fn new(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: ApiResponse::success(data),
        }
    }

    /// Set HTTP status code.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.body = self.body.with_message(message);
        self
    }

    pub fn meta(mut self, meta: PageMeta) -> Self {
        self.body = self.body.with_meta(meta);
        self
    }

    /// Build the response.
    pub fn build(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl<T: Serialize> IntoResponse for ResponseBuilder<T> {
    fn into_response(self) -> Response {
        self.build()
    }
}

/// 200 with data and a message.
pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    ResponseBuilder::new(data).message(message).build()
}

/// Create a 201 Created response.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    ResponseBuilder::new(data)
        .status(StatusCode::CREATED)
        .message(message)
        .build()
}

/// 200 with a message and no data.
pub fn message_only(message: impl Into<String>) -> Response {
    Json(ApiResponse::message(message)).into_response()
}

/// 200 with a page of items and its metadata.
pub fn paginated<T: Serialize>(items: Vec<T>, meta: PageMeta) -> Response {
    ResponseBuilder::new(items).meta(meta).build()
}
