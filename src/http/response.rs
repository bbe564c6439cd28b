//! Response sinks.
//!
//! # Responsibilities
//! - Define the `ResponseWriter` seam handlers write through
//! - Buffer a handler's output and hand it to axum as a `Response`
//!
//! # Design Decisions
//! - Writes are synchronous; the buffered sink never blocks
//! - Status is implicit (200) until `write_header` is called
//! - Headers are mutable until the response is converted

use std::io;

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

/// Outgoing response sink: header map, byte-stream write, explicit status.
pub trait ResponseWriter: Send {
    /// Mutable access to the response headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Append `buf` to the response body, returning the bytes accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Set the response status code.
    fn write_header(&mut self, status: StatusCode);
}

/// In-memory `ResponseWriter` converted into an axum `Response` once the
/// handler has finished.
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status the response will be sent with.
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn write_header(&mut self, status: StatusCode) {
        self.status = Some(status);
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}
