//! Pass-through response writer that records status and body size.

use std::io;

use axum::http::{HeaderMap, StatusCode};

use crate::http::response::ResponseWriter;

/// Wraps a `ResponseWriter`, observing every write and status change
/// without altering either.
pub struct ResponseObserver<'a, W: ResponseWriter + ?Sized> {
    inner: &'a mut W,
    status: Option<StatusCode>,
    bytes_written: u64,
}

impl<'a, W: ResponseWriter + ?Sized> ResponseObserver<'a, W> {
    pub fn new(inner: &'a mut W) -> Self {
        Self {
            inner,
            status: None,
            bytes_written: 0,
        }
    }

    /// Status passed to `write_header`, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Sum of the lengths of every buffer handed to `write`.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for ResponseObserver<'_, W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Counted in full even when the sink accepts less or fails.
        self.bytes_written += buf.len() as u64;
        self.inner.write(buf)
    }

    fn write_header(&mut self, status: StatusCode) {
        self.status = Some(status);
        self.inner.write_header(status);
    }
}
