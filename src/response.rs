//! The response sink handlers write into.
//!
//! You should not need to think about this module much. A stage calls
//! [`write`](ResponseWriter::write) (and maybe [`set_status`](ResponseWriter::set_status)
//! or [`header`](ResponseWriter::header)), passes the writer along, and the
//! host adapter calls [`into_response`](ResponseWriter::into_response) once
//! the pipeline returns. That is the entire job description.

use bytes::{Bytes, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Response, StatusCode};
use http_body_util::Full;

/// A buffered response under construction.
///
/// Starts as `200 OK` with no headers and an empty body. Writes append;
/// nothing is flushed until [`into_response`](ResponseWriter::into_response),
/// so a stage early in the pipeline can still change the status after an
/// inner stage has written body bytes.
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
        }
    }

    /// Appends bytes to the response body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Sets a header, replacing any previous value for the same name.
    pub fn header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The body written so far. Handy in tests and in stages that key off
    /// what an inner stage produced.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Finalizes into the response type the host server sends on the wire.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut res = Response::new(Full::new(self.body.freeze()));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}
