//! Incoming HTTP request type handed to handlers.

use bytes::Bytes;
use http::HeaderMap;

use crate::params::Params;

/// An incoming request with its body collected and its route values bound.
pub struct Request {
    method: http::Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    params: Params,
}

impl Request {
    pub(crate) fn new(parts: http::request::Parts, body: Bytes, params: Params) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            body,
            params,
        }
    }

    pub fn method(&self) -> &http::Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn params(&self) -> &Params { &self.params }

    /// Header lookup; names are case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a route value.
    ///
    /// For a route `/users/{id:int}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    /// Absent optional parameters return `None`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}
