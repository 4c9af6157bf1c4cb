//! Immutable request value: method, target URI, headers, body.

use std::fmt;

use crate::headers::{HeaderValues, Headers};
use crate::message::Message;
use crate::stream::Body;
use crate::uri::Uri;

/// Well-known request methods, as a convenience; any token is accepted by
/// [`Request::with_method`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable HTTP request.
///
/// Every `with_*` method returns a new value with exactly one field changed;
/// the receiver is never mutated. The header table is copied per instance,
/// the body handle is shared until replaced.
#[derive(Clone, Debug)]
pub struct Request {
    message: Message,
    method: String,
    request_target: Option<String>,
    uri: Uri,
}

impl Request {
    /// Build a request for `method` and `uri`. The Host header is derived
    /// from the URI and placed first in the header block.
    pub fn new(method: impl AsRef<str>, uri: Uri) -> Self {
        let mut request = Request {
            message: Message::new(),
            method: normalize_method(method.as_ref()),
            request_target: None,
            uri,
        };
        request.sync_host_header();

        request
    }

    fn sync_host_header(&mut self) {
        let host = self.uri.host();
        if host.is_empty() {
            return;
        }

        let value = match self.uri.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        self.message.headers.unshift("Host", value);
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Derive a request with a different method. Free-form tokens are
    /// uppercased.
    pub fn with_method(&self, method: impl AsRef<str>) -> Self {
        let method = normalize_method(method.as_ref());
        if method == self.method {
            return self.clone();
        }

        let mut new = self.clone();
        new.method = method;

        new
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Derive a request bound to `uri`. Unless `preserve_host` is set and a
    /// Host header already exists, the Host header is resynchronized from
    /// the new URI.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let mut new = self.clone();
        new.uri = uri;

        if !preserve_host || !self.has_header("host") {
            new.sync_host_header();
        }

        new
    }

    /// The request target: an explicit override if set, otherwise the URI's
    /// path (`/` when empty) plus `?query`.
    pub fn request_target(&self) -> String {
        if let Some(target) = &self.request_target {
            return target.clone();
        }

        let mut target = self.uri.path().to_string();
        if target.is_empty() {
            target.push('/');
        }
        if !self.uri.query().is_empty() {
            target.push('?');
            target.push_str(self.uri.query());
        }

        target
    }

    pub fn with_request_target(&self, target: &str) -> Self {
        if self.request_target.as_deref() == Some(target) {
            return self.clone();
        }

        let mut new = self.clone();
        new.request_target = Some(target.to_string());

        new
    }

    pub fn protocol_version(&self) -> &str {
        &self.message.protocol
    }

    pub fn with_protocol_version(&self, version: &str) -> Self {
        let mut new = self.clone();
        new.message.protocol = version.to_string();

        new
    }

    pub fn headers(&self) -> &Headers {
        &self.message.headers
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.message.headers.has(name)
    }

    pub fn header(&self, name: &str) -> &[String] {
        self.message.headers.get(name)
    }

    pub fn header_line(&self, name: &str) -> String {
        self.message.headers.get_line(name)
    }

    /// Derive a request with `name` replaced by `values`.
    pub fn with_header(&self, name: &str, values: impl Into<HeaderValues>) -> Self {
        let mut new = self.clone();
        new.message.headers.set(name, values.into(), false);

        new
    }

    /// Derive a request with `values` appended under `name`.
    pub fn with_added_header(&self, name: &str, values: impl Into<HeaderValues>) -> Self {
        let mut new = self.clone();
        new.message.headers.set(name, values.into(), true);

        new
    }

    pub fn without_header(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.message.headers.remove(name);

        new
    }

    pub fn body(&self) -> &Body {
        &self.message.body
    }

    /// Derive a request carrying `body`. Ownership of the stream transfers
    /// with the handle.
    pub fn with_body(&self, body: Body) -> Self {
        let mut new = self.clone();
        new.message.body = body;

        new
    }
}

fn normalize_method(method: &str) -> String {
    method.to_ascii_uppercase()
}
