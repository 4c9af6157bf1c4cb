//! Synchronous transport client: executes a request, rebuilds a response.
//!
//! # Design
//! `Client` holds only its configuration (an optional base URI, default
//! headers and default transport options) and carries no state between
//! calls. `send` blocks the calling thread for the whole exchange: the
//! request is mapped onto transport options and executed, with raw header
//! lines feeding an accumulator and body bytes buffering into a temp-file
//! stream before the immutable [`Response`] is built. Hard transport failures
//! surface as [`ClientError::Network`] carrying the outgoing request; an
//! HTTP error status is a valid response, not an error.

use log::debug;

use crate::error::ClientError;
use crate::headers::HeaderValues;
use crate::options::{HttpVersion, TransportOptions};
use crate::request::Request;
use crate::response::Response;
use crate::stream::{Body, Stream};
use crate::uri::Uri;
use crate::wire::{self, HeaderSink, Transfer};

/// Synchronous HTTP client over immutable request/response values.
#[derive(Clone, Debug, Default)]
pub struct Client {
    base_uri: Option<Uri>,
    default_headers: Vec<(String, HeaderValues)>,
    default_options: TransportOptions,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine every request URI with `base` before sending (restricted
    /// merge, see [`Uri::combine`]).
    pub fn base_uri(mut self, base: Uri) -> Self {
        self.base_uri = Some(base);
        self
    }

    /// A header applied to any request that does not already carry `name`.
    /// Caller-set headers are never overridden.
    pub fn default_header(mut self, name: &str, values: impl Into<HeaderValues>) -> Self {
        self.default_headers.push((name.to_string(), values.into()));
        self
    }

    /// Transport options applied to every send, under per-call overrides.
    pub fn default_options(mut self, options: TransportOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Execute `request` and block until the response is fully buffered.
    pub fn send(&self, request: &Request) -> Result<Response, ClientError> {
        self.send_with(request, &TransportOptions::new())
    }

    /// Like [`send`](Self::send), with per-call transport options overriding
    /// the client defaults and the values computed from the request.
    pub fn send_with(
        &self,
        request: &Request,
        options: &TransportOptions,
    ) -> Result<Response, ClientError> {
        let mut request = request.clone();

        for (name, values) in &self.default_headers {
            if !request.has_header(name) {
                request = request.with_header(name, values.clone());
            }
        }

        if let Some(base) = &self.base_uri {
            request = request.with_uri(base.combine(request.uri()), false);
        }

        let mut effective = TransportOptions::built_in().merge(&self.default_options);
        effective.method = Some(request.method().to_string());
        effective.url = Some(request.uri().to_string());
        effective.version = Some(HttpVersion::from_protocol(request.protocol_version()));

        let mut lines = Vec::new();
        for (name, values) in request.headers().iter() {
            for value in values {
                lines.push(format!("{name}: {value}"));
            }
        }
        effective.header_lines = Some(lines);

        if options.body.is_none() && request.body().size().unwrap_or(0) > 0 {
            effective.body = Some(request.body().full_contents());
        }

        let effective = effective.merge(options);

        // The capture stream opens before any network activity; failing to
        // get one is an initialization error, not a network error.
        let mut body_stream = Stream::temp().map_err(ClientError::Init)?;

        let url_string = effective
            .url
            .clone()
            .unwrap_or_else(|| request.uri().to_string());
        let url = match Uri::parse(&url_string) {
            Ok(url) => url,
            Err(e) => {
                return Err(ClientError::Network {
                    request,
                    kind: crate::error::NetworkErrorKind::InvalidUrl,
                    message: e.to_string(),
                })
            }
        };

        let transfer = Transfer {
            method: effective.method.unwrap_or_else(|| "GET".to_string()),
            url,
            version: effective.version.unwrap_or(HttpVersion::Http11),
            header_lines: effective.header_lines.unwrap_or_default(),
            body: effective.body,
            connect_timeout: effective
                .connect_timeout
                .unwrap_or(std::time::Duration::from_secs(10)),
            timeout: effective
                .timeout
                .unwrap_or(std::time::Duration::from_secs(100)),
            follow_redirects: effective.follow_redirects.unwrap_or(true),
            max_redirects: effective.max_redirects.unwrap_or(20),
        };

        let mut sink = HeaderSink::new();
        if let Err(e) = wire::exchange(&transfer, &mut sink, &mut body_stream) {
            debug!("exchange failed ({}): {}", e.kind, e.message);
            return Err(ClientError::Network {
                request,
                kind: e.kind,
                message: e.message,
            });
        }

        body_stream.rewind().map_err(ClientError::Stream)?;

        let status = sink.status_or_default();
        let mut response = Response::with_reason(status, &sink.reason)
            .map_err(ClientError::Response)?
            .with_protocol_version(&sink.version)
            .with_body(Body::from_stream(body_stream));

        for (name, value) in &sink.headers {
            response = response.with_added_header(name.as_str(), value.as_str());
        }

        Ok(response)
    }
}
