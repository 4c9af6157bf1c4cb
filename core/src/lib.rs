//! Immutable HTTP message model with a synchronous transport client.
//!
//! # Overview
//! Requests, responses, URIs, headers and bodies are immutable value
//! objects: every `with_*` call derives a new value and never mutates the
//! receiver. [`Client`] bridges those values to a real exchange: it maps a
//! request onto transport options, runs the blocking HTTP exchange, feeds
//! the raw status/header lines through an accumulator and buffers the body
//! into a fresh seekable stream, then hands back an immutable [`Response`].
//!
//! # Design
//! - `Request`/`Response` share one message representation by composition;
//!   cloning copies the header table and shares the body handle.
//! - [`Uri::combine`] is a restricted base+relative merge, not RFC 3986
//!   reference resolution, and is what [`Client`] uses for its base URI.
//! - Transport failures are classified errors carrying the outgoing
//!   request; an HTTP error status is still a valid response.
//! - Everything is synchronous and single-threaded; bodies are `!Send` by
//!   construction and must not be shared across concurrent exchanges.

pub mod client;
pub mod error;
pub mod factory;
pub mod headers;
mod message;
pub mod options;
pub mod request;
pub mod response;
pub mod server;
pub mod stream;
pub mod upload;
pub mod uri;
mod wire;

pub use client::Client;
pub use error::{
    ClientError, FactoryError, MessageError, NetworkErrorKind, StreamError, UploadError, UriError,
};
pub use factory::{ContentType, RequestFactory};
pub use headers::{HeaderValues, Headers};
pub use options::{HttpVersion, TransportOptions};
pub use request::{Method, Request};
pub use response::Response;
pub use server::{ServerEnv, ServerRequest};
pub use stream::{Body, FileMode, Resource, Stream};
pub use upload::UploadedFile;
pub use uri::Uri;
