//! Error types for the message model and the transport client.
//!
//! # Design
//! One enum per concern so callers match on exactly the failures they can
//! handle. Construction errors (`UriError`, `MessageError`) fire before any
//! partially-valid value exists. `ClientError::Network` carries the request
//! as it went out, so diagnostics can see the final method/URI after default
//! headers and base-URI combination were applied.

use std::fmt;

use crate::request::Request;

/// Errors raised by [`Stream`](crate::stream::Stream) and
/// [`Body`](crate::stream::Body) operations.
#[derive(Debug)]
pub enum StreamError {
    /// The stream has been closed or detached; no operation remains valid.
    Detached,

    /// Read attempted on a stream without read access.
    NotReadable,

    /// Write attempted on a stream without write access.
    NotWritable,

    /// Seek attempted on a non-seekable stream.
    NotSeekable,

    /// The underlying resource failed.
    Io(std::io::Error),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Detached => write!(f, "stream is detached"),
            StreamError::NotReadable => write!(f, "cannot read from non-readable stream"),
            StreamError::NotWritable => write!(f, "cannot write to non-writable stream"),
            StreamError::NotSeekable => write!(f, "cannot seek in a non-seekable stream"),
            StreamError::Io(e) => write!(f, "stream I/O failed: {e}"),
        }
    }
}

impl std::error::Error for StreamError {}

/// Errors raised while constructing or deriving a [`Uri`](crate::uri::Uri).
#[derive(Debug)]
pub enum UriError {
    /// The input does not match the URI grammar.
    Parse(String),

    /// Port outside the valid 1..=65535 range.
    InvalidPort(u16),
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriError::Parse(input) => write!(f, "unable to parse URI: {input}"),
            UriError::InvalidPort(port) => {
                write!(f, "invalid port '{port}', must be between 1 and 65535")
            }
        }
    }
}

impl std::error::Error for UriError {}

/// Errors raised while constructing a message value.
#[derive(Debug)]
pub enum MessageError {
    /// Status code outside the valid 100..=599 range.
    InvalidStatusCode(u16),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::InvalidStatusCode(code) => {
                write!(f, "invalid HTTP status code: {code}")
            }
        }
    }
}

impl std::error::Error for MessageError {}

/// Errors raised by [`UploadedFile`](crate::upload::UploadedFile) operations.
#[derive(Debug)]
pub enum UploadError {
    /// The uploaded file has already been moved to its target.
    AlreadyMoved,

    /// No stream or file backs this uploaded file.
    NoBacking,

    /// `move_to` was called with an empty target path.
    EmptyTargetPath,

    /// The backing stream failed while copying.
    Stream(StreamError),

    /// Filesystem operation on the backing file or target failed.
    Io(std::io::Error),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::AlreadyMoved => write!(f, "uploaded file has already been moved"),
            UploadError::NoBacking => {
                write!(f, "no stream or file is available for this uploaded file")
            }
            UploadError::EmptyTargetPath => write!(f, "target path must not be empty"),
            UploadError::Stream(e) => write!(f, "uploaded file stream failed: {e}"),
            UploadError::Io(e) => write!(f, "uploaded file I/O failed: {e}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<StreamError> for UploadError {
    fn from(e: StreamError) -> Self {
        UploadError::Stream(e)
    }
}

/// Errors raised by the request factory while preparing a request.
#[derive(Debug)]
pub enum FactoryError {
    /// The supplied URI string could not be parsed.
    Uri(UriError),

    /// The body payload could not be serialized to JSON.
    Json(serde_json::Error),
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::Uri(e) => write!(f, "{e}"),
            FactoryError::Json(e) => write!(f, "failed to prepare request body: {e}"),
        }
    }
}

impl std::error::Error for FactoryError {}

impl From<UriError> for FactoryError {
    fn from(e: UriError) -> Self {
        FactoryError::Uri(e)
    }
}

impl From<serde_json::Error> for FactoryError {
    fn from(e: serde_json::Error) -> Self {
        FactoryError::Json(e)
    }
}

/// Classification of an exchange failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// Host name resolution failed.
    Dns,

    /// The TCP connection could not be established.
    Connect,

    /// A connect, read or write deadline expired.
    Timeout,

    /// The connection broke or misbehaved mid-exchange.
    Io,

    /// The redirect cap was exceeded.
    TooManyRedirects,

    /// The request URL names a scheme this transport does not speak.
    UnsupportedScheme,

    /// The request URL could not be parsed at all.
    InvalidUrl,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkErrorKind::Dns => "dns",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Io => "io",
            NetworkErrorKind::TooManyRedirects => "too many redirects",
            NetworkErrorKind::UnsupportedScheme => "unsupported scheme",
            NetworkErrorKind::InvalidUrl => "invalid url",
        };
        write!(f, "{name}")
    }
}

/// Errors returned by [`Client::send`](crate::client::Client::send).
#[derive(Debug)]
pub enum ClientError {
    /// The temporary response-body stream could not be opened. Raised before
    /// any network activity.
    Init(StreamError),

    /// The exchange itself failed; no response was obtained. Carries the
    /// request as it went out plus the transport-level classification.
    Network {
        request: Request,
        kind: NetworkErrorKind,
        message: String,
    },

    /// The server sent a status code outside the representable range.
    Response(MessageError),

    /// The captured response body stream failed after the exchange.
    Stream(StreamError),
}

impl ClientError {
    /// The request attached to a network error, if this is one.
    pub fn request(&self) -> Option<&Request> {
        match self {
            ClientError::Network { request, .. } => Some(request),
            _ => None,
        }
    }

    /// The failure classification of a network error, if this is one.
    pub fn network_kind(&self) -> Option<NetworkErrorKind> {
        match self {
            ClientError::Network { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Init(e) => {
                write!(f, "failed to initialize response body stream: {e}")
            }
            ClientError::Network {
                request,
                kind,
                message,
            } => write!(
                f,
                "network error ({kind}) for {} {}: {message}",
                request.method(),
                request.uri()
            ),
            ClientError::Response(e) => write!(f, "invalid response: {e}"),
            ClientError::Stream(e) => write!(f, "response body stream failed: {e}"),
        }
    }
}

impl std::error::Error for ClientError {}
