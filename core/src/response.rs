//! Immutable response value: status code, reason phrase, headers, body.

use crate::error::MessageError;
use crate::headers::{HeaderValues, Headers};
use crate::message::Message;
use crate::stream::Body;

/// The registered reason phrase for a status code, if any.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    let phrase = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _ => return None,
    };

    Some(phrase)
}

/// An immutable HTTP response.
///
/// Derivation follows the same rule as [`Request`](crate::request::Request):
/// every `with_*` returns a new value, the header table is copied per
/// instance and the body handle is shared until replaced.
#[derive(Clone, Debug)]
pub struct Response {
    message: Message,
    status_code: u16,
    reason_phrase: String,
}

impl Response {
    /// Build a response with `status` and its registered reason phrase.
    /// Codes outside 100..=599 are a construction error.
    pub fn new(status: u16) -> Result<Self, MessageError> {
        Self::with_reason(status, "")
    }

    /// Build a response with `status` and an explicit reason phrase; an
    /// empty phrase falls back to the registered one (or stays empty for
    /// unregistered codes).
    pub fn with_reason(status: u16, reason: &str) -> Result<Self, MessageError> {
        let status_code = filter_status_code(status)?;

        Ok(Response {
            message: Message::new(),
            status_code,
            reason_phrase: filter_reason_phrase(reason, status_code),
        })
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    /// True for 2xx status codes.
    pub fn is_successful(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Derive a response with a different status. An empty `reason`
    /// recomputes the registered phrase for the new code.
    pub fn with_status(&self, code: u16, reason: &str) -> Result<Self, MessageError> {
        let status_code = filter_status_code(code)?;
        let reason_phrase = filter_reason_phrase(reason, status_code);

        if status_code == self.status_code && reason_phrase == self.reason_phrase {
            return Ok(self.clone());
        }

        let mut new = self.clone();
        new.status_code = status_code;
        new.reason_phrase = reason_phrase;

        Ok(new)
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

    pub fn with_header(&self, name: &str, values: impl Into<HeaderValues>) -> Self {
        let mut new = self.clone();
        new.message.headers.set(name, values.into(), false);

        new
    }

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

    pub fn with_body(&self, body: Body) -> Self {
        let mut new = self.clone();
        new.message.body = body;

        new
    }
}

fn filter_status_code(code: u16) -> Result<u16, MessageError> {
    if !(100..=599).contains(&code) {
        return Err(MessageError::InvalidStatusCode(code));
    }

    Ok(code)
}

fn filter_reason_phrase(reason: &str, code: u16) -> String {
    if reason.is_empty() {
        reason_phrase(code).unwrap_or("").to_string()
    } else {
        reason.trim().to_string()
    }
}
