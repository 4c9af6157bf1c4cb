//! Transport options merged around each exchange.
//!
//! # Design
//! Every field is optional so option sets overlay cleanly. Layers apply in
//! order (built-in defaults, client defaults, values computed from the
//! request, per-call overrides) and later layers win field by field.

use std::time::Duration;

/// HTTP protocol versions a message can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVersion {
    Http10,
    Http11,
    Http2,
    Http3,
}

impl HttpVersion {
    /// Map a message protocol-version string to a version flag. Unknown
    /// strings fall back to 1.1.
    pub fn from_protocol(version: &str) -> Self {
        match version {
            "1.0" => HttpVersion::Http10,
            "2" | "2.0" => HttpVersion::Http2,
            "3" | "3.0" => HttpVersion::Http3,
            _ => HttpVersion::Http11,
        }
    }

    /// The protocol-version string carried on messages.
    pub fn as_protocol(&self) -> &'static str {
        match self {
            HttpVersion::Http10 => "1.0",
            HttpVersion::Http11 => "1.1",
            HttpVersion::Http2 => "2",
            HttpVersion::Http3 => "3",
        }
    }

    /// The token written on the request line. Versions 2 and 3 have no 1.x
    /// wire form; this transport carries them as 1.1.
    pub(crate) fn wire_token(&self) -> &'static str {
        match self {
            HttpVersion::Http10 => "HTTP/1.0",
            _ => "HTTP/1.1",
        }
    }
}

/// Options controlling a single exchange.
///
/// `method`, `url`, `version`, `header_lines` and `body` are normally
/// computed from the request; setting them here overrides the computed
/// values (they are applied last in the merge).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransportOptions {
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
    pub follow_redirects: Option<bool>,
    pub max_redirects: Option<u32>,
    pub version: Option<HttpVersion>,
    pub method: Option<String>,
    pub url: Option<String>,
    pub header_lines: Option<Vec<String>>,
    pub body: Option<Vec<u8>>,
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// The options every client starts from.
    pub(crate) fn built_in() -> Self {
        TransportOptions {
            connect_timeout: Some(Duration::from_secs(10)),
            timeout: Some(Duration::from_secs(100)),
            follow_redirects: Some(true),
            max_redirects: Some(20),
            ..Self::default()
        }
    }

    /// Overlay `over` on `self`: any field set in `over` wins.
    pub fn merge(mut self, over: &TransportOptions) -> Self {
        if over.connect_timeout.is_some() {
            self.connect_timeout = over.connect_timeout;
        }
        if over.timeout.is_some() {
            self.timeout = over.timeout;
        }
        if over.follow_redirects.is_some() {
            self.follow_redirects = over.follow_redirects;
        }
        if over.max_redirects.is_some() {
            self.max_redirects = over.max_redirects;
        }
        if over.version.is_some() {
            self.version = over.version;
        }
        if let Some(method) = &over.method {
            self.method = Some(method.clone());
        }
        if let Some(url) = &over.url {
            self.url = Some(url.clone());
        }
        if let Some(lines) = &over.header_lines {
            self.header_lines = Some(lines.clone());
        }
        if let Some(body) = &over.body {
            self.body = Some(body.clone());
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_strings_map_to_version_flags() {
        assert_eq!(HttpVersion::from_protocol("1.0"), HttpVersion::Http10);
        assert_eq!(HttpVersion::from_protocol("1.1"), HttpVersion::Http11);
        assert_eq!(HttpVersion::from_protocol("2"), HttpVersion::Http2);
        assert_eq!(HttpVersion::from_protocol("2.0"), HttpVersion::Http2);
        assert_eq!(HttpVersion::from_protocol("3"), HttpVersion::Http3);
        assert_eq!(HttpVersion::from_protocol("3.0"), HttpVersion::Http3);
        assert_eq!(HttpVersion::from_protocol("0.9"), HttpVersion::Http11);
        assert_eq!(HttpVersion::from_protocol("junk"), HttpVersion::Http11);
    }

    #[test]
    fn merge_overlays_only_set_fields() {
        let base = TransportOptions::built_in();
        let overrides = TransportOptions {
            timeout: Some(Duration::from_secs(5)),
            method: Some("HEAD".to_string()),
            ..TransportOptions::default()
        };

        let merged = base.merge(&overrides);
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
        assert_eq!(merged.method.as_deref(), Some("HEAD"));
        // Untouched fields keep the built-in values.
        assert_eq!(merged.connect_timeout, Some(Duration::from_secs(10)));
        assert_eq!(merged.follow_redirects, Some(true));
    }

    #[test]
    fn later_layers_win_field_by_field() {
        let defaults = TransportOptions {
            timeout: Some(Duration::from_secs(30)),
            follow_redirects: Some(false),
            ..TransportOptions::default()
        };
        let per_call = TransportOptions {
            timeout: Some(Duration::from_secs(2)),
            ..TransportOptions::default()
        };

        let merged = TransportOptions::built_in().merge(&defaults).merge(&per_call);
        assert_eq!(merged.timeout, Some(Duration::from_secs(2)));
        assert_eq!(merged.follow_redirects, Some(false));
        assert_eq!(merged.max_redirects, Some(20));
    }
}
