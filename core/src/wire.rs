//! Blocking HTTP/1.x wire exchange and raw header-line accumulation.
//!
//! # Design
//! The exchange emits every raw response header line as an event into a
//! [`HeaderSink`] accumulator: a status line resets the accumulated set (a
//! followed redirect starts a fresh block), a blank line is only a block
//! separator, anything else splits on the first `:`. Body bytes are written
//! chunk by chunk into the caller's stream. One connection per hop; the
//! request always asks for `Connection: close` unless the caller supplied
//! its own Connection header.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use crate::error::NetworkErrorKind;
use crate::options::HttpVersion;
use crate::stream::Stream;
use crate::uri::{default_port, Uri};

/// A hard transport failure; the client wraps this into
/// [`ClientError::Network`](crate::error::ClientError::Network).
#[derive(Debug)]
pub(crate) struct ExchangeError {
    pub(crate) kind: NetworkErrorKind,
    pub(crate) message: String,
}

impl ExchangeError {
    fn new(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        ExchangeError {
            kind,
            message: message.into(),
        }
    }
}

/// Accumulates raw response header lines across redirect hops.
#[derive(Debug)]
pub(crate) struct HeaderSink {
    /// Protocol version from the last status line, without the `HTTP/`
    /// prefix.
    pub(crate) version: String,
    /// Status from the last status line; 0 until one parses.
    pub(crate) status: u16,
    pub(crate) reason: String,
    pub(crate) headers: Vec<(String, String)>,
}

impl HeaderSink {
    pub(crate) fn new() -> Self {
        HeaderSink {
            version: "1.1".to_string(),
            status: 0,
            reason: String::new(),
            headers: Vec::new(),
        }
    }

    /// Status observed on the wire, defaulting to 200 when no status line
    /// ever parsed.
    pub(crate) fn status_or_default(&self) -> u16 {
        if self.status == 0 {
            200
        } else {
            self.status
        }
    }

    /// Feed one raw header line (terminator included or not).
    pub(crate) fn accept(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        if line.len() >= 5 && line.as_bytes()[..5].eq_ignore_ascii_case(b"HTTP/") {
            self.headers.clear();

            let (token, rest) = next_token(line);
            let (code, reason) = next_token(rest);
            self.version = token[5..].to_string();
            self.status = code.parse().unwrap_or(0);
            self.reason = reason.to_string();
        } else if let Some((name, value)) = line.split_once(':') {
            self.headers
                .push((name.trim().to_string(), value.trim().to_string()));
        }
    }
}

fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

/// Everything one exchange needs, already merged from the option layers.
pub(crate) struct Transfer {
    pub(crate) method: String,
    pub(crate) url: Uri,
    pub(crate) version: HttpVersion,
    pub(crate) header_lines: Vec<String>,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) connect_timeout: Duration,
    pub(crate) timeout: Duration,
    pub(crate) follow_redirects: bool,
    pub(crate) max_redirects: u32,
}

/// Run the exchange: header lines flow into `sink`, body bytes into
/// `body_out`. Returns only once the final hop's body is fully buffered.
pub(crate) fn exchange(
    transfer: &Transfer,
    sink: &mut HeaderSink,
    body_out: &mut Stream,
) -> Result<(), ExchangeError> {
    let mut url = transfer.url.clone();
    let mut method = transfer.method.clone();
    let mut body = transfer.body.as_deref();
    let mut hops: u32 = 0;

    loop {
        if url.scheme() != "http" {
            let kind = if url.scheme().is_empty() {
                NetworkErrorKind::InvalidUrl
            } else {
                NetworkErrorKind::UnsupportedScheme
            };
            return Err(ExchangeError::new(
                kind,
                format!("cannot request '{url}': unsupported scheme '{}'", url.scheme()),
            ));
        }
        if url.host().is_empty() {
            return Err(ExchangeError::new(
                NetworkErrorKind::InvalidUrl,
                format!("request URL '{url}' has no host"),
            ));
        }
        let port = url
            .port()
            .or_else(|| default_port(url.scheme()))
            .unwrap_or(80);

        debug!("> {method} {url}");

        let mut stream = connect(url.host(), port, transfer.connect_timeout)?;
        stream
            .set_read_timeout(Some(transfer.timeout))
            .and_then(|_| stream.set_write_timeout(Some(transfer.timeout)))
            .map_err(|e| {
                ExchangeError::new(NetworkErrorKind::Io, format!("failed to arm timeouts: {e}"))
            })?;

        let mut target = url.composed_path();
        if target.is_empty() {
            target.push('/');
        }
        if !url.query().is_empty() {
            target.push('?');
            target.push_str(url.query());
        }

        let mut head = format!("{method} {target} {}\r\n", transfer.version.wire_token());
        for line in hop_header_lines(&transfer.header_lines, &url, hops > 0, body) {
            head.push_str(&line);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        stream.write_all(head.as_bytes()).map_err(wire_io_error)?;
        if let Some(payload) = body {
            stream.write_all(payload).map_err(wire_io_error)?;
        }
        stream.flush().map_err(wire_io_error)?;

        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();

        match read_wire_line(&mut reader, &mut buf)? {
            None => {
                return Err(ExchangeError::new(
                    NetworkErrorKind::Io,
                    "empty reply from server",
                ))
            }
            Some(line) => sink.accept(&line),
        }
        loop {
            let line = read_wire_line(&mut reader, &mut buf)?.ok_or_else(|| {
                ExchangeError::new(
                    NetworkErrorKind::Io,
                    "connection closed inside the header block",
                )
            })?;
            let blank = line.trim().is_empty();
            sink.accept(&line);
            if blank {
                break;
            }
        }

        let status = sink.status;
        debug!("< HTTP/{} {status} {}", sink.version, sink.reason);

        if transfer.follow_redirects && matches!(status, 301 | 302 | 303 | 307 | 308) {
            if let Some(location) = header_value(&sink.headers, "location") {
                hops += 1;
                if hops > transfer.max_redirects {
                    return Err(ExchangeError::new(
                        NetworkErrorKind::TooManyRedirects,
                        format!("stopped after {} redirects", transfer.max_redirects),
                    ));
                }

                url = resolve_location(&url, &location)?;
                if status == 303
                    || ((status == 301 || status == 302) && method.eq_ignore_ascii_case("POST"))
                {
                    if !method.eq_ignore_ascii_case("HEAD") {
                        method = "GET".to_string();
                    }
                    body = None;
                }

                debug!("following redirect to {url}");
                continue;
            }
        }

        if method.eq_ignore_ascii_case("HEAD") || status == 204 || status == 304 {
            return Ok(());
        }

        let chunked = header_value(&sink.headers, "transfer-encoding")
            .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));
        if chunked {
            read_chunked_body(&mut reader, sink, body_out)?;
        } else if let Some(len) = header_value(&sink.headers, "content-length")
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            read_sized_body(&mut reader, len, body_out)?;
        } else {
            read_to_close(&mut reader, body_out)?;
        }

        return Ok(());
    }
}

fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, ExchangeError> {
    // Bracketed IPv6 literals resolve without their brackets.
    let lookup_host = host.trim_start_matches('[').trim_end_matches(']');
    let addrs: Vec<SocketAddr> = (lookup_host, port)
        .to_socket_addrs()
        .map_err(|e| {
            ExchangeError::new(
                NetworkErrorKind::Dns,
                format!("failed to resolve '{host}': {e}"),
            )
        })?
        .collect();

    let mut last: Option<io::Error> = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last = Some(e),
        }
    }

    match last {
        Some(e) => {
            let kind = if is_timeout(&e) {
                NetworkErrorKind::Timeout
            } else {
                NetworkErrorKind::Connect
            };
            Err(ExchangeError::new(
                kind,
                format!("failed to connect to {host}:{port}: {e}"),
            ))
        }
        None => Err(ExchangeError::new(
            NetworkErrorKind::Dns,
            format!("'{host}' resolved to no addresses"),
        )),
    }
}

/// The header lines for one hop. After a redirect the Host header tracks the
/// current URL and the payload framing is re-derived; the caller's lines are
/// sent untouched on the first hop.
fn hop_header_lines(
    base: &[String],
    url: &Uri,
    redirected: bool,
    body: Option<&[u8]>,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(base.len() + 2);
    for line in base {
        let name = line.split(':').next().unwrap_or("").trim();
        if redirected
            && (name.eq_ignore_ascii_case("host") || name.eq_ignore_ascii_case("content-length"))
        {
            continue;
        }
        lines.push(line.clone());
    }

    if redirected {
        let host = match url.port() {
            Some(port) => format!("{}:{port}", url.host()),
            None => url.host().to_string(),
        };
        lines.insert(0, format!("Host: {host}"));
    }

    if let Some(payload) = body {
        if !has_line(&lines, "content-length") {
            lines.push(format!("Content-Length: {}", payload.len()));
        }
    }
    if !has_line(&lines, "connection") {
        lines.push("Connection: close".to_string());
    }

    lines
}

fn has_line(lines: &[String], name: &str) -> bool {
    lines
        .iter()
        .any(|l| l.split(':').next().unwrap_or("").trim().eq_ignore_ascii_case(name))
}

fn header_value(headers: &[(String, String)], name: &str) -> Option<String> {
    headers
        .iter()
        .rev()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.clone())
}

/// Where a `Location` header points, relative to the hop that sent it.
fn resolve_location(base: &Uri, location: &str) -> Result<Uri, ExchangeError> {
    let loc = Uri::parse(location).map_err(|e| {
        ExchangeError::new(
            NetworkErrorKind::Io,
            format!("invalid redirect location '{location}': {e}"),
        )
    })?;

    if !loc.scheme().is_empty() {
        return Ok(loc);
    }
    if !loc.authority().is_empty() {
        return Ok(loc.with_scheme(base.scheme()));
    }

    let mut next = base.clone();
    if loc.path().starts_with('/') {
        next = next.with_path(loc.path());
    } else if !loc.path().is_empty() {
        let base_path = base.path();
        let prefix = match base_path.rfind('/') {
            Some(i) => &base_path[..=i],
            None => "/",
        };
        next = next.with_path(&format!("{prefix}{}", loc.path()));
    }

    Ok(next.with_query(loc.query()).with_fragment(loc.fragment()))
}

fn read_wire_line(
    reader: &mut BufReader<TcpStream>,
    buf: &mut Vec<u8>,
) -> Result<Option<String>, ExchangeError> {
    buf.clear();
    let n = reader.read_until(b'\n', buf).map_err(wire_io_error)?;
    if n == 0 {
        return Ok(None);
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn read_sized_body(
    reader: &mut BufReader<TcpStream>,
    len: u64,
    body_out: &mut Stream,
) -> Result<(), ExchangeError> {
    let mut remaining = len;
    let mut chunk = [0u8; 8192];

    while remaining > 0 {
        let want = remaining.min(chunk.len() as u64) as usize;
        let n = reader.read(&mut chunk[..want]).map_err(wire_io_error)?;
        if n == 0 {
            return Err(ExchangeError::new(
                NetworkErrorKind::Io,
                "connection closed before the full body arrived",
            ));
        }
        buffer_body(body_out, &chunk[..n])?;
        remaining -= n as u64;
    }

    Ok(())
}

fn read_to_close(
    reader: &mut BufReader<TcpStream>,
    body_out: &mut Stream,
) -> Result<(), ExchangeError> {
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).map_err(wire_io_error)?;
        if n == 0 {
            return Ok(());
        }
        buffer_body(body_out, &chunk[..n])?;
    }
}

fn read_chunked_body(
    reader: &mut BufReader<TcpStream>,
    sink: &mut HeaderSink,
    body_out: &mut Stream,
) -> Result<(), ExchangeError> {
    let mut buf = Vec::new();

    loop {
        let line = read_wire_line(reader, &mut buf)?.ok_or_else(|| {
            ExchangeError::new(NetworkErrorKind::Io, "connection closed between chunks")
        })?;
        let size_token = line.trim().split(';').next().unwrap_or("").trim().to_string();
        let size = u64::from_str_radix(&size_token, 16).map_err(|_| {
            ExchangeError::new(
                NetworkErrorKind::Io,
                format!("invalid chunk size '{size_token}'"),
            )
        })?;
        if size == 0 {
            break;
        }

        read_sized_body(reader, size, body_out)?;
        // Chunk data is followed by a bare CRLF.
        read_wire_line(reader, &mut buf)?;
    }

    // Trailer lines, if any, flow into the sink like ordinary headers.
    while let Some(line) = read_wire_line(reader, &mut buf)? {
        let blank = line.trim().is_empty();
        sink.accept(&line);
        if blank {
            break;
        }
    }

    Ok(())
}

fn buffer_body(body_out: &mut Stream, data: &[u8]) -> Result<(), ExchangeError> {
    body_out.write(data).map(|_| ()).map_err(|e| {
        ExchangeError::new(
            NetworkErrorKind::Io,
            format!("failed to buffer response body: {e}"),
        )
    })
}

fn wire_io_error(e: io::Error) -> ExchangeError {
    let kind = if is_timeout(&e) {
        NetworkErrorKind::Timeout
    } else {
        NetworkErrorKind::Io
    };
    ExchangeError::new(kind, format!("transfer failed: {e}"))
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_records_version_status_reason() {
        let mut sink = HeaderSink::new();
        sink.accept("HTTP/1.1 404 Not Found\r\n");
        assert_eq!(sink.version, "1.1");
        assert_eq!(sink.status, 404);
        assert_eq!(sink.reason, "Not Found");
    }

    #[test]
    fn header_lines_split_on_first_colon_and_trim() {
        let mut sink = HeaderSink::new();
        sink.accept("HTTP/1.1 200 OK\r\n");
        sink.accept("Content-Type:  text/html \r\n");
        sink.accept("X-Time: 12:34:56\r\n");
        assert_eq!(
            sink.headers,
            vec![
                ("Content-Type".to_string(), "text/html".to_string()),
                ("X-Time".to_string(), "12:34:56".to_string()),
            ]
        );
    }

    #[test]
    fn second_status_line_resets_accumulated_headers() {
        let mut sink = HeaderSink::new();
        sink.accept("HTTP/1.1 302 Found\r\n");
        sink.accept("Location: /next\r\n");
        sink.accept("\r\n");
        sink.accept("HTTP/1.1 200 OK\r\n");
        sink.accept("Content-Type: text/plain\r\n");

        assert_eq!(sink.status, 200);
        assert_eq!(sink.reason, "OK");
        assert_eq!(
            sink.headers,
            vec![("Content-Type".to_string(), "text/plain".to_string())]
        );
    }

    #[test]
    fn blank_lines_and_colonless_lines_are_ignored() {
        let mut sink = HeaderSink::new();
        sink.accept("\r\n");
        sink.accept("garbage without separator\r\n");
        assert!(sink.headers.is_empty());
        assert_eq!(sink.status, 0);
        assert_eq!(sink.status_or_default(), 200);
    }

    #[test]
    fn malformed_status_code_falls_back_to_default() {
        let mut sink = HeaderSink::new();
        sink.accept("HTTP/1.1 abc\r\n");
        assert_eq!(sink.status, 0);
        assert_eq!(sink.status_or_default(), 200);
    }

    #[test]
    fn duplicate_header_names_accumulate_in_order() {
        let mut sink = HeaderSink::new();
        sink.accept("HTTP/1.1 200 OK");
        sink.accept("Foo: Bar");
        sink.accept("Foo: baZ");
        assert_eq!(
            sink.headers,
            vec![
                ("Foo".to_string(), "Bar".to_string()),
                ("Foo".to_string(), "baZ".to_string()),
            ]
        );
    }

    #[test]
    fn first_hop_lines_pass_through_with_framing_added() {
        let url = Uri::parse("http://h/").unwrap();
        let base = vec!["Host: h".to_string(), "Accept: */*".to_string()];
        let lines = hop_header_lines(&base, &url, false, Some(b"abc".as_slice()));
        assert_eq!(
            lines,
            vec![
                "Host: h".to_string(),
                "Accept: */*".to_string(),
                "Content-Length: 3".to_string(),
                "Connection: close".to_string(),
            ]
        );
    }

    #[test]
    fn redirected_hop_rewrites_host_and_framing() {
        let url = Uri::parse("http://other.example:8080/x").unwrap();
        let base = vec![
            "Host: first.example".to_string(),
            "Content-Length: 3".to_string(),
            "Accept: */*".to_string(),
        ];
        let lines = hop_header_lines(&base, &url, true, None);
        assert_eq!(
            lines,
            vec![
                "Host: other.example:8080".to_string(),
                "Accept: */*".to_string(),
                "Connection: close".to_string(),
            ]
        );
    }

    #[test]
    fn caller_connection_header_is_respected() {
        let url = Uri::parse("http://h/").unwrap();
        let base = vec!["Connection: keep-alive".to_string()];
        let lines = hop_header_lines(&base, &url, false, None);
        assert_eq!(lines, vec!["Connection: keep-alive".to_string()]);
    }

    #[test]
    fn location_resolution_covers_the_common_forms() {
        let base = Uri::parse("http://h:81/a/b?q=1").unwrap();

        let next = resolve_location(&base, "http://elsewhere/x").unwrap();
        assert_eq!(next.to_string(), "http://elsewhere/x");

        let next = resolve_location(&base, "//elsewhere/x").unwrap();
        assert_eq!(next.to_string(), "http://elsewhere/x");

        let next = resolve_location(&base, "/rooted?n=2").unwrap();
        assert_eq!(next.to_string(), "http://h:81/rooted?n=2");

        let next = resolve_location(&base, "sibling").unwrap();
        assert_eq!(next.to_string(), "http://h:81/a/sibling");
    }
}
