//! Server-side request wrapper: a [`Request`] plus the property bags an
//! application server hands over with it.
//!
//! # Design
//! `ServerRequest` never reads ambient process state. Everything comes in
//! through [`ServerEnv`], an explicit snapshot of the environment a server
//! adapter has already collected, and the bags follow the same `with_*`
//! derivation discipline as every other message value.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::UriError;
use crate::headers::{HeaderValues, Headers};
use crate::request::Request;
use crate::stream::Body;
use crate::upload::UploadedFile;
use crate::uri::{self, Uri};

/// Explicit snapshot of the data a server adapter passes in.
#[derive(Clone, Debug, Default)]
pub struct ServerEnv {
    /// Request method token; empty falls back to GET.
    pub method: String,
    /// Whether the connection was TLS-terminated.
    pub https: bool,
    /// Host (and optional port) the request was addressed to.
    pub host: String,
    /// Path and query as received, e.g. `/search?q=1`.
    pub request_uri: String,
    /// Protocol as reported by the server, e.g. `HTTP/1.1`.
    pub protocol: String,
    /// Request headers as received.
    pub headers: Vec<(String, String)>,
    /// Cookies already parsed by the server.
    pub cookies: Vec<(String, String)>,
    /// Raw request body.
    pub body: Vec<u8>,
    /// Whatever else the server wants to attach (remote addr, paths, ...).
    pub server_params: HashMap<String, String>,
}

/// An incoming request with its server-side property bags.
#[derive(Clone, Debug)]
pub struct ServerRequest {
    request: Request,
    server_params: HashMap<String, String>,
    cookie_params: Vec<(String, String)>,
    query_params: Vec<(String, String)>,
    uploaded_files: Vec<UploadedFile>,
    parsed_body: Option<Value>,
    attributes: HashMap<String, Value>,
}

impl ServerRequest {
    /// Wrap an already-built request with empty bags.
    pub fn new(request: Request) -> Self {
        ServerRequest {
            request,
            server_params: HashMap::new(),
            cookie_params: Vec::new(),
            query_params: Vec::new(),
            uploaded_files: Vec::new(),
            parsed_body: None,
            attributes: HashMap::new(),
        }
    }

    /// Build a fully-formed server request from explicitly passed
    /// environment data. Query params are decoded from the request URI,
    /// cookies and server params are taken verbatim.
    pub fn from_env(env: ServerEnv) -> Result<Self, UriError> {
        let scheme = if env.https { "https" } else { "http" };
        let host = if env.host.is_empty() {
            "localhost"
        } else {
            env.host.as_str()
        };
        let request_uri = if env.request_uri.is_empty() {
            "/"
        } else {
            env.request_uri.as_str()
        };
        let target = Uri::parse(&format!("{scheme}://{host}{request_uri}"))?;

        let method = if env.method.is_empty() {
            "GET"
        } else {
            env.method.as_str()
        };

        let mut request = Request::new(method, target);
        for (name, value) in &env.headers {
            request = request.with_added_header(name.as_str(), value.as_str());
        }
        request = request.with_protocol_version(protocol_version(&env.protocol));
        if !env.body.is_empty() {
            request = request.with_body(Body::from(env.body.clone()));
        }

        let query_params = uri::parse_query(request.uri().query());

        Ok(ServerRequest {
            request,
            server_params: env.server_params,
            cookie_params: env.cookies,
            query_params,
            uploaded_files: Vec::new(),
            parsed_body: None,
            attributes: HashMap::new(),
        })
    }

    /// The underlying request value.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &str {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn headers(&self) -> &Headers {
        self.request.headers()
    }

    pub fn header(&self, name: &str) -> &[String] {
        self.request.header(name)
    }

    pub fn body(&self) -> &Body {
        self.request.body()
    }

    /// Derive with a different underlying request.
    pub fn with_request(&self, request: Request) -> Self {
        let mut new = self.clone();
        new.request = request;

        new
    }

    pub fn with_header(&self, name: &str, values: impl Into<HeaderValues>) -> Self {
        self.with_request(self.request.with_header(name, values))
    }

    pub fn server_params(&self) -> &HashMap<String, String> {
        &self.server_params
    }

    pub fn cookie_params(&self) -> &[(String, String)] {
        &self.cookie_params
    }

    pub fn with_cookie_params(&self, cookies: Vec<(String, String)>) -> Self {
        let mut new = self.clone();
        new.cookie_params = cookies;

        new
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query_params
    }

    pub fn with_query_params(&self, params: Vec<(String, String)>) -> Self {
        let mut new = self.clone();
        new.query_params = params;

        new
    }

    pub fn uploaded_files(&self) -> &[UploadedFile] {
        &self.uploaded_files
    }

    pub fn with_uploaded_files(&self, files: Vec<UploadedFile>) -> Self {
        let mut new = self.clone();
        new.uploaded_files = files;

        new
    }

    pub fn parsed_body(&self) -> Option<&Value> {
        self.parsed_body.as_ref()
    }

    pub fn with_parsed_body(&self, data: Option<Value>) -> Self {
        let mut new = self.clone();
        new.parsed_body = data;

        new
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn with_attribute(&self, name: &str, value: Value) -> Self {
        let mut new = self.clone();
        new.attributes.insert(name.to_string(), value);

        new
    }

    pub fn without_attribute(&self, name: &str) -> Self {
        if !self.attributes.contains_key(name) {
            return self.clone();
        }

        let mut new = self.clone();
        new.attributes.remove(name);

        new
    }
}

fn protocol_version(protocol: &str) -> &str {
    let upper_prefix = protocol.get(..5).map(|p| p.eq_ignore_ascii_case("HTTP/"));
    match upper_prefix {
        Some(true) => &protocol[5..],
        _ => "1.1",
    }
}
