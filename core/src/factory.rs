//! Request construction conveniences.
//!
//! # Design
//! `RequestFactory` wraps the common request shapes: query-string building
//! for GET/DELETE, JSON bodies via serde for the `*_json` methods, and
//! form-encoded bodies for `post_form`. Anything it cannot express is a
//! plain [`Request::new`] plus `with_*` calls away.

use serde::Serialize;
use std::fmt;

use crate::error::FactoryError;
use crate::request::{Method, Request};
use crate::stream::Body;
use crate::uri::{self, Uri};

/// Common content types, with the exact strings sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Csv,
    Form,
    Html,
    JavaScript,
    Json,
    Multipart,
    OctetStream,
    Pdf,
    Plain,
    Xml,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Csv => "text/csv",
            ContentType::Form => "application/x-www-form-urlencoded",
            ContentType::Html => "text/html",
            ContentType::JavaScript => "application/javascript",
            ContentType::Json => "application/json",
            ContentType::Multipart => "multipart/form-data",
            ContentType::OctetStream => "application/octet-stream",
            ContentType::Pdf => "application/pdf",
            ContentType::Plain => "text/plain",
            ContentType::Xml => "application/xml",
        }
    }

    /// The content type with a `charset` parameter appended.
    pub fn with_charset(&self, charset: &str) -> String {
        format!("{}; charset={charset}", self.as_str())
    }
}

impl AsRef<str> for ContentType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless factory for the common request shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestFactory;

impl RequestFactory {
    pub fn new() -> Self {
        RequestFactory
    }

    /// A request for `method` and `uri` with an empty body.
    pub fn request(
        &self,
        method: impl AsRef<str>,
        uri: &str,
    ) -> Result<Request, FactoryError> {
        Ok(Request::new(method, Uri::parse(uri)?))
    }

    /// A GET request; `query` is encoded and appended to any query already
    /// present on `uri`.
    pub fn get(&self, uri: &str, query: &[(&str, &str)]) -> Result<Request, FactoryError> {
        Ok(Request::new(Method::Get, self.uri_with_query(uri, query)?))
    }

    /// Built like [`get`](Self::get), then the method is swapped.
    pub fn delete(&self, uri: &str, query: &[(&str, &str)]) -> Result<Request, FactoryError> {
        Ok(self.get(uri, query)?.with_method(Method::Delete))
    }

    pub fn post(&self, uri: &str, body: Body) -> Result<Request, FactoryError> {
        self.with_body(Method::Post, uri, body)
    }

    pub fn put(&self, uri: &str, body: Body) -> Result<Request, FactoryError> {
        self.with_body(Method::Put, uri, body)
    }

    pub fn patch(&self, uri: &str, body: Body) -> Result<Request, FactoryError> {
        self.with_body(Method::Patch, uri, body)
    }

    /// A POST with `data` serialized to JSON and the content type forced to
    /// `application/json`.
    pub fn post_json<T: Serialize>(&self, uri: &str, data: &T) -> Result<Request, FactoryError> {
        self.with_json(Method::Post, uri, data)
    }

    pub fn put_json<T: Serialize>(&self, uri: &str, data: &T) -> Result<Request, FactoryError> {
        self.with_json(Method::Put, uri, data)
    }

    pub fn patch_json<T: Serialize>(&self, uri: &str, data: &T) -> Result<Request, FactoryError> {
        self.with_json(Method::Patch, uri, data)
    }

    /// A POST with `fields` form-encoded and the content type set to
    /// `application/x-www-form-urlencoded`.
    pub fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Result<Request, FactoryError> {
        let pairs: Vec<(String, String)> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let body = uri::build_query(&pairs);

        Ok(self
            .with_body(Method::Post, uri, Body::from(body))?
            .with_header("Content-Type", ContentType::Form.as_str()))
    }

    fn with_body(
        &self,
        method: Method,
        uri: &str,
        body: Body,
    ) -> Result<Request, FactoryError> {
        Ok(Request::new(method, Uri::parse(uri)?).with_body(body))
    }

    fn with_json<T: Serialize>(
        &self,
        method: Method,
        uri: &str,
        data: &T,
    ) -> Result<Request, FactoryError> {
        let payload = serde_json::to_vec(data)?;

        Ok(self
            .with_body(method, uri, Body::from(payload))?
            .with_header("Content-Type", ContentType::Json.as_str()))
    }

    fn uri_with_query(&self, uri: &str, query: &[(&str, &str)]) -> Result<Uri, FactoryError> {
        let uri = Uri::parse(uri)?;
        if query.is_empty() {
            return Ok(uri);
        }

        let pairs: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let appended = uri::build_query(&pairs);
        let combined = if uri.query().is_empty() {
            appended
        } else {
            format!("{}&{appended}", uri.query())
        };

        Ok(uri.with_query(&combined))
    }
}
