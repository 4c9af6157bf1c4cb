//! Shared message representation: protocol version, headers, body.
//!
//! [`Request`](crate::request::Request) and
//! [`Response`](crate::response::Response) embed these parts by composition
//! and expose them through delegating methods; there is no subtyping.
//! Cloning deep-copies the header table and shares the body handle, which is
//! exactly what the `with_*` derivation discipline needs.

use crate::headers::Headers;
use crate::stream::Body;

#[derive(Clone, Debug)]
pub(crate) struct Message {
    pub(crate) protocol: String,
    pub(crate) headers: Headers,
    pub(crate) body: Body,
}

impl Message {
    pub(crate) fn new() -> Self {
        Message {
            protocol: "1.1".to_string(),
            headers: Headers::new(),
            body: Body::empty(),
        }
    }
}
