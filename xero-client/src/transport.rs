//! Request descriptors and the transport boundary
//!
//! Operations build a [`RequestDescriptor`] without performing any I/O; a
//! [`Transport`] implementation executes it and hands back a
//! [`RawResponse`] for classification. The crate ships a thin
//! [`HttpTransport`] over `reqwest`; anything that can turn a descriptor
//! into a raw response (including a test double) satisfies the trait.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Form-encoded fields (save/put send the serialized document as an
    /// `xml=` field).
    Form(Vec<(String, String)>),
    /// Raw text body.
    Raw(String),
}

/// A fully described, not-yet-signed request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub uri: String,
    pub method: Method,
    pub body: Option<RequestBody>,
    pub headers: HashMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(uri: impl Into<String>, method: Method) -> Self {
        Self {
            uri: uri.into(),
            method,
            body: None,
            headers: HashMap::new(),
        }
    }
}

/// An executed exchange, as seen by the response classifier.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Content-Type` header, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body as text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes request descriptors. Implementations own connection handling
/// entirely; the marshalling core never touches sockets.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.uri),
            Method::Post => self.client.post(&request.uri),
            Method::Put => self.client.put(&request.uri),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        match &request.body {
            Some(RequestBody::Form(fields)) => builder = builder.form(fields),
            Some(RequestBody::Raw(text)) => builder = builder.body(text.clone()),
            None => {}
        }

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transport(anyhow::Error::new(e)))?;
        log::debug!(
            "request to {} took {:?}",
            request.uri,
            start.elapsed()
        );

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(anyhow::Error::new(e)))?
            .to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
