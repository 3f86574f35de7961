//! HTTP transport interface and implementations.
//!
//! The transport interface abstracts a single HTTP round-trip:
//! - [`ReqwestTransport`] performs real requests over HTTP or HTTPS
//! - [`MockTransport`] returns scripted responses and records every request
//!
//! The client builds complete requests (URL, headers, body) and leaves only
//! delivery to the transport.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

pub use reqwest::header::HeaderMap;
pub use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, TransportError};

/// A fully-built HTTP request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body as UTF-8 text.
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// The body decoded as `application/x-www-form-urlencoded` pairs.
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        self.body
            .as_deref()
            .map(|b| {
                url::form_urlencoded::parse(b)
                    .into_owned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    }

    /// The body decoded as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// An HTTP response with its body fully read.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with a status and body.
    ///
    /// Fails if `status` is not a valid HTTP status code.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Result<Self, TransportError> {
        let status =
            StatusCode::from_u16(status).map_err(|_| TransportError::InvalidStatus(status))?;
        Ok(Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        })
    }

    /// Create a response carrying a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Result<Self, TransportError> {
        let mut response = Self::new(status, body.to_string())?;
        response.headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        Ok(response)
    }

    /// Reason phrase for the status code.
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown Status")
    }

    /// The body as UTF-8 text.
    pub fn text(&self) -> Result<String, ClientError> {
        String::from_utf8(self.body.clone())
            .map_err(|e| ClientError::Decode(format!("response is not UTF-8: {e}")))
    }

    /// The body decoded as JSON.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::Decode(format!("invalid JSON response: {e}")))
    }
}

/// Delivers one HTTP request and returns its response.
pub trait Transport: Send + Sync {
    /// Send the request and block until the complete response is read.
    fn send(&self, request: Request) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

/// Blocking HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Create a transport with no timeout beyond reqwest's defaults.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(None)
    }

    /// Create a transport with an optional whole-request timeout.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?.to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

/// Scripted transport for testing.
///
/// Responses are returned in the order they were queued; every request is
/// recorded for later inspection.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    /// Create a mock transport with no queued responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock transport that will return the given responses in order.
    pub fn with_responses(responses: impl IntoIterator<Item = Response>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue another response.
    pub fn push(&self, response: Response) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<Request> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: Request) -> Result<Response, TransportError> {
        debug!(method = %request.method, url = %request.url, "[MOCK] Sending request");

        let method = request.method.to_string();
        let url = request.url.to_string();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or(TransportError::Exhausted { method, url })
    }
}
