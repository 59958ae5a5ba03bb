// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the remote REST service.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP calls for production
//! - Mock transports for unit testing

use std::future::Future;
use std::pin::Pin;

use reqwest::Url;
use serde_json::Value;
use tether_core::{OpKind, Route};

use crate::config::RemoteConfig;

/// Error type for transport operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The service could not be reached.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The service answered with a non-2xx status.
    #[error("remote returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// No answer within the per-call timeout.
    #[error("request timed out")]
    Timeout,

    /// The call was abandoned because connectivity was lost.
    #[error("request cancelled")]
    Cancelled,

    /// The response body was not JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The request URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// HTTP method of a remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// `create→POST`, `update→PUT`, `delete→DELETE`.
    pub fn for_kind(kind: OpKind) -> Self {
        match kind {
            OpKind::Create => Method::Post,
            OpKind::Update => Method::Put,
            OpKind::Delete => Method::Delete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One call against the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: Method,
    /// Collection path, e.g. `/api/documents`.
    pub path: String,
    /// Appended as the last path segment when present.
    pub record_id: Option<String>,
    pub body: Option<Value>,
}

impl RemoteRequest {
    /// Builds the call for a resolved mutation route. Deletes carry no body.
    pub fn for_route(route: Route, body: Value) -> Self {
        RemoteRequest {
            method: Method::for_kind(route.kind),
            path: route.path,
            record_id: route.record_id,
            body: route.kind.has_body().then_some(body),
        }
    }

    /// Builds a collection read.
    pub fn list(path: impl Into<String>) -> Self {
        RemoteRequest {
            method: Method::Get,
            path: path.into(),
            record_id: None,
            body: None,
        }
    }

    /// `METHOD /path[/id]`, for logs.
    pub fn describe(&self) -> String {
        match &self.record_id {
            Some(id) => format!("{} {}/{}", self.method, self.path, id),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

/// Strips a `{ "data": ... }` envelope some services wrap responses in.
///
/// Objects that carry their own `id` are returned unchanged.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if !map.contains_key("id") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Transport trait for REST calls.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync + 'static {
    /// Perform one call. Returns the decoded JSON body (`Null` when empty).
    fn send(
        &self,
        request: RemoteRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Value>> + Send + '_>>;

    /// Check whether the service is reachable.
    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    token: Option<String>,
    health_path: String,
}

impl HttpTransport {
    /// Create a transport for the configured remote.
    pub fn new(remote: &RemoteConfig) -> TransportResult<Self> {
        let base = Url::parse(&remote.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", remote.url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(remote.timeout())
            .build()
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok(HttpTransport {
            client,
            base,
            token: remote.resolved_token(),
            health_path: remote.health_path.clone(),
        })
    }

    /// `{base}{path}[/{id}]`, with the id percent-encoded as one segment.
    pub fn url_for(&self, path: &str, record_id: Option<&str>) -> TransportResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TransportError::InvalidUrl(self.base.to_string()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::ConnectionFailed(e.to_string())
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: RemoteRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Value>> + Send + '_>> {
        Box::pin(async move {
            let url = self.url_for(&request.path, request.record_id.as_deref())?;
            let mut builder = self.client.request(request.method.to_reqwest(), url);
            if let Some(token) = &self.token {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(classify)?;
            let status = response.status();
            let text = response.text().await.map_err(classify)?;
            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
        })
    }

    fn probe(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(async move {
            let Ok(url) = self.url_for(&self.health_path, None) else {
                return false;
            };
            let mut builder = self.client.get(url);
            if let Some(token) = &self.token {
                builder = builder.bearer_auth(token);
            }
            match builder.send().await {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            }
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
