// # Transport Trait
//
// The HTTP exchange the controller delegates to.
//
// ## Implementations
//
// - reqwest: `dnsrec-transport-http` crate
// - tests: scripted mock in `tests/common`
//
// ## Contract
//
// An implementation already carries authentication and a request timeout
// when it is handed to the controller. It must:
//
// - send exactly one request per `execute` call, never retry
// - read the response body to the end before returning, on every path
// - report any status code as a normal `ApiResponse`; only failures that
//   happen before a status is received are errors

use async_trait::async_trait;
use std::fmt;

/// HTTP method used by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request against a path relative to the API base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// JSON body, if any
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Put,
            path: path.into(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

/// Fully drained response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP exchange with the domain-hosting API
///
/// Implementations must be thread-safe; the controller holds one transport
/// and shares it across all records it manages.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return its status and full body
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, crate::Error>;

    /// Name for logging
    fn transport_name(&self) -> &'static str;
}
