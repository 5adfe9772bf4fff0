// # HTTP Transport
//
// reqwest-backed implementation of `Transport` for the domain-hosting API.
//
// ## Behavior
//
// - One HTTP exchange per `execute` call, no retries
// - HTTP Basic authentication with token and secret on every request
// - Per-request timeout from `ProviderConfig::timeout_secs`
// - Every status code is returned to the caller as-is; only failures that
//   produce no status at all (DNS, connect, TLS, timeout) become errors
// - The response body is always read to the end
//
// ## Security Requirements
//
// - Token and secret NEVER appear in logs or Debug output
// - Construction fails fast if either credential is empty
//
// ## API Reference
//
// - Base URL: `https://api.domeneshop.no/v0`
// - Records: `/domains/{domainId}/dns[/{recordId}]`

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use dnsrec_core::config::ProviderConfig;
use dnsrec_core::traits::{ApiRequest, ApiResponse, Method, Transport};
use dnsrec_core::{Error, Result};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;

/// Transport that talks to the API over HTTP(S)
pub struct HttpTransport {
    /// Base URL without trailing slash
    base_url: String,

    /// HTTP client carrying the auth header and timeout
    client: reqwest::Client,

    timeout: Duration,
}

// Custom Debug implementation; the client holds the credentials
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("credentials", &"<REDACTED>")
            .finish()
    }
}

impl HttpTransport {
    /// Create a transport from validated provider configuration
    ///
    /// # Security
    ///
    /// The credentials are stored only inside a header value marked
    /// sensitive, which reqwest never prints.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, basic_auth(&config.token, &config.secret)?);

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("dnsrec/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// `Authorization: Basic base64(token:secret)`, marked sensitive
fn basic_auth(token: &str, secret: &str) -> Result<HeaderValue> {
    let encoded = BASE64.encode(format!("{token}:{secret}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| Error::config(format!("Invalid credentials header: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}

fn describe(err: &reqwest::Error, timeout: Duration) -> String {
    if err.is_timeout() {
        format!("request timed out after {}s", timeout.as_secs())
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        format!("HTTP request failed: {}", err)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path);

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        let builder = match request.body {
            Some(body) => builder.header(CONTENT_TYPE, "application/json").body(body),
            None => builder,
        };

        tracing::debug!("{} {}", request.method, request.path);

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(describe(&e, self.timeout)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(describe(&e, self.timeout)))?;

        tracing::debug!("{} {} -> {}", request.method, request.path, status);
        Ok(ApiResponse::new(status, body.to_vec()))
    }

    fn transport_name(&self) -> &'static str {
        "http"
    }
}
