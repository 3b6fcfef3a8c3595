//! Client facade over a `RequestInvoker`.
//!
//! # Design
//! `HttpClient` holds only the base URL, the configured default headers and
//! the invoker, none of which change after construction. Each call appends the
//! caller's path to the base URL as-is, assembles headers, delegates to the
//! invoker and turns any status of 300 or above into `ClientError::Status`.
//! Redirects are the engine's business: whatever reaches this layer is final.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, Payload, CONTENT_TYPE};
use crate::invoker::{RequestInvoker, UreqInvoker};
use crate::response::Response;

/// Blocking HTTP client exposing GET, PUT, POST and DELETE.
///
/// Safe to share between threads whenever the invoker is.
#[derive(Debug, Clone)]
pub struct HttpClient<I = UreqInvoker> {
    base_url: String,
    default_headers: Vec<(String, String)>,
    invoker: I,
}

impl HttpClient<UreqInvoker> {
    /// Client backed by a `ureq` agent configured from `config`.
    pub fn new(config: ClientConfig) -> Self {
        let invoker = UreqInvoker::with_timeout(config.timeout());
        Self::with_invoker(config, invoker)
    }
}

impl<I: RequestInvoker> HttpClient<I> {
    pub fn with_invoker(config: ClientConfig, invoker: I) -> Self {
        Self {
            base_url: config.base_url,
            default_headers: config.default_headers,
            invoker,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, path: &str) -> Result<Response, ClientError> {
        self.get_with_headers(path, &[])
    }

    pub fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> Result<Response, ClientError> {
        self.execute(HttpMethod::Get, path, headers, None)
    }

    /// PUT `payload`, defaulting the content type from the payload kind.
    pub fn put(&self, path: &str, payload: impl Into<Payload>) -> Result<Response, ClientError> {
        self.put_with_headers(path, &[], payload)
    }

    pub fn put_with_headers(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        payload: impl Into<Payload>,
    ) -> Result<Response, ClientError> {
        self.execute(HttpMethod::Put, path, headers, Some(payload.into()))
    }

    /// POST `payload`. Text defaults to `application/json`, bytes to
    /// `application/octet-stream`.
    pub fn post(&self, path: &str, payload: impl Into<Payload>) -> Result<Response, ClientError> {
        self.post_with_headers(path, &[], payload)
    }

    pub fn post_with_headers(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        payload: impl Into<Payload>,
    ) -> Result<Response, ClientError> {
        self.execute(HttpMethod::Post, path, headers, Some(payload.into()))
    }

    pub fn delete(&self, path: &str) -> Result<Response, ClientError> {
        self.execute(HttpMethod::Delete, path, &[], None)
    }

    /// Build the request for `path` without sending it.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<Payload>,
    ) -> HttpRequest {
        let mut request = HttpRequest::new(method, format!("{}{path}", self.base_url));
        for (name, value) in &self.default_headers {
            request.set_header(name, value);
        }
        for (name, value) in headers {
            request.set_header(name, value);
        }
        if let Some(payload) = &body {
            if request.header(CONTENT_TYPE).is_none() {
                request.set_header(CONTENT_TYPE, payload.default_content_type());
            }
        }
        request.body = body;
        request
    }

    fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        headers: &[(&str, &str)],
        body: Option<Payload>,
    ) -> Result<Response, ClientError> {
        let request = self.build_request(method, path, headers, body);
        let response = self.invoker.invoke(&request)?;
        check_status(path, response)
    }
}

/// Reject any reply whose status is 300 or above.
fn check_status(path: &str, response: Response) -> Result<Response, ClientError> {
    let status_code = response.status_code();
    if status_code >= 300 {
        return Err(ClientError::Status {
            status_code,
            status_text: response.status_text().unwrap_or_default().to_string(),
            uri: path.to_string(),
        });
    }
    Ok(response)
}
