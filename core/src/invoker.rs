//! Request invokers: the seam between the facade and the HTTP engine.
//!
//! # Design
//! `RequestInvoker` performs exactly one exchange per call and returns a fully
//! drained `Response`. `UreqInvoker` is the production implementation; tests
//! plug in fakes that never touch the network. Invokers do not retry and do
//! not interpret status codes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};
use ureq::Agent;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};
use crate::response::{RawReply, Response};

/// Executes a single HTTP exchange.
pub trait RequestInvoker: Send + Sync {
    fn invoke(&self, request: &HttpRequest) -> Result<Response, ClientError>;
}

impl<T: RequestInvoker + ?Sized> RequestInvoker for Arc<T> {
    fn invoke(&self, request: &HttpRequest) -> Result<Response, ClientError> {
        (**self).invoke(request)
    }
}

impl<T: RequestInvoker + ?Sized> RequestInvoker for Box<T> {
    fn invoke(&self, request: &HttpRequest) -> Result<Response, ClientError> {
        (**self).invoke(request)
    }
}

/// `RequestInvoker` backed by a blocking `ureq` agent.
///
/// The agent owns the connection pool, redirect handling and timeouts. Status
/// codes are returned as data so the facade can apply its own policy.
#[derive(Clone)]
pub struct UreqInvoker {
    agent: Agent,
}

impl fmt::Debug for UreqInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqInvoker").finish_non_exhaustive()
    }
}

impl UreqInvoker {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Build an agent whose whole-exchange timeout is `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap a preconfigured agent. It must not treat HTTP statuses as errors.
    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestInvoker for UreqInvoker {
    fn invoke(&self, request: &HttpRequest) -> Result<Response, ClientError> {
        let url = request.url.as_str();
        debug!(
            url,
            method = request.method.as_str(),
            headers = ?request.headers,
            "executing request"
        );

        let result = match (request.method, &request.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), &request.headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), &request.headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), &request.headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(url), &request.headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), &request.headers).send_empty(),
        };

        // The reply is dropped at the end of this call on every path, which
        // hands the connection back to the agent's pool.
        let mut reply = result.map_err(|e| {
            error!(url, error = %e, "request failed");
            ClientError::transport(url, e)
        })?;

        let status = reply.status();
        debug!(url, status = status.as_u16(), "request completed");

        let headers: Vec<(String, String)> = reply
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let streaming = !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-length"));

        // ureq caps reads at 10 MiB unless told otherwise.
        let body = reply
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| {
                error!(url, error = %e, "failed to read response body");
                ClientError::read(url, e)
            })?;

        Response::from_raw(
            url,
            RawReply {
                status_code: Some(status.as_u16()),
                // ureq does not surface the reason phrase that was sent.
                status_text: status.canonical_reason().map(str::to_string),
                headers,
                body,
                streaming,
            },
        )
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Canned {
        seen: Mutex<Vec<String>>,
    }

    impl RequestInvoker for Canned {
        fn invoke(&self, request: &HttpRequest) -> Result<Response, ClientError> {
            self.seen.lock().unwrap().push(request.url.clone());
            Response::from_raw(&request.url, RawReply::default())
        }
    }

    #[test]
    fn shared_invokers_delegate() {
        let canned = Arc::new(Canned {
            seen: Mutex::new(Vec::new()),
        });
        let boxed: Box<dyn RequestInvoker> = Box::new(Arc::clone(&canned));

        let request = HttpRequest::new(HttpMethod::Get, "http://host/api/a");
        boxed.invoke(&request).unwrap();
        canned.invoke(&request).unwrap();

        assert_eq!(canned.seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn refused_connection_is_a_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{addr}/nothing");
        let err = UreqInvoker::new()
            .invoke(&HttpRequest::new(HttpMethod::Get, url.clone()))
            .unwrap_err();

        assert!(matches!(err, ClientError::Transport { .. }));
        assert_eq!(err.uri(), url);
        assert_eq!(err.status_code(), 0);
    }
}
