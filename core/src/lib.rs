//! Blocking HTTP client facade.
//!
//! # Overview
//! `HttpClient` resolves relative paths against a fixed base URL, injects a
//! default `Content-Type` for payloads, delegates the exchange to a
//! `RequestInvoker` and returns a fully drained `Response`.
//!
//! # Design
//! - The base URL and default headers are fixed when the client is built.
//! - The invoker is injected so tests can run without a network;
//!   `UreqInvoker` is the production implementation.
//! - Every failure is a `ClientError`: transport, body decoding, or a status
//!   of 300 and above.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod invoker;
pub mod response;

pub use client::HttpClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use http::{HttpMethod, HttpRequest, Payload};
pub use invoker::{RequestInvoker, UreqInvoker};
pub use response::{Body, RawReply, Response};
