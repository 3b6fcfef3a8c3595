//! Read-only view over a completed HTTP exchange.
//!
//! # Design
//! Invokers drain the engine's reply into a `RawReply` and hand it to
//! `Response::from_raw`, which decides how the body is kept. A declared
//! `application/octet-stream` body stays raw bytes; anything else is decoded
//! to text with the declared charset, falling back to UTF-8. The two forms are
//! mutually exclusive.

use std::fmt;
use std::io::Cursor;
use std::string::FromUtf8Error;

use serde::de::DeserializeOwned;
use tracing::error;

use crate::error::ClientError;
use crate::http::{APPLICATION_OCTET_STREAM, CONTENT_TYPE};

const CONTENT_LENGTH: &str = "Content-Length";
const CONTENT_ENCODING: &str = "Content-Encoding";

/// Drained response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

/// Engine-neutral snapshot of a reply whose body has been fully read.
#[derive(Debug, Clone, Default)]
pub struct RawReply {
    /// `None` when the engine produced no status line.
    pub status_code: Option<u16>,
    pub status_text: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Whether the engine delivered the body as a stream of unknown length.
    pub streaming: bool,
}

/// A completed HTTP exchange. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    status_text: Option<String>,
    content_type: Option<String>,
    content_length: i64,
    body: Body,
    headers: Vec<(String, String)>,
    streaming: bool,
}

impl Response {
    /// Build a response from a drained reply.
    ///
    /// `url` is only used to name the exchange when the body cannot be decoded.
    pub fn from_raw(url: &str, raw: RawReply) -> Result<Self, ClientError> {
        let content_type = find_header(&raw.headers, CONTENT_TYPE).map(str::to_string);
        let (mime, charset) = content_type
            .as_deref()
            .map(parse_content_type)
            .unwrap_or_default();

        let (body, content_length) = if mime == APPLICATION_OCTET_STREAM {
            // A declared length of an encoded body is the wire size, not the
            // size of what the engine decoded.
            let encoded = find_header(&raw.headers, CONTENT_ENCODING)
                .is_some_and(|v| !v.trim().eq_ignore_ascii_case("identity"));
            let length = find_header(&raw.headers, CONTENT_LENGTH)
                .filter(|_| !encoded)
                .and_then(|v| v.trim().parse::<i64>().ok())
                .unwrap_or(-1);
            (Body::Bytes(raw.body), length)
        } else {
            let text = decode_text(raw.body, charset.as_deref()).map_err(|e| {
                error!(url, error = %e, "failed to decode response body");
                ClientError::read(url, e)
            })?;
            let length = text.chars().count() as i64;
            (Body::Text(text), length)
        };

        Ok(Self {
            status_code: raw.status_code.unwrap_or(0),
            status_text: raw.status_text,
            content_type,
            content_length,
            body,
            headers: raw.headers,
            streaming: raw.streaming,
        })
    }

    /// Status code, or 0 if the reply carried none.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    /// Raw `Content-Type` header value, parameters included.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Decoded character count for text bodies; the transport-reported length
    /// for byte bodies. Negative when unknown.
    pub fn content_length(&self) -> i64 {
        self.content_length
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Body as text. `None` when the body was kept as bytes.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Text(text) => Some(text),
            Body::Bytes(_) => None,
        }
    }

    /// Body as bytes. `None` when the body was decoded as text.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Bytes(bytes) => Some(bytes),
            Body::Text(_) => None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Reader over the drained body, whichever form it was kept in.
    pub fn body_reader(&self) -> Cursor<&[u8]> {
        match &self.body {
            Body::Text(text) => Cursor::new(text.as_bytes()),
            Body::Bytes(bytes) => Cursor::new(bytes.as_slice()),
        }
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.body {
            Body::Text(text) => serde_json::from_str(text),
            Body::Bytes(bytes) => serde_json::from_slice(bytes),
        }
    }

    /// First value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Every value of the named header, in the order received.
    pub fn headers(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Every header name with its values, both in the order first received.
    pub fn list_headers(&self) -> Vec<(String, Vec<String>)> {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (name, value) in &self.headers {
            match grouped.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
                Some((_, values)) => values.push(value.clone()),
                None => grouped.push((name.clone(), vec![value.clone()])),
            }
        }
        grouped
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status_code)?;
        if let Some(text) = &self.status_text {
            write!(f, " {text}")?;
        }
        if let Some(content_type) = &self.content_type {
            write!(f, " [{content_type}]")?;
        }
        Ok(())
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Split a `Content-Type` value into its lowercased MIME type and charset.
fn parse_content_type(value: &str) -> (String, Option<String>) {
    let mut parts = value.split(';');
    let mime = parts.next().unwrap_or("").trim().to_ascii_lowercase();
    let charset = parts.find_map(|param| {
        let (key, val) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| val.trim().trim_matches('"').to_ascii_lowercase())
    });
    (mime, charset)
}

fn decode_text(bytes: Vec<u8>, charset: Option<&str>) -> Result<String, FromUtf8Error> {
    match charset {
        Some("iso-8859-1" | "iso8859-1" | "latin1" | "latin-1") => {
            Ok(bytes.iter().map(|&b| char::from(b)).collect())
        }
        _ => String::from_utf8(bytes),
    }
}
