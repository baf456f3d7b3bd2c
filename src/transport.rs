//! The buffered HTTP transport core.
//!
//! [`HttpBufferedTransport`] carries a binary RPC protocol over HTTP: the
//! codec layer writes an encoded message into the outbound buffer, `flush`
//! performs exactly one POST exchange, and the codec then reads the response
//! bytes back in order. [`Transport`] is the narrow contract that keeps the
//! codec transport-agnostic.

use std::future::Future;

use bytes::Bytes;
use http::uri::PathAndQuery;
use http::{Method, Request, StatusCode, header};

#[cfg(feature = "tracing")]
use tracing::{Instrument, debug, info_span};

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::error::TransportError;
use crate::send::HttpSend;

/// Content type for Thrift-framed payloads carried over HTTP.
pub const THRIFT_CONTENT_TYPE: &str = "application/x-thrift";

/// Byte-level channel abstraction consumed by a protocol encoder/decoder.
///
/// This is the same shape a socket-backed transport would expose, so a codec
/// written against it never learns that its bytes ride over HTTP. `write`,
/// `read`, and `is_open` are pure in-memory operations; `flush` is the only
/// one that suspends.
pub trait Transport {
    /// Append `data` to the outbound buffer. No I/O occurs.
    fn write(&mut self, data: &[u8]);

    /// Up to `n` bytes from the inbound buffer, advancing the read cursor.
    ///
    /// Returns fewer bytes than requested (possibly none) when the buffer is
    /// exhausted or no exchange has happened yet. Never errors.
    fn read(&mut self, n: usize) -> Bytes;

    /// Whether the transport is usable.
    fn is_open(&self) -> bool;

    /// Turn the buffered outbound bytes into one network exchange and
    /// replace the inbound buffer with the response.
    fn flush(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Buffered request/response transport over HTTP.
///
/// Owns one outbound buffer and one inbound buffer, plus an [`HttpSend`]
/// capability `S` and an immutable target path (fixed at construction,
/// default `/`). Intended call sequence per RPC: `write*` then `flush` then
/// `read*`. All mutating operations take `&mut self`, so one instance cannot
/// be used by two calls at once; for concurrent RPCs, create one transport
/// per in-flight call and share the capability (it pools connections).
///
/// # Example
///
/// ```ignore
/// use thrift_http_transport::{HttpBufferedTransport, HyperSend};
///
/// let send = HyperSend::new("http://localhost:9090")?;
/// let mut transport = HttpBufferedTransport::builder()
///     .http_client(send)
///     .path("/calculator")
///     .build()?;
///
/// transport.write(&encoded_call);
/// transport.flush().await?;
/// let frame_header = transport.read(4);
/// ```
pub struct HttpBufferedTransport<S> {
    http_client: S,
    path: PathAndQuery,
    outbound: WriteBuffer,
    inbound: ReadBuffer,
}

impl<S> std::fmt::Debug for HttpBufferedTransport<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBufferedTransport")
            .field("path", &self.path)
            .field("outbound_len", &self.outbound.len())
            .field("inbound_remaining", &self.inbound.remaining())
            .finish_non_exhaustive()
    }
}

impl<S> HttpBufferedTransport<S> {
    /// Create a transport posting to the base resource `/`.
    pub fn new(http_client: S) -> Self {
        Self {
            http_client,
            path: PathAndQuery::from_static("/"),
            outbound: WriteBuffer::new(),
            inbound: ReadBuffer::default(),
        }
    }

    /// Create a new [`TransportBuilder`].
    pub fn builder() -> TransportBuilder<S> {
        TransportBuilder::new()
    }

    /// The target path every flush posts to.
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Append `data` to the outbound buffer. No size limit is enforced here;
    /// framing and limits belong to the protocol layer.
    pub fn write(&mut self, data: &[u8]) {
        self.outbound.put(data);
    }

    /// Up to `n` bytes from the inbound buffer, advancing the read cursor.
    ///
    /// Short (possibly empty) reads signal exhaustion, exactly as on any
    /// stream-oriented byte buffer. Never errors.
    pub fn read(&mut self, n: usize) -> Bytes {
        self.inbound.read(n)
    }

    /// Always true: there is no persistent connection to open or close, so
    /// "open" degrades to "usable".
    pub fn is_open(&self) -> bool {
        true
    }
}

impl<S: HttpSend> HttpBufferedTransport<S> {
    /// Perform one HTTP POST carrying everything written since the last
    /// flush, then expose the response body through [`read`](Self::read).
    ///
    /// The outbound buffer is emptied on every path, success or failure, so
    /// a failed flush leaves the transport ready for a fresh `write`/`flush`
    /// cycle and stale bytes are never resent.
    ///
    /// # Errors
    ///
    /// - [`TransportError::UnexpectedStatus`] when the exchange completes
    ///   with a status other than 200. The inbound buffer is left untouched,
    ///   but callers must treat a failed flush as invalidating any pending
    ///   reads.
    /// - [`TransportError::Failure`] when the HTTP capability fails before a
    ///   status is obtained.
    pub async fn flush(&mut self) -> Result<(), TransportError> {
        // Taking the buffer resets it up front, which covers every exit path
        // below without deferred-cleanup machinery.
        let body = self.outbound.take();
        debug_assert!(self.outbound.is_empty());

        // Instrumenting the exchange future (rather than entering the span)
        // keeps the flush future Send.
        #[cfg(feature = "tracing")]
        {
            let span = info_span!(
                "transport.flush",
                http.path = %self.path,
                otel.kind = "client",
            );
            self.exchange(body).instrument(span).await
        }
        #[cfg(not(feature = "tracing"))]
        {
            self.exchange(body).await
        }
    }

    async fn exchange(&mut self, body: Bytes) -> Result<(), TransportError> {
        #[cfg(feature = "tracing")]
        debug!(body_len = body.len(), "sending buffered request");

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.path.as_str())
            .header(header::CONTENT_TYPE, THRIFT_CONTENT_TYPE)
            .body(body)
            .map_err(TransportError::failure)?;

        let response = self
            .http_client
            .post(request)
            .await
            .map_err(TransportError::Failure)?;

        let status = response.status();
        #[cfg(feature = "tracing")]
        debug!(status = %status, "exchange completed");

        if status != StatusCode::OK {
            return Err(TransportError::UnexpectedStatus(status));
        }

        self.inbound = ReadBuffer::new(response.into_body());
        Ok(())
    }
}

impl<S: HttpSend + Send + Sync> Transport for HttpBufferedTransport<S> {
    fn write(&mut self, data: &[u8]) {
        HttpBufferedTransport::write(self, data);
    }

    fn read(&mut self, n: usize) -> Bytes {
        HttpBufferedTransport::read(self, n)
    }

    fn is_open(&self) -> bool {
        HttpBufferedTransport::is_open(self)
    }

    fn flush(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send {
        HttpBufferedTransport::flush(self)
    }
}

/// Builder for [`HttpBufferedTransport`].
///
/// The HTTP client is required; the path is optional and resolved eagerly to
/// `/` when absent, so a built transport never has an unset path.
#[derive(Debug)]
pub struct TransportBuilder<S> {
    http_client: Option<S>,
    path: Option<String>,
}

impl<S> Default for TransportBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> TransportBuilder<S> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            http_client: None,
            path: None,
        }
    }

    /// Set the HTTP-send capability. Required.
    pub fn http_client(mut self, client: S) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the target path, e.g. `/calculator`. Defaults to `/`.
    pub fn path<P: Into<String>>(mut self, path: P) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Build the transport.
    ///
    /// Fails with [`TransportError::Config`] when no HTTP client was
    /// supplied or the path is not an absolute HTTP path.
    pub fn build(self) -> Result<HttpBufferedTransport<S>, TransportError> {
        let http_client = self
            .http_client
            .ok_or_else(|| TransportError::config("an HTTP client is required"))?;

        let path = match self.path {
            None => PathAndQuery::from_static("/"),
            Some(p) => {
                if !p.starts_with('/') {
                    return Err(TransportError::config(format!(
                        "path {p:?} must start with '/'"
                    )));
                }
                p.parse::<PathAndQuery>()
                    .map_err(|e| TransportError::config(format!("invalid path {p:?}: {e}")))?
            }
        };

        Ok(HttpBufferedTransport {
            http_client,
            path,
            outbound: WriteBuffer::new(),
            inbound: ReadBuffer::default(),
        })
    }
}
