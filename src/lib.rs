//! Buffered HTTP transport for Thrift-style binary RPC protocols.
//!
//! This crate carries framed RPC payloads over HTTP instead of a raw socket.
//! A protocol codec writes an encoded message into the transport's outbound
//! buffer, [`HttpBufferedTransport::flush`] performs exactly one HTTP POST
//! (header `Content-Type: application/x-thrift`) with the accumulated bytes
//! as the body, and the codec then reads the response body back in order.
//!
//! ## Features
//!
//! - The [`Transport`] contract (`write` / `read` / `is_open` / `flush`) in
//!   the same shape a socket-backed transport exposes, keeping codecs
//!   transport-agnostic
//! - Strict status handling: only 200 yields readable bytes; anything else
//!   is [`TransportError::UnexpectedStatus`]
//! - Unconditional outbound-buffer reset on every flush outcome, so a failed
//!   call never resends stale bytes
//! - [`HyperSend`], a pooled hyper-based HTTP capability; any other client
//!   plugs in through the [`HttpSend`] trait
//!
//! ## Example
//!
//! ```ignore
//! use thrift_http_transport::{HttpBufferedTransport, HyperSend};
//!
//! let send = HyperSend::new("http://localhost:9090")?;
//! let mut transport = HttpBufferedTransport::builder()
//!     .http_client(send)
//!     .path("/calculator")
//!     .build()?;
//!
//! // One RPC call: write* -> flush -> read*
//! transport.write(&encoded_request);
//! transport.flush().await?;
//! let response_bytes = transport.read(expected_len);
//! ```
//!
//! For concurrent RPC calls, create one transport per in-flight call and
//! clone the [`HyperSend`] capability between them; clones share one
//! connection pool.
//!
//! ## Feature Flags
//!
//! - `tls` - HTTPS support for [`HyperSend`] via rustls
//! - `tracing` - span and debug events around each flush exchange

mod buffer;
mod error;
mod send;
mod transport;

pub use error::{BoxError, TransportError};
pub use send::{HttpSend, HyperSend, HyperSendBuilder};
pub use transport::{
    HttpBufferedTransport, THRIFT_CONTENT_TYPE, Transport, TransportBuilder,
};

/// Crate version, as recorded by the packaging step.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
