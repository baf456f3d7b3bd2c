//! The HTTP-send capability and its hyper-backed implementation.
//!
//! The transport core only needs one thing from HTTP: "POST these bytes and
//! hand back a status plus the collected body, or fail." That capability is
//! the [`HttpSend`] trait. [`HyperSend`] is the production implementation,
//! built on hyper_util's legacy pooled client; it owns the base URL and any
//! default headers, which keeps client bootstrapping out of the transport.
//!
//! # Feature Flags
//!
//! - `tls` - HTTPS support via rustls (ring provider, system root
//!   certificates). Without it the connector speaks plain HTTP only.
//!
//! # Example
//!
//! ```ignore
//! use thrift_http_transport::HyperSend;
//! use std::time::Duration;
//!
//! let send = HyperSend::builder("http://localhost:9090")
//!     .pool_idle_timeout(Duration::from_secs(60))
//!     .build()?;
//! ```

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http::uri::{Authority, PathAndQuery, Scheme, Uri};
use http::{HeaderMap, HeaderName, HeaderValue, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};

use crate::error::{BoxError, TransportError};

#[cfg(feature = "tls")]
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;
#[cfg(not(feature = "tls"))]
type Connector = HttpConnector;

type PooledClient = Client<Connector, Full<Bytes>>;

/// Capability consumed by [`HttpBufferedTransport`](crate::HttpBufferedTransport).
///
/// Implementations perform exactly one POST per call: resolve the request's
/// path against whatever base they are configured with, merge in their own
/// headers without overriding the ones already present, and return the
/// status together with the fully collected body. Any error before a status
/// is obtained surfaces as the boxed error.
///
/// The capability may be shared (a pooled client) across many transport
/// instances; each instance initiates one request at a time.
pub trait HttpSend {
    /// Send one POST request and collect the response body.
    fn post(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>, BoxError>> + Send;
}

/// HTTP-send capability backed by hyper_util's legacy pooled client.
///
/// Cloning is cheap and clones share the underlying connection pool.
#[derive(Clone)]
pub struct HyperSend {
    client: PooledClient,
    scheme: Scheme,
    authority: Authority,
    /// Path prefix from the base URL, without a trailing slash. Empty when
    /// the base URL had no path.
    base_path: String,
    default_headers: HeaderMap,
}

impl std::fmt::Debug for HyperSend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperSend")
            .field("scheme", &self.scheme)
            .field("authority", &self.authority)
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

impl HyperSend {
    /// Create a new builder with the given base URL.
    ///
    /// The base URL must include scheme and host, e.g. `http://localhost:9090`,
    /// and may carry a path prefix, e.g. `http://gateway.local/rpc`.
    pub fn builder<S: Into<String>>(base_url: S) -> HyperSendBuilder {
        HyperSendBuilder::new(base_url)
    }

    /// Create a capability with default settings for the given base URL.
    pub fn new<S: Into<String>>(base_url: S) -> Result<Self, TransportError> {
        Self::builder(base_url).build()
    }

    fn request_uri(&self, path_and_query: &str) -> Result<Uri, http::Error> {
        Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(format!("{}{}", self.base_path, path_and_query))
            .build()
    }
}

impl HttpSend for HyperSend {
    async fn post(&self, request: Request<Bytes>) -> Result<Response<Bytes>, BoxError> {
        let (mut parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(PathAndQuery::as_str)
            .unwrap_or("/");
        parts.uri = self.request_uri(path_and_query)?;

        for (name, value) in &self.default_headers {
            if !parts.headers.contains_key(name) {
                parts.headers.insert(name.clone(), value.clone());
            }
        }

        let request = Request::from_parts(parts, Full::new(body));
        let response = self.client.request(request).await?;

        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(Response::from_parts(parts, body))
    }
}

/// Builder for [`HyperSend`].
pub struct HyperSendBuilder {
    base_url: String,
    default_headers: HeaderMap,
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
    http2_only: bool,
}

impl std::fmt::Debug for HyperSendBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperSendBuilder")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.len())
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field("http2_only", &self.http2_only)
            .finish()
    }
}

impl HyperSendBuilder {
    /// Create a new builder with the given base URL.
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: HeaderMap::new(),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
            http2_only: false,
        }
    }

    /// Add a header applied to every request (auth tokens, routing hints).
    ///
    /// Headers already present on a request are never overridden, so the
    /// transport's content type always wins.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Use HTTP/2 with prior knowledge, skipping the HTTP/1.1 upgrade.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Build the capability.
    ///
    /// Fails with [`TransportError::Config`] when the base URL is missing a
    /// scheme or host, or (with the `tls` feature) when the system root
    /// certificates cannot be loaded.
    pub fn build(self) -> Result<HyperSend, TransportError> {
        let uri: Uri = self.base_url.parse().map_err(|e| {
            TransportError::config(format!("invalid base URL {:?}: {e}", self.base_url))
        })?;
        let scheme = uri
            .scheme()
            .cloned()
            .ok_or_else(|| TransportError::config("base URL must include a scheme"))?;
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| TransportError::config("base URL must include a host"))?;
        let base_path = uri.path().trim_end_matches('/').to_string();

        #[cfg(not(feature = "tls"))]
        if scheme == Scheme::HTTPS {
            return Err(TransportError::config(
                "https base URL requires the `tls` feature",
            ));
        }

        let connector = build_connector()?;

        let mut builder = Client::builder(TokioExecutor::new());
        // Pool timer is required for pool_idle_timeout to take effect
        builder.pool_timer(TokioTimer::new());
        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);
        if self.http2_only {
            builder.http2_only(true);
        }
        let client = builder.build(connector);

        Ok(HyperSend {
            client,
            scheme,
            authority,
            base_path,
            default_headers: self.default_headers,
        })
    }
}

#[cfg(feature = "tls")]
fn build_connector() -> Result<Connector, TransportError> {
    let connector = hyper_rustls::HttpsConnectorBuilder::new()
        .with_native_roots()
        .map_err(|e| {
            TransportError::config(format!("failed to load native root certificates: {e}"))
        })?
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();
    Ok(connector)
}

#[cfg(not(feature = "tls"))]
fn build_connector() -> Result<Connector, TransportError> {
    Ok(HttpConnector::new())
}
