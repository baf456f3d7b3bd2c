//! End-to-end write/flush/read cycles through [`HyperSend`] against an
//! in-process axum server.

use std::net::SocketAddr;

use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;

use thrift_http_transport::{
    HttpBufferedTransport, HyperSend, THRIFT_CONTENT_TYPE, TransportError,
};

/// Echo the body back reversed, rejecting anything that is not marked as a
/// Thrift payload.
async fn reverse_echo(headers: HeaderMap, body: Bytes) -> Result<Vec<u8>, StatusCode> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if content_type != THRIFT_CONTENT_TYPE {
        return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
    Ok(body.iter().rev().copied().collect())
}

async fn require_api_key(headers: HeaderMap) -> Result<&'static str, StatusCode> {
    match headers.get("x-api-key") {
        Some(v) if v.as_bytes() == b"sesame" => Ok("ok"),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn test_router() -> Router {
    Router::new()
        .route("/", post(reverse_echo))
        .route("/calculator", post(reverse_echo))
        .route("/guarded", post(require_api_key))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn roundtrip_at_root() {
    let addr = serve(test_router()).await;
    let send = HyperSend::new(format!("http://{addr}")).unwrap();
    let mut transport = HttpBufferedTransport::new(send);

    transport.write(b"hello, ");
    transport.write(b"world");
    transport.flush().await.unwrap();

    assert_eq!(&transport.read(64)[..], b"dlrow ,olleh");
    assert!(transport.read(1).is_empty());
}

#[tokio::test]
async fn sequential_cycles_do_not_mix() {
    let addr = serve(test_router()).await;
    let send = HyperSend::new(format!("http://{addr}")).unwrap();
    let mut transport = HttpBufferedTransport::new(send);

    transport.write(b"abc");
    transport.flush().await.unwrap();
    assert_eq!(&transport.read(16)[..], b"cba");

    transport.write(b"12345");
    transport.flush().await.unwrap();
    assert_eq!(&transport.read(16)[..], b"54321");
}

#[tokio::test]
async fn custom_path_is_routed() {
    let addr = serve(test_router()).await;
    let send = HyperSend::new(format!("http://{addr}")).unwrap();
    let mut transport = HttpBufferedTransport::builder()
        .http_client(send)
        .path("/calculator")
        .build()
        .unwrap();

    transport.write(b"sum");
    transport.flush().await.unwrap();
    assert_eq!(&transport.read(8)[..], b"mus");
}

#[tokio::test]
async fn unrouted_path_maps_to_unexpected_status() {
    let addr = serve(test_router()).await;
    let send = HyperSend::new(format!("http://{addr}")).unwrap();
    let mut transport = HttpBufferedTransport::builder()
        .http_client(send.clone())
        .path("/missing")
        .build()
        .unwrap();

    transport.write(b"anyone home");
    let err = transport.flush().await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

    // The same capability still serves a working transport afterwards
    let mut transport = HttpBufferedTransport::new(send);
    transport.write(b"ok");
    transport.flush().await.unwrap();
    assert_eq!(&transport.read(4)[..], b"ko");
}

#[tokio::test]
async fn default_headers_are_merged() {
    let addr = serve(test_router()).await;
    let send = HyperSend::builder(format!("http://{addr}"))
        .default_header("x-api-key".parse().unwrap(), "sesame".parse().unwrap())
        .build()
        .unwrap();
    let mut transport = HttpBufferedTransport::builder()
        .http_client(send)
        .path("/guarded")
        .build()
        .unwrap();

    transport.write(b"knock");
    transport.flush().await.unwrap();
    assert_eq!(&transport.read(4)[..], b"ok");
}

#[tokio::test]
async fn connection_failure_wraps_as_transport_failure() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let send = HyperSend::new(format!("http://{addr}")).unwrap();
    let mut transport = HttpBufferedTransport::new(send);

    transport.write(b"into the void");
    let err = transport.flush().await.unwrap_err();
    assert!(matches!(err, TransportError::Failure(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn base_url_path_prefix_is_prepended() {
    async fn prefixed(body: Bytes) -> Vec<u8> {
        body.iter().rev().copied().collect()
    }
    let router = Router::new().route("/rpc/calculator", post(prefixed));
    let addr = serve(router).await;

    let send = HyperSend::new(format!("http://{addr}/rpc")).unwrap();
    let mut transport = HttpBufferedTransport::builder()
        .http_client(send)
        .path("/calculator")
        .build()
        .unwrap();

    transport.write(b"add");
    transport.flush().await.unwrap();
    assert_eq!(&transport.read(8)[..], b"dda");
}
