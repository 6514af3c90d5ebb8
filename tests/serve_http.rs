//! End-to-end tests: routers served over a real TCP socket.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use apiutil::routing::VersionRouter;
use apiutil::server::{bind_listener, run_accept_loop, ConnectionSettings, HttpsRedirectServer};
use apiutil::{write_json, HttpResponse};
use hyper::body::Incoming;
use hyper::{Request, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

fn settings() -> ConnectionSettings {
    ConnectionSettings {
        timeout: Duration::from_secs(5),
        access_log_format: Some("combined".to_string()),
        ..ConnectionSettings::default()
    }
}

async fn greet(version: &'static str) -> HttpResponse {
    write_json(&serde_json::json!({ "version": version }), StatusCode::OK)
}

/// Serve a v1/v2 router without a default handler
async fn start_router() -> (SocketAddr, oneshot::Sender<()>, JoinHandle<()>) {
    let router: VersionRouter<Incoming> = VersionRouter::new()
        .route("v1", |_req: Request<Incoming>| greet("v1"))
        .route("v2", |_req: Request<Incoming>| greet("v2"));

    let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let task = tokio::spawn(run_accept_loop(
        listener,
        Arc::new(router),
        settings(),
        async move {
            let _ = rx.await;
        },
        "test",
    ));
    (addr, tx, task)
}

/// Send one request with `Connection: close` and return the raw response
async fn send(addr: SocketAddr, method: &str, headers: &[(&str, &str)]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut request = format!("{method} /things?id=1 HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n");
    for (name, value) in headers {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    request.push_str("\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut buf = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), stream.read_to_end(&mut buf))
        .await
        .expect("response within timeout")
        .unwrap();
    String::from_utf8(buf).unwrap().to_ascii_lowercase()
}

#[tokio::test]
async fn test_routes_by_version_header() {
    let (addr, shutdown, task) = start_router().await;

    let resp = send(addr, "GET", &[("X-API-Version", "v2")]).await;
    assert!(resp.starts_with("http/1.1 200"), "got {resp}");
    assert!(resp.contains("content-type: application/json"));
    assert!(resp.ends_with(r#"{"version":"v2"}"#), "got {resp}");

    let resp = send(addr, "POST", &[("X-API-Version", "v1")]).await;
    assert!(resp.ends_with(r#"{"version":"v1"}"#), "got {resp}");

    shutdown.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("accept loop stops after shutdown")
        .unwrap();
}

#[tokio::test]
async fn test_missing_version_without_default() {
    let (addr, _shutdown, _task) = start_router().await;

    let resp = send(addr, "GET", &[("Accept", "application/json")]).await;
    assert!(resp.starts_with("http/1.1 400"), "got {resp}");
    assert!(resp.ends_with(r#"{"error":"the x-api-version header is required"}"#));

    let resp = send(addr, "GET", &[("X-API-Version", "v3")]).await;
    assert!(resp.starts_with("http/1.1 400"), "got {resp}");
    assert!(resp.contains("content-type: text/plain"));
    assert!(resp.ends_with("the x-api-version header is required\n"));
}

#[tokio::test]
async fn test_options_discovery() {
    let (addr, _shutdown, _task) = start_router().await;

    let resp = send(addr, "OPTIONS", &[]).await;
    assert!(resp.starts_with("http/1.1 200"), "got {resp}");
    assert!(resp.contains("x-api-version-required: yes"));
    let listed = resp
        .lines()
        .find_map(|line| line.strip_prefix("x-api-version: "))
        .expect("x-api-version header present");
    let mut versions: Vec<&str> = listed.trim_end().split(", ").collect();
    versions.sort_unstable();
    assert_eq!(versions, vec!["v1", "v2"]);
}

#[tokio::test]
async fn test_https_redirect_server() {
    let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let server = HttpsRedirectServer::new(addr).with_settings(settings());
    let task = tokio::spawn(server.serve_on(listener, async move {
        let _ = rx.await;
    }));

    let resp = send(addr, "GET", &[]).await;
    assert!(resp.starts_with("http/1.1 301"), "got {resp}");
    assert!(resp.contains("location: https://example.com/things?id=1"));

    tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("redirect server stops after shutdown")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_shutdown_closes_idle_keep_alive_connections() {
    let router: VersionRouter<Incoming> =
        VersionRouter::new().route("v1", |_req: Request<Incoming>| greet("v1"));
    let listener = bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    let settings = ConnectionSettings {
        timeout: Duration::from_secs(30),
        ..ConnectionSettings::default()
    };
    let task = tokio::spawn(run_accept_loop(
        listener,
        Arc::new(router),
        settings,
        async move {
            let _ = rx.await;
        },
        "test",
    ));

    // One request on a keep-alive connection, which then sits idle
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: example.com\r\nX-API-Version: v1\r\n\r\n")
        .await
        .unwrap();
    let mut buf = [0_u8; 1024];
    let n = stream.read(&mut buf).await.unwrap();
    assert!(buf[..n].starts_with(b"HTTP/1.1 200"));

    tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(3), task)
        .await
        .expect("idle connection must not hold shutdown for the request timeout")
        .unwrap();

    let mut rest = Vec::new();
    let closed = tokio::time::timeout(Duration::from_secs(3), stream.read_to_end(&mut rest)).await;
    assert!(closed.is_ok(), "server closes the idle connection");
}
