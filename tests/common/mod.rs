//! Shared harness for integration tests: stub upstreams and a gateway on
//! ephemeral ports.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::Request, response::IntoResponse, Json, Router};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use fleetbite_gateway::config::GatewayConfig;
use fleetbite_gateway::lifecycle::Shutdown;
use fleetbite_gateway::security::tokens::TokenIssuer;
use fleetbite_gateway::HttpServer;
use jsonwebtoken::Algorithm;

pub const SECRET: &str = "integration-test-secret";

/// Header every echo response carries, to prove pass-through.
pub const UPSTREAM_MARKER: &str = "x-upstream-marker";

/// Upstream that answers every request with a JSON description of what it
/// received.
pub async fn start_echo_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

async fn echo(request: Request) -> impl IntoResponse {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let headers: BTreeMap<String, String> = parts
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();

    (
        [(UPSTREAM_MARKER, "echo")],
        Json(json!({
            "method": parts.method.as_str(),
            "path": parts.uri.path(),
            "query": parts.uri.query(),
            "headers": headers,
            "body": String::from_utf8_lossy(&body),
        })),
    )
}

/// Upstream that waits `delay` before answering 200.
pub async fn start_slow_upstream(delay: Duration) -> SocketAddr {
    start_programmable_upstream(move || async move {
        tokio::time::sleep(delay).await;
        (200, "slow".to_string())
    })
    .await
}

/// Raw HTTP/1.1 upstream whose status and body come from `f`.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = std::sync::Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;

                let (status, body) = f().await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// An address nothing listens on.
pub fn unused_addr() -> SocketAddr {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
}

/// Default configuration with the test secret and every service pointed at
/// `upstream`.
pub fn test_config(upstream: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.secret = SECRET.to_string();
    config.observability.metrics_enabled = false;
    for url in config.services.values_mut() {
        *url = format!("http://{upstream}");
    }
    config
}

/// Start a gateway for `config` on an ephemeral port.
pub async fn spawn_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// `Authorization` value for a fresh token.
pub fn bearer(subject: &str, roles: &[&str]) -> String {
    let token = TokenIssuer::new(SECRET.as_bytes(), Algorithm::HS256, Duration::from_secs(300))
        .issue(subject, roles.iter().map(|r| r.to_string()).collect())
        .unwrap();
    format!("Bearer {token}")
}
