//! Upstream failure handling: timeouts, refused connections, upstream errors.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let upstream = common::start_slow_upstream(Duration::from_secs(3)).await;
    let mut config = common::test_config(upstream);
    config.timeouts.upstream_secs = 0.2;
    let (gateway, shutdown) = common::spawn_gateway(config).await;

    let start = Instant::now();
    let res = common::client()
        .get(format!("http://{gateway}/v1/orders/42"))
        .header("authorization", common::bearer("user-42", &[]))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(start.elapsed() < Duration::from_secs(2));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UPSTREAM_TIMEOUT");
    assert_eq!(
        body["error"]["message"],
        "Upstream service timed out after 0.2s."
    );
    assert!(body["error"].get("docs_url").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_refused_upstream_is_unavailable() {
    let (gateway, shutdown) = common::spawn_gateway(common::test_config(common::unused_addr())).await;

    let res = common::client()
        .get(format!("http://{gateway}/v1/users/me"))
        .header("authorization", common::bearer("user-42", &[]))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(
        body["error"]["message"],
        "Upstream service is currently unavailable."
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_errors_pass_through() {
    let upstream =
        common::start_programmable_upstream(|| async { (500, "kitchen on fire".to_string()) })
            .await;
    let (gateway, shutdown) = common::spawn_gateway(common::test_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{gateway}/v1/events"))
        .header("authorization", common::bearer("user-42", &[]))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.headers()["content-type"], "text/plain");
    assert_eq!(res.text().await.unwrap(), "kitchen on fire");

    shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let upstream = common::start_echo_upstream().await;
    let (gateway, shutdown) = common::spawn_gateway(common::test_config(upstream)).await;

    let res = common::client()
        .get(format!("http://{gateway}/health/live"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let client = reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .timeout(Duration::from_secs(2))
        .build()
        .unwrap();
    assert!(client
        .get(format!("http://{gateway}/health/live"))
        .send()
        .await
        .is_err());
}
