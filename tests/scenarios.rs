//! End-to-end scenarios against a real, listening server (spec §8
//! "Concrete end-to-end scenarios").

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use mockd::config::ServerConfig;
use serde_json::json;

mod common;

fn config(port: u16) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
        persist_expectations: false,
        ..ServerConfig::default()
    }
}

fn base_url(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

#[tokio::test]
async fn exact_json_match_returns_canned_reply() {
    let (addr, shutdown) = common::start_mockd(config(29101)).await;
    let client = reqwest::Client::new();

    let put = client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "httpRequest": {
                "method": "POST",
                "path": "/api/users",
                "body": {"type": "json", "value": {"name": "Alice", "age": 30}}
            },
            "httpResponse": {
                "statusCode": 201,
                "body": {"status": "created"}
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(put.status(), 201);

    let res = client
        .post(format!("{}/api/users", base_url(addr)))
        .json(&json!({"name": "Alice", "age": 30}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({"status": "created"}));

    shutdown.trigger();
}

#[tokio::test]
async fn wildcard_path_matches_and_falls_through() {
    let (addr, shutdown) = common::start_mockd(config(29102)).await;
    let client = reqwest::Client::new();

    client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "httpRequest": {"path": "/api/users/*"},
            "httpResponse": {"statusCode": 200}
        }))
        .send()
        .await
        .unwrap();

    let hit = client
        .get(format!("{}/api/users/42", base_url(addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(hit.status(), 200);

    let miss = client
        .get(format!("{}/other/42", base_url(addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(miss.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn priority_tie_break_prefers_greater_id() {
    let (addr, shutdown) = common::start_mockd(config(29103)).await;
    let client = reqwest::Client::new();

    for id in ["aaa", "zzz"] {
        client
            .put(format!("{}/mockserver/expectation", base_url(addr)))
            .json(&json!({
                "id": id,
                "priority": 5,
                "httpRequest": {"path": "/x"},
                "httpResponse": {"statusCode": 200, "body": {"winner": id}}
            }))
            .send()
            .await
            .unwrap();
    }

    let res = client.get(format!("{}/x", base_url(addr))).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["winner"], "zzz");

    shutdown.trigger();
}

#[tokio::test]
async fn priority_winner_beats_lexicographically_greater_id() {
    let (addr, shutdown) = common::start_mockd(config(29104)).await;
    let client = reqwest::Client::new();

    client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "id": "zzz", "priority": 1,
            "httpRequest": {"path": "/x"},
            "httpResponse": {"statusCode": 200, "body": {"winner": "zzz"}}
        }))
        .send()
        .await
        .unwrap();
    client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "id": "aaa", "priority": 10,
            "httpRequest": {"path": "/x"},
            "httpResponse": {"statusCode": 200, "body": {"winner": "aaa"}}
        }))
        .send()
        .await
        .unwrap();

    let res = client.get(format!("{}/x", base_url(addr))).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["winner"], "aaa");

    shutdown.trigger();
}

#[tokio::test]
async fn json_unit_placeholder_matches_type_not_value() {
    let (addr, shutdown) = common::start_mockd(config(29105)).await;
    let client = reqwest::Client::new();

    client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "httpRequest": {
                "method": "POST",
                "path": "/placeholder",
                "body": {"type": "json", "value": {"id": "${json-unit.any-number}", "name": "${json-unit.any-string}"}}
            },
            "httpResponse": {"statusCode": 200}
        }))
        .send()
        .await
        .unwrap();

    let matches = client
        .post(format!("{}/placeholder", base_url(addr)))
        .json(&json!({"id": 7, "name": "bob"}))
        .send()
        .await
        .unwrap();
    assert_eq!(matches.status(), 200);

    let no_match = client
        .post(format!("{}/placeholder", base_url(addr)))
        .json(&json!({"id": "7", "name": "bob"}))
        .send()
        .await
        .unwrap();
    assert_eq!(no_match.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn forward_proxies_upstream_and_502s_when_unreachable() {
    let backend_addr: SocketAddr = "127.0.0.1:29150".parse().unwrap();
    common::start_mock_backend(backend_addr, "upstream-ok").await;

    let (addr, shutdown) = common::start_mockd(config(29106)).await;
    let client = reqwest::Client::new();

    client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "httpRequest": {"path": "/proxy/*"},
            "httpForward": {"host": "127.0.0.1", "port": 29150, "scheme": "HTTP"}
        }))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/proxy/x?a=1&a=2", base_url(addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "upstream-ok");

    client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "httpRequest": {"path": "/dead/*"},
            "httpForward": {"host": "127.0.0.1", "port": 29151, "scheme": "HTTP"}
        }))
        .send()
        .await
        .unwrap();

    let dead = client
        .get(format!("{}/dead/x", base_url(addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(dead.status(), 502);

    shutdown.trigger();
}

#[tokio::test]
async fn forward_proxies_https_upstream_without_verifying_certificate() {
    let backend_addr: SocketAddr = "127.0.0.1:29152".parse().unwrap();
    common::start_https_mock_backend(backend_addr, "upstream-tls-ok").await;

    let (addr, shutdown) = common::start_mockd(config(29110)).await;
    let client = reqwest::Client::new();

    client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "httpRequest": {"path": "/secure/*"},
            "httpForward": {"host": "127.0.0.1", "port": 29152, "scheme": "HTTPS"}
        }))
        .send()
        .await
        .unwrap();

    let res = client
        .get(format!("{}/secure/x", base_url(addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "upstream-tls-ok");

    shutdown.trigger();
}

#[tokio::test]
async fn delay_holds_the_response_for_at_least_the_configured_time() {
    let (addr, shutdown) = common::start_mockd(config(29107)).await;
    let client = reqwest::Client::new();

    client
        .put(format!("{}/mockserver/expectation", base_url(addr)))
        .json(&json!({
            "httpRequest": {"path": "/slow"},
            "httpResponse": {"statusCode": 200, "delay": {"timeUnit": "MILLISECONDS", "value": 100}}
        }))
        .send()
        .await
        .unwrap();

    let start = Instant::now();
    let res = client.get(format!("{}/slow", base_url(addr))).send().await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(res.status(), 200);
    assert!(elapsed >= Duration::from_millis(100), "elapsed {elapsed:?} was under 100ms");

    shutdown.trigger();
}

#[tokio::test]
async fn persistence_round_trip_survives_a_restart() {
    let tmp = tempfile::tempdir().unwrap();
    let persist_path = tmp.path().join("expectations.json");

    let mut cfg = config(29108);
    cfg.persist_expectations = true;
    cfg.persisted_expectations_path = persist_path.clone();

    let client = reqwest::Client::new();

    let (addr, shutdown) = common::start_mockd(cfg.clone()).await;
    for id in ["one", "two"] {
        client
            .put(format!("{}/mockserver/expectation", base_url(addr)))
            .json(&json!({
                "id": id,
                "httpRequest": {"path": format!("/{id}")},
                "httpResponse": {"statusCode": 200}
            }))
            .send()
            .await
            .unwrap();
    }
    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    cfg.port = 29109;
    let (addr, shutdown) = common::start_mockd(cfg).await;
    let res = client
        .get(format!("{}/mockserver/expectation", base_url(addr)))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    let ids: Vec<&str> = body.as_array().unwrap().iter().map(|e| e["id"].as_str().unwrap()).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"one"));
    assert!(ids.contains(&"two"));

    shutdown.trigger();
}
