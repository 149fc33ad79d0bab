//! Ingestion endpoint integration tests.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use telemetry_relay::config::RelayConfig;

mod common;

use common::{sample, series_count, spawn_default_relay, spawn_relay};

fn event_body(event_type: &str, session_id: &str) -> Value {
    json!({
        "type": event_type,
        "timestamp": Utc::now().to_rfc3339(),
        "session_id": session_id,
        "correlation_id": "corr_test",
    })
}

#[tokio::test]
async fn test_event_counted_once() {
    let relay = spawn_default_relay().await;
    let client = reqwest::Client::new();

    let res = client
        .post(relay.url("/api/telemetry/events"))
        .json(&event_body("game_start", "session_a"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let ack: Value = res.json().await.unwrap();
    assert_eq!(ack, json!({"status": "received"}));

    let rendered = relay.metrics.render();
    assert_eq!(
        sample(
            &rendered,
            "client_events_total",
            &[("event_type", "game_start"), ("session_id", "session_a")]
        ),
        Some(1.0)
    );
    assert_eq!(
        sample(
            &rendered,
            "game_metrics",
            &[("metric_type", "game_sessions"), ("session_id", "session_a")]
        ),
        Some(1.0)
    );
}

#[tokio::test]
async fn test_list_and_null_attributes_accepted() {
    let relay = spawn_default_relay().await;

    let mut body = event_body("inventory_update", "session_attrs");
    body["attributes"] = json!({
        "keys": ["a", "b"],
        "slots": [[1, 2], {"hp": 3}],
        "x": null,
    });
    let res = reqwest::Client::new()
        .post(relay.url("/api/telemetry/events"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(
        sample(
            &relay.metrics.render(),
            "client_events_total",
            &[("event_type", "inventory_update"), ("session_id", "session_attrs")]
        ),
        Some(1.0)
    );
}

#[tokio::test]
async fn test_level_change_sets_gauge() {
    let relay = spawn_default_relay().await;
    let client = reqwest::Client::new();

    for level in [3, 5] {
        let mut body = event_body("level_change", "session_lvl");
        body["level"] = json!(level);
        let res = client
            .post(relay.url("/api/telemetry/events"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let rendered = relay.metrics.render();
    assert_eq!(
        sample(
            &rendered,
            "game_metrics",
            &[("metric_type", "current_level"), ("session_id", "session_lvl")]
        ),
        Some(5.0)
    );
    assert_eq!(
        sample(
            &rendered,
            "client_events_total",
            &[("event_type", "level_change"), ("session_id", "session_lvl")]
        ),
        Some(2.0)
    );
}

#[tokio::test]
async fn test_score_change_without_score_skips_gauge() {
    let relay = spawn_default_relay().await;

    let res = reqwest::Client::new()
        .post(relay.url("/api/telemetry/events"))
        .json(&event_body("score_change", "session_noscore"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let rendered = relay.metrics.render();
    assert_eq!(
        sample(
            &rendered,
            "client_events_total",
            &[("event_type", "score_change"), ("session_id", "session_noscore")]
        ),
        Some(1.0)
    );
    assert_eq!(series_count(&rendered, "game_metrics"), 0);
}

#[tokio::test]
async fn test_unknown_event_type_has_no_gauge() {
    let relay = spawn_default_relay().await;

    let res = reqwest::Client::new()
        .post(relay.url("/api/telemetry/events"))
        .json(&event_body("button_click", "session_ui"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let rendered = relay.metrics.render();
    assert_eq!(
        sample(&rendered, "client_events_total", &[("event_type", "button_click")]),
        Some(1.0)
    );
    assert_eq!(series_count(&rendered, "game_metrics"), 0);
}

#[tokio::test]
async fn test_malformed_bodies_rejected() {
    let relay = spawn_default_relay().await;
    let client = reqwest::Client::new();

    for path in ["/api/telemetry/events", "/api/telemetry/metrics"] {
        for body in ["{not json", "{}", r#"{"type": 12}"#, ""] {
            let res = client
                .post(relay.url(path))
                .header("content-type", "application/json")
                .body(body)
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{} {:?}", path, body);
        }
    }

    let rendered = relay.metrics.render();
    assert_eq!(series_count(&rendered, "client_events_total"), 0);
    assert_eq!(series_count(&rendered, "client_metrics_total"), 0);
    assert_eq!(series_count(&rendered, "game_metrics"), 0);
}

#[tokio::test]
async fn test_headers_override_body_identity() {
    let relay = spawn_default_relay().await;

    let res = reqwest::Client::new()
        .post(relay.url("/api/telemetry/events"))
        .header("X-Session-ID", "session_header")
        .header("X-Correlation-ID", "corr_header")
        .json(&event_body("game_start", "session_body"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let rendered = relay.metrics.render();
    assert_eq!(
        sample(&rendered, "client_events_total", &[("session_id", "session_header")]),
        Some(1.0)
    );
    assert_eq!(
        sample(&rendered, "client_events_total", &[("session_id", "session_body")]),
        None
    );
}

#[tokio::test]
async fn test_metric_ingestion() {
    let relay = spawn_default_relay().await;
    let client = reqwest::Client::new();

    let gauge = json!({
        "name": "fps",
        "value": 58.5,
        "type": "gauge",
        "timestamp": Utc::now().to_rfc3339(),
        "session_id": "session_m",
    });
    let histogram = json!({
        "name": "frame_time_ms",
        "value": 17.0,
        "kind": "histogram",
        "timestamp": Utc::now().to_rfc3339(),
        "session_id": "session_m",
        "labels": {"scene": "menu"},
    });

    for body in [&gauge, &histogram] {
        let res = client
            .post(relay.url("/api/telemetry/metrics"))
            .json(body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let rendered = relay.metrics.render();
    assert_eq!(
        sample(
            &rendered,
            "game_metrics",
            &[("metric_type", "fps"), ("session_id", "session_m"), ("source", "client")]
        ),
        Some(58.5)
    );
    assert_eq!(sample(&rendered, "client_metrics_total", &[("kind", "gauge")]), Some(1.0));
    assert_eq!(sample(&rendered, "client_metrics_total", &[("kind", "histogram")]), Some(1.0));
    assert_eq!(
        sample(
            &rendered,
            "game_metric_observations_count",
            &[("metric_type", "frame_time_ms")]
        ),
        Some(1.0)
    );
}

#[tokio::test]
async fn test_health() {
    let mut config = RelayConfig::default();
    config.service.name = "game-relay".into();
    let relay = spawn_relay(config).await;

    let res = reqwest::get(relay.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "game-relay");

    let timestamp: DateTime<Utc> = body["timestamp"].as_str().unwrap().parse().unwrap();
    let skew = (Utc::now() - timestamp).num_milliseconds().abs();
    assert!(skew < 1000, "timestamp skew {}ms", skew);

    assert_eq!(sample(&relay.metrics.render(), "health_checks_total", &[]), Some(1.0));
}

#[tokio::test]
async fn test_preflight() {
    let relay = spawn_default_relay().await;

    for path in ["/api/telemetry/events", "/api/telemetry/metrics"] {
        let res = reqwest::Client::new()
            .request(reqwest::Method::OPTIONS, relay.url(path))
            .header("Origin", "http://game.example")
            .header("Access-Control-Request-Method", "POST")
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK, "{}", path);
        let headers = res.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET, POST, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
    }

    assert_eq!(series_count(&relay.metrics.render(), "client_events_total"), 0);
}

#[tokio::test]
async fn test_request_metrics_use_route_template() {
    let relay = spawn_default_relay().await;
    let client = reqwest::Client::new();

    client.get(relay.url("/health")).send().await.unwrap();
    client.get(relay.url("/api/telemetry/events")).send().await.unwrap();

    let rendered = relay.metrics.render();
    assert_eq!(
        sample(
            &rendered,
            "http_requests_total",
            &[("method", "GET"), ("path", "/health"), ("status", "200")]
        ),
        Some(1.0)
    );
    assert_eq!(
        sample(
            &rendered,
            "http_requests_total",
            &[("path", "/api/telemetry/events"), ("status", "405")]
        ),
        Some(1.0)
    );
}

#[tokio::test]
async fn test_exposition_over_http() {
    let relay = spawn_default_relay().await;
    let client = reqwest::Client::new();

    client
        .post(relay.url("/api/telemetry/events"))
        .json(&event_body("game_start", "session_scrape"))
        .send()
        .await
        .unwrap();

    let res = client.get(relay.url("/metrics")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let text = res.text().await.unwrap();
    assert_eq!(
        sample(&text, "client_events_total", &[("session_id", "session_scrape")]),
        Some(1.0)
    );
}

#[tokio::test]
async fn test_concurrent_sessions_are_isolated() {
    let relay = spawn_default_relay().await;
    let client = reqwest::Client::new();

    let requests = (0..100).map(|i| {
        let client = client.clone();
        let url = relay.url("/api/telemetry/events");
        async move {
            let mut body = event_body("level_change", &format!("session_{:03}", i));
            body["level"] = json!(i);
            client.post(url).json(&body).send().await.unwrap().status()
        }
    });

    let statuses = tokio::time::timeout(Duration::from_secs(30), join_all(requests))
        .await
        .unwrap();
    assert!(statuses.iter().all(|s| *s == StatusCode::OK));

    let rendered = relay.metrics.render();
    for i in 0..100 {
        let session = format!("session_{:03}", i);
        assert_eq!(
            sample(
                &rendered,
                "client_events_total",
                &[("event_type", "level_change"), ("session_id", &session)]
            ),
            Some(1.0),
            "{}",
            session
        );
        assert_eq!(
            sample(
                &rendered,
                "game_metrics",
                &[("metric_type", "current_level"), ("session_id", &session)]
            ),
            Some(i as f64)
        );
    }
}
