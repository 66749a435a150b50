#![cfg(feature = "web")]

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{IMBALANCE_PATH, MARKET_PATH, config_for, full_day_page};
use epex_imbalance::EpexImbalanceSensor;
use epex_imbalance::web::{AppState, build_router};
use http_body_util::BodyExt;
use mockito::{Matcher, Server};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn send(router: &axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn refresh_then_read() {
    let mut server = Server::new_async().await;
    let _imbalance = server
        .mock("GET", IMBALANCE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"results": [{"imbalanceprice": 12.0}]}).to_string())
        .create_async()
        .await;
    let _market = server
        .mock("GET", MARKET_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(full_day_page("88,50 €/MWh"))
        .create_async()
        .await;

    let config = config_for(&server.url());
    let sensor = EpexImbalanceSensor::from_config(&config).unwrap();
    let router = build_router(AppState {
        sensor: Arc::new(sensor),
        config: Arc::new(config),
    });

    let (status, body) = send(&router, Method::POST, "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["refreshed"], json!(true));
    assert_eq!(body["state"], json!(100.5));

    let (status, body) = send(&router, Method::GET, "/api/reading").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "EPEX Imbalance Costs");
    assert_eq!(body["attributes"]["EPEX Price"], json!(88.5));
    assert_eq!(body["attributes"]["Imbalance Costs"], json!(12.0));
    assert_eq!(body["attributes"]["Total Price"], json!(100.5));
    assert_eq!(body["components"].as_array().unwrap().len(), 2);
    assert!(body["observed_at"].is_string());

    // Second manual refresh inside the minimum interval is refused
    let (status, body) = send(&router, Method::POST, "/api/refresh").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["refreshed"], json!(false));
    assert_eq!(body["state"], json!(100.5));
}

#[tokio::test]
async fn unavailable_reading_has_null_state() {
    let mut server = Server::new_async().await;
    let _imbalance = server
        .mock("GET", IMBALANCE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"results": [{"imbalanceprice": 3.0}]}).to_string())
        .create_async()
        .await;
    let _market = server
        .mock("GET", MARKET_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html><body></body></html>")
        .create_async()
        .await;

    let config = config_for(&server.url());
    let router = build_router(AppState {
        sensor: Arc::new(EpexImbalanceSensor::from_config(&config).unwrap()),
        config: Arc::new(config),
    });

    let (status, body) = send(&router, Method::POST, "/api/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["state"].is_null());
    assert_eq!(body["attributes"], json!({}));
    // Only the imbalance component was fetched
    assert_eq!(body["components"].as_array().unwrap().len(), 1);
}
