mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{ALICE_ID, ALICE_TOKEN, BOB_TOKEN, bearer, create_test_state, test_server};
use link_analytics::api::dto::unique::NO_GEO_INFO;
use serde_json::Value;

#[tokio::test]
async fn test_hourly_series_without_clicks() {
    let ctx = create_test_state();
    let link = ctx.store.add_link(ALICE_ID, "quiet01", "https://example.com", false);
    let server = test_server(ctx.state);

    let response = server
        .get(&format!("/api/bitlinks/{}/clicks?unit=hour", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let points = body["link_clicks"].as_array().unwrap();
    assert_eq!(body["unit"], "hour");
    assert_eq!(body["units"], 45);
    assert_eq!(points.len(), 45);
    assert!(points.iter().all(|p| p["clicks"] == 0));
}

#[tokio::test]
async fn test_daily_series_is_default() {
    let ctx = create_test_state();
    let link = ctx.store.add_link(ALICE_ID, "daily01", "https://example.com", false);
    let now = Utc::now();
    ctx.store.add_click(link.id, "192.0.2.1", "curl", now - Duration::seconds(1));
    ctx.store.add_click(link.id, "192.0.2.2", "curl", now - Duration::seconds(1));
    let server = test_server(ctx.state);

    let body: Value = server
        .get(&format!("/api/bitlinks/{}/clicks", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await
        .json();

    let points = body["link_clicks"].as_array().unwrap();
    assert_eq!(body["unit"], "day");
    assert_eq!(points.len(), 44);

    let dates: std::collections::HashSet<&str> =
        points.iter().map(|p| p["date"].as_str().unwrap()).collect();
    assert_eq!(dates.len(), 44);

    let total: i64 = points.iter().map(|p| p["clicks"].as_i64().unwrap()).sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_units_parameter_is_accepted() {
    let ctx = create_test_state();
    let link = ctx.store.add_link(ALICE_ID, "units01", "https://example.com", false);
    let server = test_server(ctx.state);

    let body: Value = server
        .get(&format!("/api/bitlinks/{}/clicks?unit=week&units=3", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await
        .json();

    assert_eq!(body["units"], 7);
}

#[tokio::test]
async fn test_invalid_unit_is_bad_request() {
    let ctx = create_test_state();
    let link = ctx.store.add_link(ALICE_ID, "badunit", "https://example.com", false);
    let server = test_server(ctx.state);

    let response = server
        .get(&format!("/api/bitlinks/{}/clicks?unit=fortnight", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Invalid unit specified");
}

#[tokio::test]
async fn test_reports_of_other_user_are_not_found() {
    let ctx = create_test_state();
    let link = ctx.store.add_link(ALICE_ID, "secret1", "https://example.com", false);
    let server = test_server(ctx.state);

    for path in ["clicks", "countries", "clicks/unique"] {
        let response = server
            .get(&format!("/api/bitlinks/{}/{path}", link.id))
            .add_header("Authorization", bearer(BOB_TOKEN))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_countries_report() {
    let ctx = create_test_state();
    let link = ctx.store.add_link(ALICE_ID, "geo0001", "https://example.com", false);
    let now = Utc::now();
    let de1 = ctx.store.add_click(link.id, "192.0.2.1", "curl", now);
    let de2 = ctx.store.add_click(link.id, "192.0.2.2", "curl", now);
    let us = ctx.store.add_click(link.id, "192.0.2.3", "curl", now);
    ctx.store.add_click(link.id, "192.0.2.4", "curl", now);
    ctx.store.add_geo(de1.id, "DE");
    ctx.store.add_geo(de2.id, "DE");
    ctx.store.add_geo(us.id, "US");
    let server = test_server(ctx.state);

    let body: Value = server
        .get(&format!("/api/bitlinks/{}/countries", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await
        .json();

    assert_eq!(body["facet"], "countries");
    assert_eq!(body["unit"], "day");
    assert_eq!(body["units"], 4);
    assert_eq!(body["metrics"][0]["value"], "DE");
    assert_eq!(body["metrics"][0]["clicks"], 2);
    assert_eq!(body["metrics"][1]["value"], "US");
    assert_eq!(body["metrics"][1]["clicks"], 1);
    assert_eq!(body["metrics"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unique_clicks_report() {
    let ctx = create_test_state();
    let link = ctx.store.add_link(ALICE_ID, "uniq001", "https://example.com", false);
    let t0 = Utc::now() - Duration::hours(20);
    let first = ctx.store.add_click(link.id, "192.0.2.1", "Firefox", t0);
    ctx.store.add_click(link.id, "192.0.2.1", "Firefox", t0 + Duration::hours(6));
    ctx.store.add_click(link.id, "192.0.2.1", "Firefox", t0 + Duration::hours(13));
    ctx.store.add_geo(first.id, "FR");
    let server = test_server(ctx.state);

    let body: Value = server
        .get(&format!("/api/bitlinks/{}/clicks/unique", link.id))
        .add_header("Authorization", bearer(ALICE_TOKEN))
        .await
        .json();

    let unique = body["unique_clicks"].as_array().unwrap();
    assert_eq!(body["total_unique_clicks"], 2);
    assert_eq!(unique.len(), 2);
    assert_eq!(unique[0]["id"], first.id);
    assert_eq!(unique[0]["country"], "FR");
    assert_eq!(unique[1]["id"], 3);
    assert_eq!(unique[1]["error"], NO_GEO_INFO);
}
