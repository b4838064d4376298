//! Profile submission integration tests
//!
//! Tests for `POST /api/comprehensive-profile`:
//! - created profile with insights and weather snapshot
//! - validation errors naming the offending field
//! - duplicate submissions

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::*;
use farm_insights_backend::services::ProfileRepository;
use proptest::prelude::*;
use serde_json::{json, Value};
use shared::ProfileResponse;
use tower::ServiceExt;

const PROFILE_URI: &str = "/api/comprehensive-profile";

fn submission(user_id: &str) -> Value {
    let sowing = (Utc::now().date_naive() - Duration::days(40)).to_string();
    json!({
        "userId": user_id,
        "fullName": "Lakshmi Devi",
        "mobile": "+91 98765 43210",
        "pincode": "560001",
        "location": null,
        "pincodeLocation": {
            "district": "Bengaluru Urban",
            "state": "Karnataka",
            "latitude": 12.97,
            "longitude": 77.59
        },
        "farmFields": [
            {
                "name": "North plot",
                "cropName": "Rice",
                "soilType": "Clay",
                "sowingDate": sowing,
                "irrigationMethod": "Flood",
                "areaAcres": 1.5,
                "boundary": [],
                "satellitePolygonId": "poly-1"
            },
            {
                "name": "South plot",
                "cropName": "Ragi",
                "soilType": "Red",
                "sowingDate": sowing,
                "irrigationMethod": "Rainfed",
                "areaAcres": 2.0
            }
        ]
    })
}

// ============================================================================
// Unit Tests
// ============================================================================

#[tokio::test]
async fn test_create_profile_returns_insights() {
    let repo = repository_with(&[]).await;
    let (_, providers) = FakeSources::healthy().into_providers();

    let response = app(repo.clone(), providers)
        .oneshot(post_json(PROFILE_URI, &submission("farmer-100")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["profile"]["userId"], "farmer-100");
    assert_eq!(body["profile"]["cropName"], "Rice");
    assert_eq!(body["profile"]["farmSizeAcres"], json!(3.5));
    assert_eq!(body["profile"]["aiInsights"]["daysSinceSowing"], 40);
    assert!(body["profile"]["weatherData"].is_object());
    assert!(!body["recommendations"].as_array().unwrap().is_empty());

    // The body round-trips into the typed response the client stores
    let typed: ProfileResponse = serde_json::from_value(body).unwrap();
    assert_eq!(typed.profile.profile.satellite_polygon_id.as_deref(), Some("poly-1"));

    let stored = repo.find_by_user_id("farmer-100").await.unwrap().unwrap();
    assert_eq!(stored.location.unwrap().latitude, rust_decimal::Decimal::new(1297, 2));
}

#[tokio::test]
async fn test_create_profile_without_weather() {
    let repo = repository_with(&[]).await;
    let (_, providers) = FakeSources::default().into_providers();

    let response = app(repo, providers)
        .oneshot(post_json(PROFILE_URI, &submission("farmer-101")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["profile"].get("weatherData").is_none());
    assert!(body["profile"]["aiInsights"].is_object());
}

#[tokio::test]
async fn test_duplicate_profile_conflicts() {
    let repo = repository_with(&[]).await;
    let (_, providers) = FakeSources::healthy().into_providers();
    let app = app(repo, providers);

    let first = app
        .clone()
        .oneshot(post_json(PROFILE_URI, &submission("farmer-102")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .oneshot(post_json(PROFILE_URI, &submission("farmer-102")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "DUPLICATE_ENTRY");
}

#[tokio::test]
async fn test_invalid_mobile_rejected() {
    let repo = repository_with(&[]).await;
    let (_, providers) = FakeSources::healthy().into_providers();

    let mut payload = submission("farmer-103");
    payload["mobile"] = json!("12345");

    let response = app(repo.clone(), providers)
        .oneshot(post_json(PROFILE_URI, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["field"], "mobile");
    assert!(repo.find_by_user_id("farmer-103").await.unwrap().is_none());
}

#[tokio::test]
async fn test_future_sowing_date_rejected() {
    let repo = repository_with(&[]).await;
    let (_, providers) = FakeSources::healthy().into_providers();

    let mut payload = submission("farmer-104");
    payload["farmFields"][0]["sowingDate"] = json!((Utc::now().date_naive() + Duration::days(3)).to_string());

    let response = app(repo, providers)
        .oneshot(post_json(PROFILE_URI, &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["field"], "farmFields[0].sowingDate");
}

#[tokio::test]
async fn test_malformed_payload_rejected() {
    let repo = repository_with(&[]).await;
    let (_, providers) = FakeSources::healthy().into_providers();

    let response = app(repo, providers)
        .oneshot(post_json(PROFILE_URI, &json!({ "userId": "farmer-105" })))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_health_reports_profile_store() {
    let repo = repository_with(&[]).await;
    let (_, providers) = FakeSources::default().into_providers();

    let response = app(repo, providers).oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["profileStore"], "counting");
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Any non-6-digit pincode is rejected before anything is stored
    #[test]
    fn prop_bad_pincode_rejected(pincode in "[0-9]{1,5}|[0-9]{7,9}|[A-Z]{6}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let status = runtime.block_on(async {
            let repo = repository_with(&[]).await;
            let (_, providers) = FakeSources::default().into_providers();
            let mut payload = submission("farmer-prop");
            payload["pincode"] = json!(pincode);
            app(repo, providers)
                .oneshot(post_json(PROFILE_URI, &payload))
                .await
                .unwrap()
                .status()
        });

        prop_assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
