//! HTTP surface for the marine forecast cache.
//!
//! Both endpoints answer from the cache store alone and never trigger a
//! fetch.

pub mod error;
pub mod handlers;
pub mod response;

use axum::routing::get;
use axum::Router;
use handlers::ApiState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use response::ConditionsResponse;

/// Build the API router.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/conditions", get(handlers::get_conditions))
        .route("/api/health", get(handlers::get_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use marine_cache::{CacheStore, StalenessPolicy};
    use marine_core::types::{
        now_epoch, DailyField, HourlyField, HourlyGrid, Snapshot, WindowAnchor,
    };
    use std::time::Duration;
    use tower::ServiceExt;

    fn state(store: Arc<CacheStore>) -> ApiState {
        ApiState {
            store,
            policy: StalenessPolicy::new(Duration::from_secs(1800)),
        }
    }

    fn snapshot(fetched_at: i64) -> Snapshot {
        let grid = HourlyGrid::anchored(fetched_at, 120, 24, WindowAnchor::NextHour);
        let mut s = Snapshot::new(&grid, fetched_at);
        s.hourly_series.insert(HourlyField::Wind, vec![14; 24]);
        s.hourly_series.insert(HourlyField::Tide, (0..24).map(|i| 40 + i).collect());
        s.daily_series.insert(DailyField::Dust, vec![30]);
        s
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_conditions_cold_start() {
        let store = Arc::new(CacheStore::new("unused/cache.json"));
        let (status, body) = get_json(router(state(store)), "/api/conditions").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["has_data"], false);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_conditions_compact_schema() {
        let store = Arc::new(CacheStore::new("unused/cache.json"));
        let s = snapshot(now_epoch() - 120);
        store.seed(s.clone());

        let (status, body) = get_json(router(state(store)), "/api/conditions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ts"], s.origin_timestamp);
        assert_eq!(body["tz_offset"], 120);
        assert_eq!(body["time"].as_array().unwrap().len(), 24);
        assert_eq!(body["wind"].as_array().unwrap().len(), 24);
        assert_eq!(body["tide"][3], 43);
        assert_eq!(body["dust_daily"], serde_json::json!([30]));
        assert!(body["age"].as_i64().unwrap() >= 120);

        // Absent fields are omitted, not null.
        let object = body.as_object().unwrap();
        for missing in ["gust", "temp", "wind_dir", "sea_temp"] {
            assert!(!object.contains_key(missing), "{} should be omitted", missing);
        }
    }

    #[tokio::test]
    async fn test_health_cold_then_warm() {
        let store = Arc::new(CacheStore::new("unused/cache.json"));
        let app = router(state(Arc::clone(&store)));

        let (status, body) = get_json(app.clone(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "warming_up");
        assert_eq!(body["has_data"], false);
        assert!(body["cache_age_seconds"].is_null());
        assert_eq!(body["needs_refresh"], true);

        store.seed(snapshot(now_epoch() - 4000));
        let (_, body) = get_json(app, "/api/health").await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["has_data"], true);
        assert!(body["cache_age_seconds"].as_i64().unwrap() >= 4000);
        assert_eq!(body["needs_refresh"], true);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let store = Arc::new(CacheStore::new("unused/cache.json"));
        let response = router(state(store))
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header(header::ORIGIN, "https://example.org")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
