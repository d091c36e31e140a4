//! Per-client rate limiting for the public router.
//!
//! Clients are keyed by IP (`X-Forwarded-For`, `X-Real-IP`, `Forwarded`, then
//! the peer address). Each client gets `burst_size` requests up front and one
//! more every `1 / requests_per_second` seconds.

use std::time::Duration;

use axum::Router;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Time to replenish one request slot.
pub fn rate_limit_period(requests_per_second: u32) -> Duration {
    Duration::from_secs(1) / requests_per_second.max(1)
}

/// Wrap `router` in a governor layer.
///
/// Returns `None` if the limiter cannot be built (zero burst size or a
/// zero-length period).
pub fn with_rate_limit(
    router: Router,
    requests_per_second: u32,
    burst_size: u32,
) -> Option<Router> {
    let config = GovernorConfigBuilder::default()
        .period(rate_limit_period(requests_per_second))
        .burst_size(burst_size)
        .key_extractor(SmartIpKeyExtractor)
        .finish()?;

    Some(router.layer(GovernorLayer::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::util::ServiceExt;

    fn app(requests_per_second: u32, burst_size: u32) -> Router {
        let router = Router::new().route("/", get(|| async { "ok" }));
        with_rate_limit(router, requests_per_second, burst_size).unwrap()
    }

    async fn hit(app: &Router, ip: &str) -> StatusCode {
        let request = Request::builder()
            .uri("/")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap().status()
    }

    #[test]
    fn test_rate_limit_period() {
        assert_eq!(rate_limit_period(1), Duration::from_secs(1));
        assert_eq!(rate_limit_period(4), Duration::from_millis(250));
        assert!(rate_limit_period(60) < Duration::from_millis(17));
        assert_eq!(rate_limit_period(0), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_burst_is_rejected() {
        let router = Router::new().route("/", get(|| async { "ok" }));
        assert!(with_rate_limit(router, 60, 0).is_none());
    }

    #[tokio::test]
    async fn test_burst_exhaustion_then_refill() {
        let app = app(2, 2);

        assert_eq!(hit(&app, "203.0.113.7").await, StatusCode::OK);
        assert_eq!(hit(&app, "203.0.113.7").await, StatusCode::OK);
        assert_eq!(hit(&app, "203.0.113.7").await, StatusCode::TOO_MANY_REQUESTS);

        // Other clients have their own budget
        assert_eq!(hit(&app, "198.51.100.1").await, StatusCode::OK);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(hit(&app, "203.0.113.7").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_default_limits_refill_within_a_second() {
        let app = app(60, 10);

        for _ in 0..10 {
            assert_eq!(hit(&app, "203.0.113.8").await, StatusCode::OK);
        }

        // At 60 requests per second a slot frees up every ~17ms
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hit(&app, "203.0.113.8").await, StatusCode::OK);
    }
}
