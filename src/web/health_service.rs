//! Public liveness endpoint.
//!
//! Exposes `GET /{API_PREFIX}/health`. It needs no credentials and only reports
//! process-local information, so it keeps answering even if the platform is slow.

use crate::tools::watch::Watch;
use crate::web::warp::into_response;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use warp::Filter;
use warp::filters::BoxedFilter;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub uptime: f64,
    pub environment: String,
    pub version: String,
}

impl HealthStatus {
    pub fn capture(uptime: &Watch, environment: &str) -> Self {
        HealthStatus {
            status: "ok",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            uptime: uptime.elapsed_secs(),
            environment: environment.to_string(),
            version: crate::APP_VERSION.clone(),
        }
    }
}

/// Creates the health route below the given API prefix filter.
///
/// `uptime` should be started as early as possible in `main`.
pub fn get_health_route(
    api_path: BoxedFilter<()>,
    uptime: Watch,
    environment: String,
) -> BoxedFilter<(impl warp::Reply,)> {
    api_path
        .and(warp::path("health"))
        .and(warp::path::end())
        .and(warp::get())
        .and(crate::web::warp::with_cloneable(environment))
        .and_then(move |environment: String| handle_get_health(uptime, environment))
        .boxed()
}

#[tracing::instrument(level = "debug", name = "GET /health", skip_all)]
async fn handle_get_health(
    uptime: Watch,
    environment: String,
) -> Result<impl warp::Reply, warp::Rejection> {
    into_response(Ok(HealthStatus::capture(&uptime, &environment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use serde_json::Value;
    use warp::http::StatusCode;

    fn route() -> BoxedFilter<(impl warp::Reply,)> {
        let api_path = warp::path("api").and(warp::path("v1")).boxed();
        get_health_route(api_path, Watch::start(), "production".to_string())
    }

    #[tokio::test]
    async fn responds_with_json_content_type() {
        let response = warp::test::request()
            .path("/api/v1/health")
            .reply(&route())
            .await;

        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/json"
        );
    }

    async fn call<F>(filter: &F) -> Value
    where
        F: Filter + 'static,
        F::Extract: warp::Reply + Send,
    {
        let response = warp::test::request()
            .method("GET")
            .path("/api/v1/health")
            .reply(filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn reports_status_environment_and_version() {
        let body = call(&route()).await;

        assert_eq!(body["status"], "ok");
        assert_eq!(body["environment"], "production");
        assert_eq!(body["version"], crate::APP_VERSION.as_str());
    }

    #[tokio::test]
    async fn timestamp_is_utc_with_milliseconds() {
        let body = call(&route()).await;
        let timestamp = body["timestamp"].as_str().unwrap();

        assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert!(timestamp.ends_with('Z'));
        assert_eq!(timestamp.split('.').nth(1).map(str::len), Some(4));
    }

    #[tokio::test]
    async fn uptime_never_decreases() {
        let filter = route();

        let first = call(&filter).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = call(&filter).await;

        assert_eq!(first["status"], "ok");
        assert_eq!(second["status"], "ok");
        assert!(second["uptime"].as_f64().unwrap() >= first["uptime"].as_f64().unwrap());
    }

    #[tokio::test]
    async fn other_methods_and_paths_are_not_served() {
        let filter = route();

        let post = warp::test::request()
            .method("POST")
            .path("/api/v1/health")
            .reply(&filter)
            .await;
        assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);

        let unprefixed = warp::test::request().path("/health").reply(&filter).await;
        assert_eq!(unprefixed.status(), StatusCode::NOT_FOUND);
    }
}
