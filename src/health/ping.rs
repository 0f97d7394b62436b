//! Liveness probe endpoint.

use axum::{http::Method, routing::get, Json, Router};
use serde::Serialize;

pub const PING_PATH: &str = "/_internal/_ping";

#[derive(Debug, Serialize)]
pub struct PingStatus {
    pub status: &'static str,
}

/// Method, path and handler of the liveness probe.
pub fn ping_route() -> (Method, &'static str, fn() -> Json<PingStatus>) {
    (Method::GET, PING_PATH, handle_ping)
}

pub fn handle_ping() -> Json<PingStatus> {
    Json(PingStatus { status: "OK" })
}

/// Router with the liveness probe mounted.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(PING_PATH, get(|| async { handle_ping() }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_ping_route() {
        let (method, path, _) = ping_route();
        assert_eq!(method, Method::GET);
        assert_eq!(path, "/_internal/_ping");
    }

    #[tokio::test]
    async fn test_ping_ignores_request_content() {
        let app: Router = router();
        let request = Request::builder()
            .uri(PING_PATH)
            .header("content-type", "application/json")
            .header("x-transaction-id", "Trx123")
            .body(Body::from(r#"{"ignored":true}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"OK"}"#);
    }

    #[tokio::test]
    async fn test_ping_rejects_other_methods() {
        let app: Router = router();
        let request = Request::builder()
            .method("POST")
            .uri(PING_PATH)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
