//! axum binding for [`OicpServer`]

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::{endpoints, InboundRequest, OicpServer};
use crate::config::ServerConfig;
use crate::support::shutdown::ShutdownSignal;

/// Every path goes through [`OicpServer::handle_request`], which owns
/// routing, so the router is a single fallback.
pub fn router(server: Arc<OicpServer>) -> Router {
    Router::new()
        .fallback(handle)
        .with_state(server)
        .layer(TraceLayer::new_for_http())
}

async fn handle(State(server): State<Arc<OicpServer>>, method: Method, uri: Uri, body: Bytes) -> Response {
    let inbound = InboundRequest::from_bytes(method, uri.path(), &body);
    // Cancels the request context if the connection goes away mid-request.
    let guard = inbound.cancellation.clone().drop_guard();

    let outbound = server.handle_request(inbound).await;
    guard.disarm();

    let status = StatusCode::from_u16(outbound.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, outbound.content_type)], outbound.body).into_response()
}

/// Bind `config.address()` and serve until `shutdown` triggers, then give
/// in-flight requests `shutdown_timeout_secs` to finish.
pub async fn serve(
    server: Arc<OicpServer>,
    config: &ServerConfig,
    shutdown: ShutdownSignal,
) -> std::io::Result<()> {
    let address = config.address();
    let listener = TcpListener::bind(&address).await?;
    info!(
        %address,
        version = server.version().version_string(),
        endpoints = ?endpoints::paths(server.version()),
        "OICP endpoint listening"
    );

    let graceful = shutdown.clone();
    let serving = axum::serve(listener, router(server))
        .with_graceful_shutdown(async move {
            graceful.wait().await;
            info!("OICP endpoint received shutdown signal");
        })
        .into_future();
    tokio::pin!(serving);

    tokio::select! {
        result = &mut serving => return result,
        _ = shutdown.wait() => {}
    }

    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    match tokio::time::timeout(drain, serving).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_secs = config.shutdown_timeout_secs, "In-flight requests did not drain in time");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::domain::version::OicpVersion;

    async fn call(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, String, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string())
            .unwrap_or_default();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn malformed_request_is_a_200_data_error() {
        let router = router(Arc::new(OicpServer::new(OicpVersion::V2_3)));

        let (status, content_type, body) = call(
            router,
            Method::POST,
            "/api/oicp/charging/v21/operators/DE*GEF/authorize/start",
            "{\"broken\"",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json;charset=utf-8");
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["StatusCode"]["Code"], "022");
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_data_error() {
        let router = router(Arc::new(OicpServer::new(OicpVersion::V2_3)));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/oicp/charging/v21/operators/DE*GEF/authorize/start")
            .body(Body::from(vec![b'{', 0xff, 0xfe, b'}']))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["StatusCode"]["Code"], "022");
        assert!(body["StatusCode"]["AdditionalInfo"]
            .as_str()
            .unwrap()
            .contains("UTF-8"));
    }

    #[tokio::test]
    async fn unknown_path_and_wrong_method() {
        let server = Arc::new(OicpServer::new(OicpVersion::V2_2));

        let (status, _, _) = call(router(server.clone()), Method::POST, "/ws/v2.3/eRoamingAuthorization", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = call(router(server), Method::GET, "/ws/v2.2/eRoamingAuthorization", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn soap_fault_payload_is_answered_in_soap() {
        let router = router(Arc::new(OicpServer::new(OicpVersion::V2_2)));

        let (status, content_type, body) =
            call(router, Method::POST, "/ws/v2.2/eRoamingEvseData", "<Envelope/>").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "text/xml;charset=utf-8");
        assert!(body.contains("Envelope"));
        assert!(body.contains(">022<"));
    }

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            version: OicpVersion::V2_3,
            shutdown_timeout_secs: 1,
        };
        let shutdown = ShutdownSignal::new();
        let server = Arc::new(OicpServer::new(config.version));

        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.trigger();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), serve(server, &config, shutdown)).await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
