//! HTTP server implementation using Axum.

use crate::handler::{
    handle_health, handle_index, handle_model, handle_model_no_slash, handle_model_root,
};
use allbymyself::admin::Message;
use allbymyself::{AdminSite, CacheClient};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    /// Registered admins and their route tables
    pub site: AdminSite,
    /// Messages queued by redirects, shown on the next index load.
    ///
    /// Process-wide, not per session: whoever loads the index next sees them.
    pub messages: Mutex<Vec<Message>>,
    /// Bearer token required by admin views; `None` leaves the admin open
    pub admin_token: Option<String>,
    /// Cache handle, disconnected on shutdown
    pub cache: CacheClient,
}

impl AppState {
    pub fn new(site: AdminSite, cache: CacheClient, admin_token: Option<String>) -> Self {
        Self {
            site,
            messages: Mutex::new(Vec::new()),
            admin_token,
            cache,
        }
    }
}

/// Build the admin router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/admin/", get(handle_index))
        .route(
            "/admin/:app/:model",
            get(handle_model_no_slash).post(handle_model_no_slash),
        )
        .route(
            "/admin/:app/:model/",
            get(handle_model_root).post(handle_model_root),
        )
        .route(
            "/admin/:app/:model/*rest",
            get(handle_model).post(handle_model),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the admin HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MaintenanceBanner, SiteConfiguration};
    use allbymyself::{CacheConfig, MemoryCache, SingletonRepository, SqliteStore};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state(token: Option<&str>) -> Arc<AppState> {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let cache = CacheClient::connected(Arc::new(MemoryCache::new()), &CacheConfig::default());

        let mut site = AdminSite::new();
        site.register_singleton(SingletonRepository::<SiteConfiguration>::new(
            store.clone(),
            cache.clone(),
        ))
        .unwrap();
        site.register_singleton(SingletonRepository::<MaintenanceBanner>::new(
            store,
            cache.clone(),
        ))
        .unwrap();

        Arc::new(AppState::new(site, cache, token.map(String::from)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(None));
        let (status, _, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_base_path_edits_provisioned_singleton() {
        let app = build_router(test_state(None));
        let (status, _, body) = send(&app, get("/admin/core/siteconfiguration/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "admin/singleton_change_form.html");
        assert_eq!(body["context"]["add"], false);
        assert_eq!(body["context"]["fields"]["site_name"], "Site");
    }

    #[tokio::test]
    async fn test_base_path_without_slash_redirects() {
        let app = build_router(test_state(None));
        let (status, headers, _) = send(&app, get("/admin/core/siteconfiguration")).await;
        assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/admin/core/siteconfiguration/");
    }

    #[tokio::test]
    async fn test_plain_save_redirects_to_index_and_queues_message() {
        let app = build_router(test_state(None));
        let (status, headers, _) = send(
            &app,
            post(
                "/admin/core/siteconfiguration/",
                json!({"site_name": "Renamed", "_save": ""}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(headers[header::LOCATION], "/admin/");

        let (_, _, index) = send(&app, get("/admin/")).await;
        let messages = index["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["level"], "success");
        assert_eq!(
            messages[0]["text"],
            "<a href=\"/admin/core/siteconfiguration/\">SiteConfiguration</a> was changed successfully."
        );

        // messages are shown once
        let (_, _, index) = send(&app, get("/admin/")).await;
        assert!(index["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_singleton_is_added_through_base_path() {
        let app = build_router(test_state(None));

        let (status, _, body) = send(&app, get("/admin/core/maintenancebanner/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["context"]["add"], true);

        let (status, _, _) = send(
            &app,
            post(
                "/admin/core/maintenancebanner/",
                json!({"message": "Back soon", "_save": ""}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FOUND);

        let (_, _, body) = send(&app, get("/admin/core/maintenancebanner/")).await;
        assert_eq!(body["context"]["add"], false);
        assert_eq!(body["context"]["fields"]["message"], "Back soon");
    }

    #[tokio::test]
    async fn test_add_and_delete_routes_are_forbidden() {
        let app = build_router(test_state(None));

        let (status, _, _) = send(&app, get("/admin/core/siteconfiguration/add/")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(&app, get("/admin/core/siteconfiguration/1/delete/")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_history_route() {
        let app = build_router(test_state(None));
        let (status, _, body) = send(&app, get("/admin/core/siteconfiguration/history/")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "admin/singleton_object_history.html");
        assert!(body["context"]["action_list"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_body() {
        let app = build_router(test_state(None));
        let request = Request::post("/admin/core/siteconfiguration/")
            .body(Body::from("not json"))
            .unwrap();
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_model_is_not_found() {
        let app = build_router(test_state(None));
        let (status, _, _) = send(&app, get("/admin/core/nothing/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_token_required_when_configured() {
        let app = build_router(test_state(Some("secret")));

        let (status, headers, _) = send(&app, get("/admin/core/siteconfiguration/")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");

        let request = Request::get("/admin/core/siteconfiguration/")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(&app, get("/admin/")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_server_starts() {
        let addr = start_server(test_state(None), "127.0.0.1", 0).await.unwrap();
        assert!(addr.port() > 0);
    }
}
