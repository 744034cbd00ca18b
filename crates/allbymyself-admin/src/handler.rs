//! Admin HTTP handlers.

use crate::auth::is_authorized;
use crate::server::AppState;
use allbymyself::admin::Message;
use allbymyself::config::AdminConfig;
use allbymyself::{AdminRequest, AdminResponse, ModelAdmin, SingletonError};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Admin index: registered models plus any pending messages.
pub async fn handle_index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !is_authorized(state.admin_token.as_deref(), &headers) {
        return unauthorized();
    }

    let site_state = Arc::clone(&state);
    let entries = match tokio::task::spawn_blocking(move || site_state.site.index()).await {
        Ok(Ok(entries)) => entries,
        Ok(Err(e)) => return error_response(e),
        Err(e) => return join_error(e),
    };

    let messages: Vec<Message> = state.messages.lock().await.drain(..).collect();

    Json(json!({
        "title": "Site administration",
        "models": entries,
        "messages": messages,
    }))
    .into_response()
}

/// `/admin/{app}/{model}` without the trailing slash.
pub async fn handle_model_no_slash(Path((app, model)): Path<(String, String)>) -> Redirect {
    Redirect::permanent(&format!("{}/{}/{}/", AdminConfig::URL_PREFIX, app, model))
}

/// `/admin/{app}/{model}/`.
pub async fn handle_model_root(
    State(state): State<Arc<AppState>>,
    Path((app, model)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatch(state, app, model, String::new(), method, headers, body).await
}

/// `/admin/{app}/{model}/{*rest}`.
pub async fn handle_model(
    State(state): State<Arc<AppState>>,
    Path((app, model, rest)): Path<(String, String, String)>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    dispatch(state, app, model, rest, method, headers, body).await
}

async fn dispatch(
    state: Arc<AppState>,
    app: String,
    model: String,
    rest: String,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some((admin, matched)) = state.site.resolve(&app, &model, &rest) else {
        return not_found();
    };

    if matched.route.admin_view && !is_authorized(state.admin_token.as_deref(), &headers) {
        return unauthorized();
    }

    let path = format!("{}/{}/{}/{}", AdminConfig::URL_PREFIX, app, model, rest);
    let request = if method == Method::POST {
        match parse_form(&body) {
            Ok(post) => AdminRequest::post(path, post),
            Err(message) => {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
            }
        }
    } else if method == Method::GET {
        AdminRequest::get(path)
    } else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    debug!("Admin {} {} -> {:?}", method, request.path, matched.route.view);

    let result =
        tokio::task::spawn_blocking(move || admin.dispatch(&matched, &request)).await;

    match result {
        Ok(Ok(response)) => render(&state, response).await,
        Ok(Err(e)) => error_response(e),
        Err(e) => join_error(e),
    }
}

fn parse_form(body: &Bytes) -> Result<Map<String, Value>, String> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_slice::<Map<String, Value>>(body)
        .map_err(|e| format!("Expected a JSON object body: {}", e))
}

async fn render(state: &AppState, response: AdminResponse) -> Response {
    match response {
        AdminResponse::Render { template, context } => {
            Json(json!({"template": template, "context": context})).into_response()
        }
        AdminResponse::Invalid { template, context } => (
            StatusCode::BAD_REQUEST,
            Json(json!({"template": template, "context": context})),
        )
            .into_response(),
        AdminResponse::Redirect { location, message } => {
            if let Some(message) = message {
                state.messages.lock().await.push(message);
            }
            (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
        }
    }
}

fn error_response(e: SingletonError) -> Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!("Admin request failed: {}", e);
    } else {
        warn!("Admin request refused: {}", e);
    }
    (status, Json(json!({"error": e.to_string()}))).into_response()
}

fn join_error(e: tokio::task::JoinError) -> Response {
    error!("Admin view task failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "internal error"})),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer")],
        Json(json!({"error": "authentication required"})),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))).into_response()
}
