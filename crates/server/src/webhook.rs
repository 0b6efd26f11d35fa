//! Chat-platform webhook surface. One POST route, permissive request
//! parsing, and a reply envelope shaped for the platform's fulfillment
//! contract.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::dispatch::{Dispatcher, Intent, Reply};

/// Incoming fulfillment request. Every field defaults, so a minimal or
/// partial body still dispatches (to the fallback intent with an empty
/// query text in the degenerate case).
#[derive(Debug, Default, Deserialize)]
pub struct WebhookRequest {
    #[serde(rename = "queryResult", default)]
    pub query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryResult {
    #[serde(rename = "queryText", default)]
    pub query_text: String,
    #[serde(default)]
    pub intent: IntentRef,
}

#[derive(Debug, Default, Deserialize)]
pub struct IntentRef {
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook).fallback(method_not_allowed))
        .with_state(dispatcher)
}

/// Body parsing is manual so a malformed payload gets the platform-visible
/// fulfillment error instead of axum's default rejection body.
async fn handle_webhook(State(dispatcher): State<Arc<Dispatcher>>, body: Bytes) -> Response {
    let request: WebhookRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(parse_error) => {
            warn!(
                event_name = "webhook.malformed_body",
                error = %parse_error,
                "rejecting unparseable webhook payload"
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "fulfillmentText": "invalid request body" })),
            )
                .into_response();
        }
    };

    let intent = Intent::from_display_name(&request.query_result.intent.display_name);
    info!(
        event_name = "webhook.request",
        intent = ?intent,
        query_chars = request.query_result.query_text.chars().count(),
        "received fulfillment request"
    );

    let reply = dispatcher.handle(intent, &request.query_result.query_text).await;
    let body = match reply {
        Reply::Text(text) => json!({ "fulfillmentText": text }),
        Reply::Rich(messages) => json!({ "fulfillmentMessages": messages }),
    };
    (StatusCode::OK, Json(body)).into_response()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "invalid request method" })),
    )
        .into_response()
}
