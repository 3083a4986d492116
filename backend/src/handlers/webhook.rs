//! HTTP handler for the auth provider webhook

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::services::user::{ClerkEvent, ClerkUser, SYNCED_EVENTS};
use crate::services::UserService;
use crate::services::webhook::SignatureHeaders;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: String,
}

/// Handle auth provider user events
/// POST /clerk-webhook
///
/// The signature is checked before the body is parsed; user events are
/// upserted, every other event type is acknowledged and ignored.
pub async fn handle_clerk_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    let signature = SignatureHeaders::from_headers(&headers)
        .map_err(|e| AppError::WebhookVerification(e.to_string()))?;

    state
        .webhook
        .verify(&signature, &body)
        .map_err(|e| AppError::WebhookVerification(e.to_string()))?;

    let event: ClerkEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::ValidationError(format!("Invalid webhook payload: {}", e)))?;

    if !SYNCED_EVENTS.contains(&event.event_type.as_str()) {
        tracing::debug!("Ignoring webhook event {}", event.event_type);
        return Ok(Json(WebhookResponse {
            success: true,
            message: format!("Event {} ignored", event.event_type),
        }));
    }

    let user: ClerkUser = serde_json::from_value(event.data)
        .map_err(|e| AppError::ValidationError(format!("Invalid user payload: {}", e)))?;

    UserService::new(state.db.clone())
        .upsert_from_clerk(&user)
        .await?;

    Ok(Json(WebhookResponse {
        success: true,
        message: "Webhook processed successfully".to_string(),
    }))
}
