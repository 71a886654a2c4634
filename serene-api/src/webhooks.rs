use axum::{body::Bytes, extract::State, http::HeaderMap, routing::post, Json, Router};
use serde_json::{json, Value};

use serene_core::event::ProcessorEvent;
use serene_core::reconcile::ReconciliationEngine;
use serene_core::verify;

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments", post(handle_payment_webhook))
}

/// POST /v1/webhooks/payments
/// Receive payment events from the processor. The body is taken as raw bytes
/// and stays unparsed until the signature over it has been checked; parsing
/// first would invalidate the signature.
async fn handle_payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    if state.checkout.is_none() && state.webhook_secret.is_none() {
        return Err(AppError::UpstreamUnavailable(
            "payment processor is not configured".to_string(),
        ));
    }

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    verify::check_signature(
        &body,
        signature,
        state.webhook_secret.as_deref(),
        state.webhook_tolerance_seconds,
    )?;

    let event = ProcessorEvent::from_json(&body)?;

    // A store failure here surfaces as 500 so the sender redelivers; the
    // settlement write is idempotent, so the retry is safe.
    let outcome = ReconciliationEngine::new(state.reservations.clone())
        .apply(event)
        .await?;
    tracing::debug!("webhook reconciled: {:?}", outcome);

    // Acknowledged the same way whether or not the event was actionable.
    Ok(Json(json!({ "received": true })))
}
