use axum::{
    extract::State,
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use serene_core::checkout::{CheckoutInitiator, CheckoutRequest};
use serene_core::reservation::ReservationId;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartCheckoutRequest {
    pub reservation_id: Option<ReservationId>,
    pub service: Option<String>,
    pub price: f64,
    pub currency: Option<String>,
    pub success_base_url: Option<String>,
    pub cancel_base_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct StartCheckoutResponse {
    url: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/checkout", post(start_checkout))
}

/// POST /v1/checkout
/// Creates a hosted payment session and returns the processor redirect URL.
async fn start_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<StartCheckoutRequest>,
) -> Result<Json<StartCheckoutResponse>, AppError> {
    let provider = state.checkout.clone().ok_or_else(|| {
        AppError::UpstreamUnavailable("payment provider not configured".to_string())
    })?;

    let reservation_id = req
        .reservation_id
        .ok_or_else(|| AppError::Validation("reservation_id is required".to_string()))?;
    let service = req
        .service
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Validation("service is required".to_string()))?;

    let origin = request_origin(&headers);
    let url = CheckoutInitiator::new(state.reservations.clone(), provider)
        .start(
            CheckoutRequest {
                reservation_id,
                service,
                price: req.price,
                currency: req.currency.unwrap_or_else(|| "lkr".to_string()),
                success_base: req
                    .success_base_url
                    .or_else(|| state.checkout_defaults.success_base_url.clone()),
                cancel_base: req
                    .cancel_base_url
                    .or_else(|| state.checkout_defaults.cancel_base_url.clone()),
            },
            &origin,
        )
        .await?;

    Ok(Json(StartCheckoutResponse { url }))
}

/// The requesting site's own base URL, used when neither the request nor the
/// configuration supplies a redirect base.
fn request_origin(headers: &HeaderMap) -> String {
    let Some(host) = headers.get(header::HOST).and_then(|h| h.to_str().ok()) else {
        return String::new();
    };
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    format!("{}://{}", proto, host)
}
