use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use serene_core::repository::{NewReservation, ReservationFilter};
use serene_core::reservation::{Reservation, ReservationId, ReservationStatus};

use crate::error::AppError;
use crate::middleware::auth::admin_auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub salon_id: String,
    pub service: String,
    pub price: f64,
    pub scheduled_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, Serialize)]
struct CreateReservationResponse {
    id: ReservationId,
    status: ReservationStatus,
}

#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    pub status: Option<String>,
    /// Free-text filter over service and customer contact fields.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
struct UpdateStatusResponse {
    ok: bool,
    previous: ReservationStatus,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", post(create_reservation))
        .route("/v1/reservations/{id}", get(get_reservation))
}

pub fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/reservations", get(list_reservations))
        .route(
            "/v1/reservations/{id}/status",
            patch(update_reservation_status),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/reservations
async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<CreateReservationResponse>), AppError> {
    let salon = state.salons.resolve(&req.salon_id).ok_or_else(|| {
        AppError::Validation(format!("unknown salon {}", req.salon_id))
    })?;
    if req.service.trim().is_empty() {
        return Err(AppError::Validation("service is required".to_string()));
    }
    if req.customer_name.trim().is_empty() {
        return Err(AppError::Validation("customer_name is required".to_string()));
    }
    if !req.customer_email.contains('@') {
        return Err(AppError::Validation("customer_email is invalid".to_string()));
    }
    if !req.price.is_finite() || req.price < 0.0 {
        return Err(AppError::Validation(
            "price must be a non-negative amount".to_string(),
        ));
    }

    let created = state
        .reservations
        .create(NewReservation {
            salon_id: salon.id,
            salon_name: salon.name,
            service: req.service,
            price: req.price,
            scheduled_at: req.scheduled_at,
            customer_name: req.customer_name,
            customer_email: req.customer_email,
            customer_phone: req.customer_phone,
            status: req.status.unwrap_or(ReservationStatus::Pending),
        })
        .await?;

    info!(
        "Reservation {} created for salon {} ({})",
        created.id, created.salon_id, created.service
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateReservationResponse {
            id: created.id,
            status: created.status,
        }),
    ))
}

/// GET /v1/reservations/{id}
async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<ReservationId>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state
        .reservations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("reservation {} not found", id)))?;
    Ok(Json(reservation))
}

/// GET /v1/reservations (admin)
async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            ReservationStatus::parse(raw)
                .ok_or_else(|| AppError::Validation(format!("unknown status {}", raw)))
        })
        .transpose()?;

    let filter = ReservationFilter {
        status,
        query: query.q,
        limit: query.limit,
        offset: query.offset,
    };
    let reservations = state.reservations.list(&filter).await?;
    Ok(Json(reservations))
}

/// PATCH /v1/reservations/{id}/status (admin)
/// Unconditional override: bypasses the transition table, including a
/// terminal `paid`, so every use is logged with the pre-image.
async fn update_reservation_status(
    State(state): State<AppState>,
    Path(id): Path<ReservationId>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, AppError> {
    let status = ReservationStatus::parse(&req.status)
        .ok_or_else(|| AppError::Validation(format!("unknown status {}", req.status)))?;

    let transition = state
        .reservations
        .set_status(id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("reservation {} not found", id)))?;

    tracing::warn!(
        "Admin override moved reservation {} from {} to {}",
        id,
        transition.previous,
        status
    );

    Ok(Json(UpdateStatusResponse {
        ok: true,
        previous: transition.previous,
    }))
}
