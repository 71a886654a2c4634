use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::reservation::{Reservation, ReservationId, ReservationStatus};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("corrupt row: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub salon_id: String,
    pub salon_name: String,
    pub service: String,
    pub price: f64,
    pub scheduled_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub status: ReservationStatus,
}

/// Result of an atomic status write: the status the row held before the
/// statement ran, and whether the write actually moved it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub previous: ReservationStatus,
    pub changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    /// Free-text match over service and customer contact fields.
    pub query: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Durable reservation records. Status mutations are single-statement atomic
/// updates so an admin override racing a webhook can never interleave a
/// read-modify-write; each returns the prior status for audit logging.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn create(&self, reservation: NewReservation) -> Result<Reservation, StoreError>;

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>, StoreError>;

    /// Recency-ordered page of reservations matching the filter.
    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, StoreError>;

    /// Unconditional status overwrite (admin path). `None` when the id does
    /// not resolve to a stored record.
    async fn set_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Option<StatusTransition>, StoreError>;

    /// Record a created checkout session: moves the row to `pending_online`
    /// and attaches the session id. An already-attached session id is kept;
    /// a row already settled as `paid` is left alone. Returns whether a row
    /// was written.
    async fn attach_checkout_session(
        &self,
        id: ReservationId,
        session_id: &str,
    ) -> Result<bool, StoreError>;

    /// Settle the reservation as `paid` and attach the payment-intent id in
    /// one atomic statement. Idempotent: re-applying the same settlement
    /// leaves the row unchanged and reports `changed: false`. An intent id,
    /// once attached, is never overwritten.
    async fn record_payment(
        &self,
        id: ReservationId,
        payment_intent: &str,
    ) -> Result<Option<StatusTransition>, StoreError>;
}
