use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ReservationId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub salon_id: String,
    pub salon_name: String,
    pub service: String,
    pub price: f64,
    pub scheduled_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub status: ReservationStatus,
    pub checkout_session_id: Option<String>,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reservation lifecycle. `Paid` is confirmed by the payment processor and is
/// never reverted automatically; `Canceled` is only ever assigned through the
/// admin gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Pending,
    PendingOnline,
    Paid,
    Reserved,
    Canceled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::PendingOnline => "pending_online",
            ReservationStatus::Paid => "paid",
            ReservationStatus::Reserved => "reserved",
            ReservationStatus::Canceled => "canceled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReservationStatus::Pending),
            "pending_online" => Some(ReservationStatus::PendingOnline),
            "paid" => Some(ReservationStatus::Paid),
            "reserved" => Some(ReservationStatus::Reserved),
            "canceled" => Some(ReservationStatus::Canceled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
