use serde::Deserialize;

use crate::reservation::ReservationId;
use crate::{CoreError, CoreResult};

/// Fields an inbound event may carry to locate the owning reservation. The
/// checkout path embeds the reservation id in both, so either one is enough
/// to correlate.
#[derive(Debug, Clone, Default)]
pub struct Correlation {
    pub client_reference_id: Option<String>,
    pub metadata_reservation_id: Option<String>,
}

impl Correlation {
    /// The reservation the event pertains to, if any field is present and
    /// parses as an id. An event with no resolvable correlation is an
    /// accepted no-op, not an error.
    pub fn reservation_id(&self) -> Option<ReservationId> {
        self.client_reference_id
            .as_deref()
            .or(self.metadata_reservation_id.as_deref())
            .and_then(|raw| raw.parse().ok())
    }
}

/// The closed set of processor notifications this system acts on. Anything
/// else parses to `Unrecognized` and is acknowledged without effect.
#[derive(Debug)]
pub enum ProcessorEvent {
    CheckoutCompleted {
        session_id: String,
        payment_intent: Option<String>,
        correlation: Correlation,
    },
    PaymentFailed {
        payment_intent: String,
        correlation: Correlation,
    },
    Unrecognized {
        kind: String,
    },
}

#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: EventObject,
}

#[derive(Debug, Deserialize)]
struct EventObject {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

impl EventObject {
    fn correlation(&self) -> Correlation {
        let metadata_reservation_id = self
            .metadata
            .as_ref()
            .and_then(|m| m.get("reservation_id"))
            .and_then(|v| v.as_str())
            .map(str::to_owned);
        Correlation {
            client_reference_id: self.client_reference_id.clone(),
            metadata_reservation_id,
        }
    }
}

impl ProcessorEvent {
    /// Parse a payload that has already passed (or explicitly skipped)
    /// signature verification.
    pub fn from_json(raw: &[u8]) -> CoreResult<ProcessorEvent> {
        let envelope: EventEnvelope = serde_json::from_slice(raw)
            .map_err(|e| CoreError::Validation(format!("unparseable event payload: {}", e)))?;

        let object = envelope.data.object;
        let event = match envelope.kind.as_str() {
            "checkout.session.completed" => ProcessorEvent::CheckoutCompleted {
                correlation: object.correlation(),
                session_id: object.id.unwrap_or_default(),
                payment_intent: object.payment_intent,
            },
            "payment_intent.payment_failed" => ProcessorEvent::PaymentFailed {
                correlation: object.correlation(),
                payment_intent: object.id.unwrap_or_default(),
            },
            other => ProcessorEvent::Unrecognized {
                kind: other.to_string(),
            },
        };
        Ok(event)
    }
}
