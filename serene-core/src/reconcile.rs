use std::sync::Arc;

use crate::event::ProcessorEvent;
use crate::repository::{ReservationRepository, StoreError};
use crate::reservation::{ReservationId, ReservationStatus};

/// What applying a verified event did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The reservation moved to `paid`.
    Settled {
        reservation_id: ReservationId,
        previous: ReservationStatus,
    },
    /// The reservation was already `paid`; the redelivery changed nothing.
    Replayed { reservation_id: ReservationId },
    /// Accepted without effect: unrecognized kind, missing correlation,
    /// unknown target, or a failure notification that is log-only.
    Noop { reason: &'static str },
}

/// Maps verified processor events onto reservation-status transitions.
///
/// Delivery is at-least-once and unordered, so every transition is a
/// set-status keyed by the target state the event implies; duplicates and
/// stale deliveries settle last-write-wins without error.
pub struct ReconciliationEngine {
    repo: Arc<dyn ReservationRepository>,
}

impl ReconciliationEngine {
    pub fn new(repo: Arc<dyn ReservationRepository>) -> Self {
        Self { repo }
    }

    pub async fn apply(&self, event: ProcessorEvent) -> Result<ReconcileOutcome, StoreError> {
        match event {
            ProcessorEvent::CheckoutCompleted {
                session_id,
                payment_intent,
                correlation,
            } => {
                let Some(reservation_id) = correlation.reservation_id() else {
                    tracing::info!(
                        "completed session {} carries no reservation correlation, ignoring",
                        session_id
                    );
                    return Ok(ReconcileOutcome::Noop {
                        reason: "no correlation",
                    });
                };

                let intent = payment_intent.unwrap_or_default();
                match self.repo.record_payment(reservation_id, &intent).await? {
                    None => {
                        // The event source does not retry on success signals,
                        // so an unknown target is acknowledged, not errored.
                        tracing::warn!(
                            "completed session {} references unknown reservation {}, ignoring",
                            session_id,
                            reservation_id
                        );
                        Ok(ReconcileOutcome::Noop {
                            reason: "unknown reservation",
                        })
                    }
                    Some(transition) if transition.changed => {
                        tracing::info!(
                            "reservation {} settled as paid (was {}), intent {}",
                            reservation_id,
                            transition.previous,
                            intent
                        );
                        Ok(ReconcileOutcome::Settled {
                            reservation_id,
                            previous: transition.previous,
                        })
                    }
                    Some(_) => {
                        tracing::info!(
                            "reservation {} already paid, duplicate delivery of session {}",
                            reservation_id,
                            session_id
                        );
                        Ok(ReconcileOutcome::Replayed { reservation_id })
                    }
                }
            }
            ProcessorEvent::PaymentFailed {
                payment_intent,
                correlation,
            } => {
                // Failures are surfaced to operators only; the reservation
                // stays where it is until an admin decides.
                tracing::warn!(
                    "payment failed for intent {} (reservation {:?})",
                    payment_intent,
                    correlation.reservation_id()
                );
                Ok(ReconcileOutcome::Noop {
                    reason: "payment failure logged",
                })
            }
            ProcessorEvent::Unrecognized { kind } => {
                tracing::debug!("ignoring unhandled event kind {}", kind);
                Ok(ReconcileOutcome::Noop {
                    reason: "unrecognized event kind",
                })
            }
        }
    }
}
