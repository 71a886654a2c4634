//! In-memory repository double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::repository::{
    NewReservation, ReservationFilter, ReservationRepository, StatusTransition, StoreError,
};
use crate::reservation::{Reservation, ReservationId, ReservationStatus};

#[derive(Default)]
pub struct MemoryReservationRepository {
    rows: Mutex<HashMap<ReservationId, Reservation>>,
    next_id: Mutex<ReservationId>,
}

impl MemoryReservationRepository {
    pub fn seed(&self, reservation: NewReservation) -> ReservationId {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let id = *next;
        let now = Utc::now();
        self.rows.lock().unwrap().insert(
            id,
            Reservation {
                id,
                salon_id: reservation.salon_id,
                salon_name: reservation.salon_name,
                service: reservation.service,
                price: reservation.price,
                scheduled_at: reservation.scheduled_at,
                customer_name: reservation.customer_name,
                customer_email: reservation.customer_email,
                customer_phone: reservation.customer_phone,
                status: reservation.status,
                checkout_session_id: None,
                payment_intent_id: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn get_sync(&self, id: ReservationId) -> Option<Reservation> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl ReservationRepository for MemoryReservationRepository {
    async fn create(&self, reservation: NewReservation) -> Result<Reservation, StoreError> {
        let id = self.seed(reservation);
        Ok(self.get_sync(id).unwrap())
    }

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>, StoreError> {
        Ok(self.get_sync(id))
    }

    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, StoreError> {
        let rows = self.rows.lock().unwrap();
        let mut matched: Vec<Reservation> = rows
            .values()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| {
                filter.query.as_deref().map_or(true, |q| {
                    let q = q.to_lowercase();
                    r.service.to_lowercase().contains(&q)
                        || r.customer_name.to_lowercase().contains(&q)
                        || r.customer_email.to_lowercase().contains(&q)
                        || r.customer_phone.to_lowercase().contains(&q)
                })
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let offset = filter.offset.unwrap_or(0).max(0) as usize;
        let limit = filter.limit.unwrap_or(50).max(0) as usize;
        Ok(matched.into_iter().skip(offset).take(limit).collect())
    }

    async fn set_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Option<StatusTransition>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(&id).map(|row| {
            let previous = row.status;
            row.status = status;
            row.updated_at = Utc::now();
            StatusTransition {
                previous,
                changed: previous != status,
            }
        }))
    }

    async fn attach_checkout_session(
        &self,
        id: ReservationId,
        session_id: &str,
    ) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&id) {
            Some(row) if row.status != ReservationStatus::Paid => {
                if row.checkout_session_id.is_none() && !session_id.is_empty() {
                    row.checkout_session_id = Some(session_id.to_string());
                }
                row.status = ReservationStatus::PendingOnline;
                row.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_payment(
        &self,
        id: ReservationId,
        payment_intent: &str,
    ) -> Result<Option<StatusTransition>, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.get_mut(&id).map(|row| {
            let previous = row.status;
            row.status = ReservationStatus::Paid;
            if row.payment_intent_id.is_none() && !payment_intent.is_empty() {
                row.payment_intent_id = Some(payment_intent.to_string());
            }
            row.updated_at = Utc::now();
            StatusTransition {
                previous,
                changed: previous != ReservationStatus::Paid,
            }
        }))
    }
}

pub fn new_reservation(status: ReservationStatus) -> NewReservation {
    NewReservation {
        salon_id: "salon01".into(),
        salon_name: "Serene Colombo".into(),
        service: "Basic Treatment".into(),
        price: 5000.0,
        scheduled_at: Utc::now(),
        customer_name: "Nimali Perera".into(),
        customer_email: "nimali@example.com".into(),
        customer_phone: "+94 77 123 4567".into(),
        status,
    }
}
