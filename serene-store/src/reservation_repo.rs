use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use serene_core::repository::{
    NewReservation, ReservationFilter, ReservationRepository, StatusTransition, StoreError,
};
use serene_core::reservation::{Reservation, ReservationId, ReservationStatus};

const DEFAULT_PAGE_SIZE: i64 = 50;

pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: i64,
    salon_id: String,
    salon_name: String,
    service: String,
    price: f64,
    scheduled_at: DateTime<Utc>,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    status: String,
    checkout_session_id: Option<String>,
    payment_intent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StoreError;

    fn try_from(row: ReservationRow) -> Result<Self, StoreError> {
        let status = ReservationStatus::parse(&row.status).ok_or_else(|| {
            StoreError::Decode(format!(
                "reservation {} has unknown status {}",
                row.id, row.status
            ))
        })?;
        Ok(Reservation {
            id: row.id,
            salon_id: row.salon_id,
            salon_name: row.salon_name,
            service: row.service,
            price: row.price,
            scheduled_at: row.scheduled_at,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            status,
            checkout_session_id: row.checkout_session_id,
            payment_intent_id: row.payment_intent_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

const COLUMNS: &str = "id, salon_id, salon_name, service, price, scheduled_at, \
     customer_name, customer_email, customer_phone, status, \
     checkout_session_id, payment_intent_id, created_at, updated_at";

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    async fn create(&self, reservation: NewReservation) -> Result<Reservation, StoreError> {
        let sql = format!(
            "INSERT INTO reservations \
             (salon_id, salon_name, service, price, scheduled_at, \
              customer_name, customer_email, customer_phone, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            COLUMNS
        );
        let row: ReservationRow = sqlx::query_as(&sql)
            .bind(&reservation.salon_id)
            .bind(&reservation.salon_name)
            .bind(&reservation.service)
            .bind(reservation.price)
            .bind(reservation.scheduled_at)
            .bind(&reservation.customer_name)
            .bind(&reservation.customer_email)
            .bind(&reservation.customer_phone)
            .bind(reservation.status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        row.try_into()
    }

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>, StoreError> {
        let sql = format!("SELECT {} FROM reservations WHERE id = $1", COLUMNS);
        let row: Option<ReservationRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.map(Reservation::try_from).transpose()
    }

    async fn list(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>, StoreError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM reservations WHERE TRUE", COLUMNS));

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(query) = filter.query.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = format!("%{}%", query.trim());
            qb.push(" AND (service ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_phone ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(" ORDER BY created_at DESC, id DESC");
        qb.push(" LIMIT ")
            .push_bind(filter.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(0, 500));
        qb.push(" OFFSET ").push_bind(filter.offset.unwrap_or(0).max(0));

        let rows: Vec<ReservationRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn set_status(
        &self,
        id: ReservationId,
        status: ReservationStatus,
    ) -> Result<Option<StatusTransition>, StoreError> {
        // Single statement so the overwrite cannot race a concurrent webhook
        // write; the pre-image comes back for audit logging.
        let previous: Option<String> = sqlx::query_scalar(
            "UPDATE reservations AS r \
             SET status = $2, updated_at = now() \
             FROM (SELECT id, status AS previous FROM reservations WHERE id = $1 FOR UPDATE) AS prior \
             WHERE r.id = prior.id \
             RETURNING prior.previous",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        previous
            .map(|raw| {
                let previous = ReservationStatus::parse(&raw).ok_or_else(|| {
                    StoreError::Decode(format!("reservation {} had unknown status {}", id, raw))
                })?;
                Ok(StatusTransition {
                    previous,
                    changed: previous != status,
                })
            })
            .transpose()
    }

    async fn attach_checkout_session(
        &self,
        id: ReservationId,
        session_id: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE reservations \
             SET status = 'pending_online', \
                 checkout_session_id = COALESCE(checkout_session_id, NULLIF($2, '')), \
                 updated_at = now() \
             WHERE id = $1 AND status <> 'paid'",
        )
        .bind(id)
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_payment(
        &self,
        id: ReservationId,
        payment_intent: &str,
    ) -> Result<Option<StatusTransition>, StoreError> {
        // Status and intent id land in one atomic statement; COALESCE keeps
        // an already-attached intent id, NULLIF keeps empty values out.
        let previous: Option<String> = sqlx::query_scalar(
            "UPDATE reservations AS r \
             SET status = 'paid', \
                 payment_intent_id = COALESCE(r.payment_intent_id, NULLIF($2, '')), \
                 updated_at = now() \
             FROM (SELECT id, status AS previous FROM reservations WHERE id = $1 FOR UPDATE) AS prior \
             WHERE r.id = prior.id \
             RETURNING prior.previous",
        )
        .bind(id)
        .bind(payment_intent)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        previous
            .map(|raw| {
                let previous = ReservationStatus::parse(&raw).ok_or_else(|| {
                    StoreError::Decode(format!("reservation {} had unknown status {}", id, raw))
                })?;
                Ok(StatusTransition {
                    previous,
                    changed: previous != ReservationStatus::Paid,
                })
            })
            .transpose()
    }
}
