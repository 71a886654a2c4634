use std::sync::Arc;

use async_trait::async_trait;

use crate::money;
use crate::repository::ReservationRepository;
use crate::reservation::ReservationId;
use crate::{CoreError, CoreResult};

/// Everything the processor needs to create a hosted checkout session.
#[derive(Debug, Clone)]
pub struct SessionSpec {
    pub amount: i64,
    pub currency: String,
    pub product_name: String,
    /// Primary correlation reference echoed back by completion events.
    pub client_reference_id: String,
    /// Secondary correlation, duplicated into the session metadata.
    pub metadata: Vec<(String, String)>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone)]
pub struct HostedSession {
    pub id: String,
    pub url: String,
}

/// Outbound adapter for the payment processor's session-creation call.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_session(&self, spec: &SessionSpec) -> CoreResult<HostedSession>;
}

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub reservation_id: ReservationId,
    pub service: String,
    pub price: f64,
    pub currency: String,
    /// Base for the post-payment redirect; the caller's own origin when absent.
    pub success_base: Option<String>,
    pub cancel_base: Option<String>,
}

/// Creates a hosted payment session for a reservation and records the
/// session id against it.
pub struct CheckoutInitiator {
    repo: Arc<dyn ReservationRepository>,
    provider: Arc<dyn CheckoutProvider>,
}

impl CheckoutInitiator {
    pub fn new(repo: Arc<dyn ReservationRepository>, provider: Arc<dyn CheckoutProvider>) -> Self {
        Self { repo, provider }
    }

    /// Start a checkout. `origin` is the requesting site's own base URL,
    /// used when the request supplies no redirect bases.
    ///
    /// The external call completes before the local persist; if the persist
    /// then fails, the processor session is already live and unknown to the
    /// store, which is logged for the operator.
    pub async fn start(&self, request: CheckoutRequest, origin: &str) -> CoreResult<String> {
        if request.service.trim().is_empty() {
            return Err(CoreError::Validation("service is required".into()));
        }

        let amount = money::minor_units(request.price, &request.currency)?;
        let reference = request.reservation_id.to_string();

        let success_base = trim_base(request.success_base.as_deref().unwrap_or(origin));
        let cancel_base = trim_base(request.cancel_base.as_deref().unwrap_or(origin));
        if success_base.is_empty() || cancel_base.is_empty() {
            return Err(CoreError::Validation("no redirect base available".into()));
        }

        let spec = SessionSpec {
            amount,
            currency: request.currency.to_ascii_lowercase(),
            product_name: request.service.clone(),
            client_reference_id: reference.clone(),
            metadata: vec![("reservation_id".to_string(), reference.clone())],
            success_url: format!("{}/booking-success?reservation={}", success_base, reference),
            cancel_url: format!("{}/booking-cancelled?reservation={}", cancel_base, reference),
        };

        let session = self.provider.create_session(&spec).await?;

        match self
            .repo
            .attach_checkout_session(request.reservation_id, &session.id)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    "session {} created but reservation {} took no update, relying on event correlation",
                    session.id,
                    request.reservation_id
                );
            }
            Err(e) => {
                tracing::error!(
                    "session {} created but persisting against reservation {} failed: {}",
                    session.id,
                    request.reservation_id,
                    e
                );
                return Err(e.into());
            }
        }

        Ok(session.url)
    }
}

fn trim_base(base: &str) -> &str {
    base.trim().trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::ReservationStatus;
    use crate::test_support::{new_reservation, MemoryReservationRepository};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProvider {
        specs: Mutex<Vec<SessionSpec>>,
        fail: bool,
    }

    #[async_trait]
    impl CheckoutProvider for RecordingProvider {
        async fn create_session(&self, spec: &SessionSpec) -> CoreResult<HostedSession> {
            if self.fail {
                return Err(CoreError::UpstreamUnavailable("processor down".into()));
            }
            self.specs.lock().unwrap().push(spec.clone());
            Ok(HostedSession {
                id: "cs_test_123".into(),
                url: "https://checkout.example.com/c/pay/cs_test_123".into(),
            })
        }
    }

    fn request(id: i64) -> CheckoutRequest {
        CheckoutRequest {
            reservation_id: id,
            service: "Basic Treatment".into(),
            price: 5000.0,
            currency: "lkr".into(),
            success_base: None,
            cancel_base: None,
        }
    }

    #[tokio::test]
    async fn test_start_normalizes_amount_and_embeds_correlation_twice() {
        let repo = Arc::new(MemoryReservationRepository::default());
        let id = repo.seed(new_reservation(ReservationStatus::Pending));
        let provider = Arc::new(RecordingProvider::default());
        let initiator = CheckoutInitiator::new(repo.clone(), provider.clone());

        let url = initiator
            .start(request(id), "https://salon.example.com")
            .await
            .unwrap();

        assert_eq!(url, "https://checkout.example.com/c/pay/cs_test_123");
        let specs = provider.specs.lock().unwrap();
        let spec = &specs[0];
        assert_eq!(spec.amount, 5000);
        assert_eq!(spec.currency, "lkr");
        assert_eq!(spec.client_reference_id, id.to_string());
        assert_eq!(
            spec.metadata,
            vec![("reservation_id".to_string(), id.to_string())]
        );
        assert_eq!(
            spec.success_url,
            format!(
                "https://salon.example.com/booking-success?reservation={}",
                id
            )
        );
    }

    #[tokio::test]
    async fn test_two_decimal_currency_is_scaled() {
        let repo = Arc::new(MemoryReservationRepository::default());
        let id = repo.seed(new_reservation(ReservationStatus::Pending));
        let provider = Arc::new(RecordingProvider::default());
        let initiator = CheckoutInitiator::new(repo.clone(), provider.clone());

        let mut req = request(id);
        req.price = 15.0;
        req.currency = "usd".into();
        initiator.start(req, "https://salon.example.com").await.unwrap();

        assert_eq!(provider.specs.lock().unwrap()[0].amount, 1500);
    }

    #[tokio::test]
    async fn test_start_persists_session_and_moves_to_pending_online() {
        let repo = Arc::new(MemoryReservationRepository::default());
        let id = repo.seed(new_reservation(ReservationStatus::Pending));
        let provider = Arc::new(RecordingProvider::default());
        let initiator = CheckoutInitiator::new(repo.clone(), provider);

        initiator
            .start(request(id), "https://salon.example.com")
            .await
            .unwrap();

        let stored = repo.get_sync(id).unwrap();
        assert_eq!(stored.status, ReservationStatus::PendingOnline);
        assert_eq!(stored.checkout_session_id.as_deref(), Some("cs_test_123"));
    }

    #[tokio::test]
    async fn test_caller_supplied_base_wins_over_origin() {
        let repo = Arc::new(MemoryReservationRepository::default());
        let id = repo.seed(new_reservation(ReservationStatus::Pending));
        let provider = Arc::new(RecordingProvider::default());
        let initiator = CheckoutInitiator::new(repo.clone(), provider.clone());

        let mut req = request(id);
        req.success_base = Some("https://booking.example.com/".into());
        initiator.start(req, "https://salon.example.com").await.unwrap();

        let specs = provider.specs.lock().unwrap();
        assert!(specs[0]
            .success_url
            .starts_with("https://booking.example.com/booking-success"));
        assert!(specs[0]
            .cancel_url
            .starts_with("https://salon.example.com/booking-cancelled"));
    }

    #[tokio::test]
    async fn test_blank_service_is_rejected_before_the_external_call() {
        let repo = Arc::new(MemoryReservationRepository::default());
        let id = repo.seed(new_reservation(ReservationStatus::Pending));
        let provider = Arc::new(RecordingProvider::default());
        let initiator = CheckoutInitiator::new(repo.clone(), provider.clone());

        let mut req = request(id);
        req.service = "  ".into();
        let result = initiator.start(req, "https://salon.example.com").await;

        assert!(matches!(result, Err(CoreError::Validation(_))));
        assert!(provider.specs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_leaves_reservation_untouched() {
        let repo = Arc::new(MemoryReservationRepository::default());
        let id = repo.seed(new_reservation(ReservationStatus::Pending));
        let provider = Arc::new(RecordingProvider {
            fail: true,
            ..Default::default()
        });
        let initiator = CheckoutInitiator::new(repo.clone(), provider);

        let result = initiator.start(request(id), "https://salon.example.com").await;

        assert!(matches!(result, Err(CoreError::UpstreamUnavailable(_))));
        let stored = repo.get_sync(id).unwrap();
        assert_eq!(stored.status, ReservationStatus::Pending);
        assert!(stored.checkout_session_id.is_none());
    }

    #[tokio::test]
    async fn test_unknown_reservation_still_returns_redirect() {
        // Checkout without a prior existence check is allowed; reconciliation
        // later keys off the embedded correlation id.
        let repo = Arc::new(MemoryReservationRepository::default());
        let provider = Arc::new(RecordingProvider::default());
        let initiator = CheckoutInitiator::new(repo, provider);

        let url = initiator
            .start(request(404), "https://salon.example.com")
            .await
            .unwrap();
        assert!(!url.is_empty());
    }
}
