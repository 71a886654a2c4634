use std::sync::Arc;

use serene_core::checkout::CheckoutProvider;
use serene_core::repository::ReservationRepository;
use serene_core::salon::SalonDirectory;

#[derive(Clone, Default)]
pub struct CheckoutDefaults {
    pub success_base_url: Option<String>,
    pub cancel_base_url: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub reservations: Arc<dyn ReservationRepository>,
    pub salons: Arc<dyn SalonDirectory>,
    /// Absent when no processor API key is configured; online checkout is
    /// disabled in that case.
    pub checkout: Option<Arc<dyn CheckoutProvider>>,
    pub checkout_defaults: CheckoutDefaults,
    pub webhook_secret: Option<String>,
    pub webhook_tolerance_seconds: i64,
    pub admin_token: String,
}
