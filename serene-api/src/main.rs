use std::net::SocketAddr;
use std::sync::Arc;

use serene_api::{
    app,
    state::{AppState, CheckoutDefaults},
};
use serene_core::checkout::CheckoutProvider;
use serene_core::salon::StaticSalonDirectory;
use serene_store::{DbClient, PgReservationRepository, StripeClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "serene_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = serene_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Serene API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to database");
    db.migrate().await.expect("Failed to run migrations");

    let checkout: Option<Arc<dyn CheckoutProvider>> = match config.stripe.secret_key.as_deref() {
        Some(key) => Some(Arc::new(
            StripeClient::new(key, &config.stripe.api_base)
                .expect("Failed to build payment client"),
        )),
        None => {
            tracing::warn!("stripe.secret_key not configured, online checkout disabled");
            None
        }
    };
    if config.stripe.webhook_secret.is_none() {
        tracing::warn!(
            "stripe.webhook_secret not configured, webhook events will be accepted unverified"
        );
    }

    let app_state = AppState {
        reservations: Arc::new(PgReservationRepository::new(db.pool.clone())),
        salons: Arc::new(StaticSalonDirectory::new(config.salons.clone())),
        checkout,
        checkout_defaults: CheckoutDefaults {
            success_base_url: config.checkout.success_base_url.clone(),
            cancel_base_url: config.checkout.cancel_base_url.clone(),
        },
        webhook_secret: config.stripe.webhook_secret.clone(),
        webhook_tolerance_seconds: config.stripe.webhook_tolerance_seconds,
        admin_token: config.admin.token.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
