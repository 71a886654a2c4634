use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use serene_core::checkout::{CheckoutProvider, HostedSession, SessionSpec};
use serene_core::{CoreError, CoreResult};

/// Outbound call timeout. Checkout and ingestion requests suspend on this
/// call, so it must be bounded.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Hosted-checkout client against the processor's REST API.
pub struct StripeClient {
    http: Client,
    secret_key: String,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: &str, api_base: &str) -> CoreResult<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoreError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self {
            http,
            secret_key: secret_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: String,
}

#[async_trait]
impl CheckoutProvider for StripeClient {
    async fn create_session(&self, spec: &SessionSpec) -> CoreResult<HostedSession> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), spec.success_url.clone()),
            ("cancel_url".into(), spec.cancel_url.clone()),
            ("client_reference_id".into(), spec.client_reference_id.clone()),
            ("line_items[0][quantity]".into(), "1".into()),
            (
                "line_items[0][price_data][currency]".into(),
                spec.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                spec.amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                spec.product_name.clone(),
            ),
        ];
        for (key, value) in &spec.metadata {
            form.push((format!("metadata[{}]", key), value.clone()));
        }

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                CoreError::UpstreamUnavailable(format!("session creation request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("session creation returned {}: {}", status, body);
            return Err(CoreError::UpstreamUnavailable(format!(
                "processor returned {}",
                status
            )));
        }

        let session: SessionResponse = response.json().await.map_err(|e| {
            CoreError::UpstreamUnavailable(format!("unreadable session response: {}", e))
        })?;

        Ok(HostedSession {
            id: session.id,
            url: session.url,
        })
    }
}
