use serde::Deserialize;
use serene_core::salon::SalonProfile;
use serene_core::verify::DEFAULT_TOLERANCE_SECONDS;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub stripe: StripeConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub salons: Vec<SalonProfile>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    /// Static bearer token for the admin surface.
    pub token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StripeConfig {
    /// API key for session creation; online checkout is disabled when absent.
    pub secret_key: Option<String>,
    /// Webhook signing secret; events are accepted unverified when absent.
    pub webhook_secret: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_tolerance")]
    pub webhook_tolerance_seconds: i64,
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_tolerance() -> i64 {
    DEFAULT_TOLERANCE_SECONDS
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CheckoutConfig {
    /// Redirect bases used when the checkout request supplies none; the
    /// request's own origin is the fallback after these.
    pub success_base_url: Option<String>,
    pub cancel_base_url: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of SERENE)
            // Eg.. `SERENE_DEBUG=1` would set the `debug` key
            .add_source(config::Environment::with_prefix("SERENE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
