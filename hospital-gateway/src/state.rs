// hospital-gateway/src/state.rs
// ============================================================================
// Module: Gateway State
// Description: Shared, clonable state handed to every axum handler and
// middleware layer.
// Dependencies: hospital-config, hospital-token, reqwest
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use hospital_config::GatewayConfig;
use hospital_token::TokenService;

use crate::discovery::{DashMapServiceRegistry, LoadBalanceStrategy, ServiceRegistry};
use crate::rate_limit::{DashMapRateLimitStore, RateLimitStore};

/// Everything the pipeline needs, built once at startup and shared behind
/// an `Arc` across every connection.
pub struct AppState {
    pub config: GatewayConfig,
    pub tokens: TokenService,
    pub rate_limiter: Box<dyn RateLimitStore>,
    pub registry: Box<dyn ServiceRegistry>,
    pub load_balance_strategy: LoadBalanceStrategy,
    pub http_client: reqwest::Client,
}

impl AppState {
    /// Builds gateway state with the default in-process rate limiter and
    /// service registry, and a `reqwest` client whose timeout matches the
    /// configured pipeline timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the `reqwest` client cannot be constructed.
    pub fn new(config: GatewayConfig, tokens: TokenService) -> reqwest::Result<Arc<Self>> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Arc::new(Self {
            config,
            tokens,
            rate_limiter: Box::new(DashMapRateLimitStore::new()),
            registry: Box::new(DashMapServiceRegistry::new()),
            load_balance_strategy: LoadBalanceStrategy::RoundRobin,
            http_client,
        }))
    }

    /// Registers a downstream service's instance base URLs.
    pub fn register_service(&self, service: &str, base_urls: Vec<String>) {
        self.registry.register(service, base_urls);
    }
}
