//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Pingable, RateLimitStore};
use crate::services::ServiceContainer;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Application services
    pub services: Arc<dyn ServiceContainer>,
    /// Request counters for the rate limiting middleware
    pub rate_limiter: Arc<dyn RateLimitStore>,
    /// Database health probe
    pub database: Arc<dyn Pingable>,
    /// Redis health probe
    pub cache: Arc<dyn Pingable>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        rate_limiter: Arc<dyn RateLimitStore>,
        database: Arc<dyn Pingable>,
        cache: Arc<dyn Pingable>,
        config: Config,
    ) -> Self {
        Self {
            services,
            rate_limiter,
            database,
            cache,
            config: Arc::new(config),
        }
    }
}
