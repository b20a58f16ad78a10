//! Estado compartido de la aplicación

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimiter;
use crate::services::jwt::JwtService;
use crate::store::Store;

/// Estado global inyectado en routers y middleware
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<EnvironmentConfig>,
    pub jwt: Arc<JwtService>,
    pub api_limiter: RateLimiter,
    pub auth_limiter: RateLimiter,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: EnvironmentConfig) -> Self {
        crate::utils::errors::set_production_mode(config.is_production());

        let jwt = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration as i64,
        ));
        let api_limiter = RateLimiter::new(
            config.rate_limit_requests,
            config.rate_limit_window,
        );
        let auth_limiter = RateLimiter::new(
            config.auth_rate_limit_requests,
            config.auth_rate_limit_window,
        );

        Self {
            store,
            config: Arc::new(config),
            jwt,
            api_limiter,
            auth_limiter,
        }
    }
}
