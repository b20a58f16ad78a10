//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    /// Vigencia del token en segundos
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    /// Ventana general de rate limiting para toda la API
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    /// Ventana más estricta para los endpoints de autenticación
    pub auth_rate_limit_requests: u32,
    pub auth_rate_limit_window: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl EnvironmentConfig {
    pub fn from_env() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: env_or("PORT", 5000),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "kilometracker-dev-secret-change-in-production".to_string()),
            jwt_expiration: env_or("JWT_EXPIRATION", 86_400),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            rate_limit_requests: env_or("RATE_LIMIT_REQUESTS", 100),
            rate_limit_window: env_or("RATE_LIMIT_WINDOW", 900),
            auth_rate_limit_requests: env_or("AUTH_RATE_LIMIT_REQUESTS", 50),
            auth_rate_limit_window: env_or("AUTH_RATE_LIMIT_WINDOW", 900),
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
