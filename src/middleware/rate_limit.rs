//! Middleware de Rate Limiting
//!
//! Ventana fija por clave de cliente. Hay dos instancias independientes
//! con su propio mapa: una general para toda la API y una más estricta
//! para los endpoints de autenticación. El sweep periódico es solo
//! recolección de basura; una pasada perdida nunca cambia una decisión
//! de admisión.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::RwLock;

use crate::state::AppState;
use crate::utils::errors::AppError;

/// Ventana en curso para una clave de cliente
#[derive(Debug, Clone)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Limitador de ventana fija. Clonar comparte el mismo mapa.
#[derive(Clone)]
pub struct RateLimiter {
    entries: Arc<RwLock<HashMap<String, WindowEntry>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Chequeo de admisión para una clave. `Err` lleva los segundos
    /// hasta el reinicio de la ventana.
    pub async fn check(&self, key: &str) -> Result<(), u64> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        match entries.get_mut(key) {
            None => {
                entries.insert(
                    key.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Ok(())
            }
            Some(entry) if now > entry.reset_at => {
                entry.count = 1;
                entry.reset_at = now + self.window;
                Ok(())
            }
            Some(entry) if entry.count < self.max_requests => {
                entry.count += 1;
                Ok(())
            }
            Some(entry) => {
                let remaining = entry.reset_at.saturating_duration_since(now);
                Err((remaining.as_secs_f64().ceil() as u64).max(1))
            }
        }
    }

    /// Purgar entradas sin uso una ventana entera después de su reset.
    pub async fn sweep(&self) {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let grace = self.window;
        entries.retain(|_, entry| now < entry.reset_at + grace);
    }

    /// Lanzar la tarea de limpieza periódica en background.
    pub fn spawn_sweeper(&self) {
        let limiter = self.clone();
        let interval = limiter.window;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                limiter.sweep().await;
            }
        });
    }
}

/// Clave de cliente: primer elemento de `x-forwarded-for`, o "unknown"
pub fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim())
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Rate limiting general para toda la API
pub async fn api_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);
    state
        .api_limiter
        .check(&key)
        .await
        .map_err(AppError::RateLimited)?;
    Ok(next.run(request).await)
}

/// Rate limiting más estricto para los endpoints de autenticación
pub async fn auth_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&request);
    state
        .auth_limiter
        .check(&key)
        .await
        .map_err(AppError::RateLimited)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_after_max_requests() {
        let limiter = RateLimiter::new(3, 900);

        assert!(limiter.check("1.2.3.4").await.is_ok());
        assert!(limiter.check("1.2.3.4").await.is_ok());
        assert!(limiter.check("1.2.3.4").await.is_ok());

        let retry = limiter.check("1.2.3.4").await.unwrap_err();
        assert!(retry >= 1 && retry <= 900);

        // Otra clave tiene su propia ventana
        assert!(limiter.check("5.6.7.8").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, 0);

        assert!(limiter.check("1.2.3.4").await.is_ok());
        // Ventana de 0 segundos: ya venció, el contador se reinicia
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(limiter.check("1.2.3.4").await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_purges_stale_entries() {
        let limiter = RateLimiter::new(5, 0);
        limiter.check("1.2.3.4").await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        limiter.sweep().await;
        assert!(limiter.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_independent_instances_do_not_share_state() {
        let general = RateLimiter::new(1, 900);
        let strict = RateLimiter::new(1, 900);

        assert!(general.check("1.2.3.4").await.is_ok());
        assert!(strict.check("1.2.3.4").await.is_ok());
        assert!(general.check("1.2.3.4").await.is_err());
    }
}
