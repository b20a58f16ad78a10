use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kilometracker::config::environment::EnvironmentConfig;
use kilometracker::state::AppState;
use kilometracker::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚗 kilometracker - API de operaciones vehiculares");
    info!("================================================");

    let config = EnvironmentConfig::from_env();
    let store = Arc::new(Store::new());
    let state = AppState::new(store, config.clone());

    // Barrido periódico de entradas viejas del rate limiter
    state.api_limiter.spawn_sweeper();
    state.auth_limiter.spawn_sweeper();

    let app = kilometracker::build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints principales:");
    info!("   POST /api/auth/register - Registro de usuario");
    info!("   POST /api/auth/login - Login");
    info!("   GET  /api/auth/me - Usuario actual");
    info!("   GET/POST/PUT/DELETE /api/vehicles/:alias - Vehículos");
    info!("   GET  /api/vehicles/:alias/stats - Estadísticas del vehículo");
    info!("   GET  /api/vehicles/:alias/fuel-efficiency - Eficiencia");
    info!("   GET/POST/PUT/DELETE /api/routes/:id - Rutas");
    info!("   GET/POST/PUT/DELETE /api/refuels/:id - Reabastecimientos");
    info!("   GET  /api/refuels/vehicle/:alias/analysis - Análisis de consumo");
    info!("   GET/POST/PUT/DELETE /api/maintenance/:id - Mantenimientos");
    info!("   GET  /api/maintenance/upcoming - Mantenimientos próximos");
    info!("   GET/POST/PUT/DELETE /api/expenses/:id - Gastos");
    info!("   GET  /api/expenses/summary - Resumen por categoría");
    info!("   GET  /api/expenses/upcoming - Gastos recurrentes próximos");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
