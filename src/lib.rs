//! kilometracker - API de seguimiento de operaciones vehiculares
//!
//! Cada usuario registra sus vehículos y lleva rutas, reabastecimientos,
//! mantenimientos y gastos, con estadísticas derivadas (eficiencia de
//! combustible, costo por km).

pub mod config;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

use std::time::Duration;

use axum::{middleware::from_fn, routing::get, Json, Router};
use serde_json::json;
use tower_http::timeout::TimeoutLayer;

use crate::state::AppState;

/// Construir el router completo de la aplicación.
///
/// El orden de capas implementa el pipeline: tracer (más externo) →
/// rate limiter general → auth limiter (solo /api/auth) → auth gate →
/// role gate → handlers.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", routes::auth_routes::router(&state))
        .nest("/vehicles", routes::vehicle_routes::router(&state))
        .nest("/routes", routes::route_routes::router(&state))
        .nest("/refuels", routes::refuel_routes::router(&state))
        .nest("/maintenance", routes::maintenance_routes::router(&state))
        .nest("/expenses", routes::expense_routes::router(&state))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::api_rate_limit,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::cors::cors_middleware(
            state.config.cors_origins.clone(),
        ))
        .layer(from_fn(middleware::request_logger::request_logger))
        .with_state(state)
}

/// Endpoint de salud simple
async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "kilometracker-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
