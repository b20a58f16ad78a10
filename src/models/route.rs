//! Modelo de Route
//!
//! Cada ruta referencia exactamente un vehículo y su distancia se refleja
//! exactamente una vez en el `kilometrajeTotal` del vehículo.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Ruta registrada contra un vehículo
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub id: Uuid,
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: String,
    pub vehicle: Uuid,
    #[serde(rename = "fecha")]
    pub date: DateTime<Utc>,
    #[serde(rename = "distanciaRecorrida")]
    pub distance: f64,
    #[serde(rename = "notasAdicionales")]
    pub notes: String,
    pub owner: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Request para crear una ruta
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRouteRequest {
    #[serde(rename = "vehicleAlias")]
    #[validate(length(min = 1, message = "El alias del vehículo es requerido"))]
    pub vehicle_alias: String,

    #[serde(rename = "distanciaRecorrida")]
    #[validate(range(min = 0.1, message = "La distancia debe ser mayor a 0"))]
    pub distance: f64,

    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "notasAdicionales")]
    pub notes: Option<String>,
}

/// Request para actualizar una ruta
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRouteRequest {
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: Option<String>,

    #[serde(rename = "distanciaRecorrida")]
    #[validate(range(min = 0.1, message = "La distancia debe ser mayor a 0"))]
    pub distance: Option<f64>,

    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "notasAdicionales")]
    pub notes: Option<String>,
}

/// Filtros para listado de rutas
#[derive(Debug, Deserialize)]
pub struct RouteListQuery {
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}
