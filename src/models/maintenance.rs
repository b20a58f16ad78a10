//! Modelo de Maintenance
//!
//! Registra servicios realizados y, opcionalmente, el próximo servicio
//! programado por fecha o por kilometraje.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Tipo de mantenimiento - enumeración cerrada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceType {
    #[serde(rename = "Cambio de aceite")]
    OilChange,
    #[serde(rename = "Rotación de llantas")]
    TireRotation,
    #[serde(rename = "Frenos")]
    Brakes,
    #[serde(rename = "Inspección")]
    Inspection,
    #[serde(rename = "Reparación")]
    Repair,
    #[serde(rename = "Batería")]
    Battery,
    #[serde(rename = "Filtros")]
    Filters,
    #[serde(rename = "Transmisión")]
    Transmission,
    #[serde(rename = "Suspensión")]
    Suspension,
    #[serde(rename = "Alineación")]
    Alignment,
    #[serde(rename = "Otro")]
    Other,
}

impl MaintenanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceType::OilChange => "Cambio de aceite",
            MaintenanceType::TireRotation => "Rotación de llantas",
            MaintenanceType::Brakes => "Frenos",
            MaintenanceType::Inspection => "Inspección",
            MaintenanceType::Repair => "Reparación",
            MaintenanceType::Battery => "Batería",
            MaintenanceType::Filters => "Filtros",
            MaintenanceType::Transmission => "Transmisión",
            MaintenanceType::Suspension => "Suspensión",
            MaintenanceType::Alignment => "Alineación",
            MaintenanceType::Other => "Otro",
        }
    }
}

impl fmt::Display for MaintenanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registro de mantenimiento contra un vehículo
#[derive(Debug, Clone, Serialize)]
pub struct Maintenance {
    pub id: Uuid,
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: String,
    pub vehicle: Uuid,
    #[serde(rename = "tipo")]
    pub maintenance_type: MaintenanceType,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "costo")]
    pub cost: f64,
    #[serde(rename = "kilometraje")]
    pub odometer: f64,
    #[serde(rename = "fecha")]
    pub date: DateTime<Utc>,
    #[serde(rename = "proveedor")]
    pub provider: Option<String>,
    #[serde(rename = "proximoServicioFecha")]
    pub next_service_date: Option<DateTime<Utc>>,
    #[serde(rename = "proximoServicioKm")]
    pub next_service_km: Option<f64>,
    #[serde(rename = "notas")]
    pub notes: Option<String>,
    pub owner: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un mantenimiento
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMaintenanceRequest {
    #[serde(rename = "vehicleAlias")]
    #[validate(length(min = 1, message = "El alias del vehículo es requerido"))]
    pub vehicle_alias: String,

    #[serde(rename = "tipo")]
    pub maintenance_type: MaintenanceType,

    #[serde(rename = "descripcion")]
    #[validate(length(min = 1, max = 500, message = "La descripción es requerida"))]
    pub description: String,

    #[serde(rename = "costo")]
    #[validate(range(min = 0.0, message = "El costo debe ser mayor o igual a 0"))]
    pub cost: f64,

    #[serde(rename = "kilometraje")]
    #[validate(range(min = 0.0, message = "El kilometraje debe ser mayor o igual a 0"))]
    pub odometer: f64,

    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "proveedor")]
    pub provider: Option<String>,

    #[serde(rename = "proximoServicioFecha")]
    pub next_service_date: Option<DateTime<Utc>>,

    #[serde(rename = "proximoServicioKm")]
    #[validate(range(min = 0.0, message = "El próximo servicio debe ser mayor o igual a 0"))]
    pub next_service_km: Option<f64>,

    #[serde(rename = "notas")]
    pub notes: Option<String>,
}

/// Request para actualizar un mantenimiento
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMaintenanceRequest {
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: Option<String>,

    #[serde(rename = "tipo")]
    pub maintenance_type: Option<MaintenanceType>,

    #[serde(rename = "descripcion")]
    #[validate(length(min = 1, max = 500, message = "La descripción es requerida"))]
    pub description: Option<String>,

    #[serde(rename = "costo")]
    #[validate(range(min = 0.0, message = "El costo debe ser mayor o igual a 0"))]
    pub cost: Option<f64>,

    #[serde(rename = "kilometraje")]
    #[validate(range(min = 0.0, message = "El kilometraje debe ser mayor o igual a 0"))]
    pub odometer: Option<f64>,

    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "proveedor")]
    pub provider: Option<String>,

    #[serde(rename = "proximoServicioFecha")]
    pub next_service_date: Option<DateTime<Utc>>,

    #[serde(rename = "proximoServicioKm")]
    #[validate(range(min = 0.0, message = "El próximo servicio debe ser mayor o igual a 0"))]
    pub next_service_km: Option<f64>,

    #[serde(rename = "notas")]
    pub notes: Option<String>,
}

/// Filtros para listado de mantenimientos
#[derive(Debug, Deserialize)]
pub struct MaintenanceListQuery {
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: Option<String>,
    pub tipo: Option<MaintenanceType>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
