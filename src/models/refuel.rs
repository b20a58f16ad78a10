//! Modelo de Refuel
//!
//! El precio por galón es un valor derivado: se calcula en el borde de
//! presentación a partir de monto y galones, nunca se persiste.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Tipo de combustible - enumeración cerrada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    #[serde(rename = "Regular")]
    Regular,
    #[serde(rename = "Premium")]
    Premium,
    #[serde(rename = "Diesel")]
    Diesel,
    #[serde(rename = "Eléctrico")]
    Electric,
    #[serde(rename = "Híbrido")]
    Hybrid,
    #[serde(rename = "V-Power")]
    VPower,
}

impl FuelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Regular => "Regular",
            FuelType::Premium => "Premium",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Eléctrico",
            FuelType::Hybrid => "Híbrido",
            FuelType::VPower => "V-Power",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reabastecimiento registrado contra un vehículo
#[derive(Debug, Clone, Serialize)]
pub struct Refuel {
    pub id: Uuid,
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: String,
    pub vehicle: Uuid,
    #[serde(rename = "tipoCombustible")]
    pub fuel_type: FuelType,
    #[serde(rename = "cantidadGastada")]
    pub amount_spent: f64,
    #[serde(rename = "galones")]
    pub gallons: Option<f64>,
    #[serde(rename = "fecha")]
    pub date: DateTime<Utc>,
    pub owner: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Respuesta de reabastecimiento con el precio por galón derivado
#[derive(Debug, Serialize)]
pub struct RefuelResponse {
    #[serde(flatten)]
    pub refuel: Refuel,
    #[serde(rename = "precioPorGalon")]
    pub price_per_gallon: Option<String>,
}

impl From<Refuel> for RefuelResponse {
    fn from(refuel: Refuel) -> Self {
        let price_per_gallon = refuel
            .gallons
            .filter(|g| *g > 0.0)
            .map(|g| format!("{:.2}", refuel.amount_spent / g));
        Self {
            refuel,
            price_per_gallon,
        }
    }
}

/// Request para crear un reabastecimiento
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRefuelRequest {
    #[serde(rename = "vehicleAlias")]
    #[validate(length(min = 1, message = "El alias del vehículo es requerido"))]
    pub vehicle_alias: String,

    #[serde(rename = "tipoCombustible")]
    pub fuel_type: FuelType,

    #[serde(rename = "cantidadGastada")]
    #[validate(range(min = 0.0, message = "La cantidad debe ser mayor o igual a 0"))]
    pub amount_spent: f64,

    #[serde(rename = "galones")]
    #[validate(range(min = 0.0, message = "Los galones deben ser mayor o igual a 0"))]
    pub gallons: Option<f64>,

    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,
}

/// Request para actualizar un reabastecimiento
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRefuelRequest {
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: Option<String>,

    #[serde(rename = "tipoCombustible")]
    pub fuel_type: Option<FuelType>,

    #[serde(rename = "cantidadGastada")]
    #[validate(range(min = 0.0, message = "La cantidad debe ser mayor o igual a 0"))]
    pub amount_spent: Option<f64>,

    #[serde(rename = "galones")]
    #[validate(range(min = 0.0, message = "Los galones deben ser mayor o igual a 0"))]
    pub gallons: Option<f64>,

    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,
}

/// Filtros para listado de reabastecimientos
#[derive(Debug, Deserialize)]
pub struct RefuelListQuery {
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
