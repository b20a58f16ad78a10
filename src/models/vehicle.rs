//! Modelo de Vehicle
//!
//! Un vehículo pertenece a un único dueño. El alias se canonicaliza a
//! mayúsculas en el borde y `kilometrajeTotal` solo se ajusta a través
//! del ledger de odómetro, nunca directamente por el cliente.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Vehicle principal
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub alias: String,
    #[serde(rename = "marca")]
    pub make: String,
    #[serde(rename = "modelo")]
    pub model_year: i32,
    pub plates: Option<String>,
    #[serde(rename = "kilometrajeInicial")]
    pub initial_odometer: f64,
    #[serde(rename = "kilometrajeTotal")]
    pub total_odometer: f64,
    pub owner: Uuid,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Resumen de vehículo para respuestas de métricas
#[derive(Debug, Serialize)]
pub struct VehicleSummary {
    pub alias: String,
    pub marca: String,
    pub modelo: i32,
}

impl From<&Vehicle> for VehicleSummary {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            alias: vehicle.alias.clone(),
            marca: vehicle.make.clone(),
            modelo: vehicle.model_year,
        }
    }
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 20, message = "El alias es requerido"))]
    pub alias: String,

    #[serde(rename = "marca")]
    #[validate(length(min = 1, max = 100, message = "La marca es requerida"))]
    pub make: String,

    #[serde(rename = "modelo")]
    pub model_year: i32,

    pub plates: Option<String>,

    #[serde(rename = "kilometrajeInicial")]
    #[validate(range(min = 0.0, message = "El kilometraje inicial debe ser mayor o igual a 0"))]
    pub initial_odometer: Option<f64>,
}

/// Request para actualizar un vehículo existente.
/// `kilometrajeTotal` y `owner` no son actualizables por el cliente.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 20, message = "El alias es requerido"))]
    pub alias: Option<String>,

    #[serde(rename = "marca")]
    #[validate(length(min = 1, max = 100, message = "La marca es requerida"))]
    pub make: Option<String>,

    #[serde(rename = "modelo")]
    pub model_year: Option<i32>,

    pub plates: Option<String>,

    #[serde(rename = "kilometrajeInicial")]
    #[validate(range(min = 0.0, message = "El kilometraje inicial debe ser mayor o igual a 0"))]
    pub initial_odometer: Option<f64>,

    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

/// Filtros para listado de vehículos
#[derive(Debug, Deserialize)]
pub struct VehicleListQuery {
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

/// Canonicalizar un alias en el borde: trim + mayúsculas
pub fn canonical_alias(alias: &str) -> String {
    alias.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_alias() {
        assert_eq!(canonical_alias("car1"), "CAR1");
        assert_eq!(canonical_alias("  miAuto "), "MIAUTO");
    }

    #[test]
    fn test_vehicle_serializes_wire_names() {
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            alias: "CAR1".to_string(),
            make: "Toyota".to_string(),
            model_year: 2020,
            plates: None,
            initial_odometer: 1000.0,
            total_odometer: 1250.0,
            owner: Uuid::new_v4(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&vehicle).unwrap();
        assert_eq!(json["kilometrajeTotal"], 1250.0);
        assert_eq!(json["marca"], "Toyota");
        assert_eq!(json["isActive"], true);
    }
}
