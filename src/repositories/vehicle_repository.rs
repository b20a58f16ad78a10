//! Repositorio de vehículos
//!
//! Todas las búsquedas canonicalizan el alias y filtran por dueño. El
//! kilometraje total solo lo toca el ledger de odómetro.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::vehicle::{
    canonical_alias, CreateVehicleRequest, UpdateVehicleRequest, Vehicle,
};
use crate::store::Store;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::validate_model_year;

pub struct VehicleRepository {
    store: Arc<Store>,
}

impl VehicleRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner: Uuid, request: CreateVehicleRequest) -> AppResult<Vehicle> {
        validate_model_year(request.model_year)?;

        let initial = request.initial_odometer.unwrap_or(0.0);
        let now = Utc::now();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            alias: canonical_alias(&request.alias),
            make: request.make,
            model_year: request.model_year,
            plates: request.plates,
            initial_odometer: initial,
            total_odometer: initial,
            owner,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_vehicle(vehicle).await
    }

    pub async fn list(&self, owner: Uuid, is_active: Option<bool>) -> Vec<Vehicle> {
        self.store.list_vehicles(owner, is_active).await
    }

    /// Buscar por alias sin importar el estado activo
    pub async fn get_by_alias(&self, owner: Uuid, alias: &str) -> AppResult<Vehicle> {
        self.store
            .find_vehicle_by_alias(owner, &canonical_alias(alias))
            .await
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))
    }

    /// Buscar por alias exigiendo que esté activo. Es el chequeo previo
    /// a crear registros hijos: un vehículo ajeno, inexistente o
    /// inactivo responde igual.
    pub async fn require_active(&self, owner: Uuid, alias: &str) -> AppResult<Vehicle> {
        let vehicle = self.get_by_alias(owner, alias).await?;
        if !vehicle.is_active {
            return Err(AppError::NotFound("Vehículo no encontrado".to_string()));
        }
        Ok(vehicle)
    }

    pub async fn update(
        &self,
        owner: Uuid,
        alias: &str,
        request: UpdateVehicleRequest,
    ) -> AppResult<Vehicle> {
        let mut vehicle = self.get_by_alias(owner, alias).await?;

        if let Some(new_alias) = request.alias {
            vehicle.alias = canonical_alias(&new_alias);
        }
        if let Some(make) = request.make {
            vehicle.make = make;
        }
        if let Some(model_year) = request.model_year {
            validate_model_year(model_year)?;
            vehicle.model_year = model_year;
        }
        if let Some(plates) = request.plates {
            vehicle.plates = Some(plates);
        }
        if let Some(initial) = request.initial_odometer {
            vehicle.initial_odometer = initial;
        }
        if let Some(is_active) = request.is_active {
            vehicle.is_active = is_active;
        }
        vehicle.updated_at = Utc::now();

        self.store.update_vehicle(vehicle).await
    }

    /// Borrado lógico. Idempotente: repetirlo deja el mismo estado.
    pub async fn soft_delete(&self, owner: Uuid, alias: &str) -> AppResult<Vehicle> {
        let mut vehicle = self.get_by_alias(owner, alias).await?;
        vehicle.is_active = false;
        vehicle.updated_at = Utc::now();
        self.store.update_vehicle(vehicle).await
    }

    pub async fn reactivate(&self, owner: Uuid, alias: &str) -> AppResult<Vehicle> {
        let mut vehicle = self.get_by_alias(owner, alias).await?;
        vehicle.is_active = true;
        vehicle.updated_at = Utc::now();
        self.store.update_vehicle(vehicle).await
    }
}
