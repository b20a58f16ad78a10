//! Repositorio de reabastecimientos

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::refuel::{CreateRefuelRequest, Refuel, UpdateRefuelRequest};
use crate::models::vehicle::{canonical_alias, Vehicle};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::store::Store;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::pagination::Paging;

pub struct RefuelRepository {
    store: Arc<Store>,
    vehicles: VehicleRepository,
}

impl RefuelRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            vehicles: VehicleRepository::new(store.clone()),
            store,
        }
    }

    pub async fn create(&self, owner: Uuid, request: CreateRefuelRequest) -> AppResult<Refuel> {
        let vehicle = self
            .vehicles
            .require_active(owner, &request.vehicle_alias)
            .await?;

        let now = Utc::now();
        let refuel = Refuel {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            fuel_type: request.fuel_type,
            amount_spent: request.amount_spent,
            gallons: request.gallons,
            date: request.date.unwrap_or(now),
            owner,
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert_refuel(refuel).await)
    }

    pub async fn list(
        &self,
        owner: Uuid,
        vehicle_alias: Option<&str>,
        paging: Paging,
    ) -> AppResult<(Vec<Refuel>, usize)> {
        let vehicle = match vehicle_alias {
            Some(alias) => Some(self.vehicles.get_by_alias(owner, alias).await?.id),
            None => None,
        };
        Ok(self
            .store
            .list_refuels(owner, vehicle, paging.skip(), paging.limit as usize)
            .await)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<Refuel> {
        self.store
            .find_refuel(owner, id)
            .await
            .ok_or_else(|| AppError::NotFound("Reabastecimiento no encontrado".to_string()))
    }

    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateRefuelRequest,
    ) -> AppResult<Refuel> {
        let mut refuel = self.get(owner, id).await?;

        // Un cambio de alias re-valida el vehículo nuevo
        if let Some(alias) = request.vehicle_alias {
            let alias = canonical_alias(&alias);
            if alias != refuel.vehicle_alias {
                let vehicle = self
                    .vehicles
                    .require_active(owner, &alias)
                    .await
                    .map_err(|_| {
                        AppError::NotFound("Nuevo vehículo no encontrado".to_string())
                    })?;
                refuel.vehicle = vehicle.id;
                refuel.vehicle_alias = vehicle.alias;
            }
        }
        if let Some(fuel_type) = request.fuel_type {
            refuel.fuel_type = fuel_type;
        }
        if let Some(amount) = request.amount_spent {
            refuel.amount_spent = amount;
        }
        if let Some(gallons) = request.gallons {
            refuel.gallons = Some(gallons);
        }
        if let Some(date) = request.date {
            refuel.date = date;
        }
        refuel.updated_at = Utc::now();

        Ok(self.store.update_refuel(refuel).await)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        self.store
            .delete_refuel(owner, id)
            .await
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Reabastecimiento no encontrado".to_string()))
    }

    /// Vehículo activo + todos sus reabastecimientos, para el análisis
    pub async fn for_analysis(
        &self,
        owner: Uuid,
        vehicle_alias: &str,
    ) -> AppResult<(Vehicle, Vec<Refuel>)> {
        let vehicle = self.vehicles.require_active(owner, vehicle_alias).await?;
        let refuels = self.store.list_all_refuels(owner, Some(vehicle.id)).await;
        Ok((vehicle, refuels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::refuel::FuelType;
    use crate::models::vehicle::CreateVehicleRequest;

    async fn setup() -> (RefuelRepository, Uuid) {
        let store = Arc::new(Store::new());
        let vehicles = VehicleRepository::new(store.clone());
        let owner = Uuid::new_v4();
        vehicles
            .create(
                owner,
                CreateVehicleRequest {
                    alias: "CAR1".to_string(),
                    make: "Toyota".to_string(),
                    model_year: 2020,
                    plates: None,
                    initial_odometer: None,
                },
            )
            .await
            .unwrap();
        (RefuelRepository::new(store), owner)
    }

    fn create_request(amount: f64, gallons: Option<f64>) -> CreateRefuelRequest {
        CreateRefuelRequest {
            vehicle_alias: "CAR1".to_string(),
            fuel_type: FuelType::Regular,
            amount_spent: amount,
            gallons,
            date: None,
        }
    }

    #[tokio::test]
    async fn test_create_does_not_touch_odometer() {
        let (repo, owner) = setup().await;
        let refuel = repo
            .create(owner, create_request(500.0, Some(10.0)))
            .await
            .unwrap();
        assert_eq!(refuel.vehicle_alias, "CAR1");

        let (vehicle, refuels) = repo.for_analysis(owner, "car1").await.unwrap();
        assert_eq!(vehicle.total_odometer, 0.0);
        assert_eq!(refuels.len(), 1);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let (repo, owner) = setup().await;
        for i in 0..15 {
            repo.create(owner, create_request(100.0 + i as f64, None))
                .await
                .unwrap();
        }

        let (page, total) = repo
            .list(owner, Some("CAR1"), Paging { page: 2, limit: 10 })
            .await
            .unwrap();
        assert_eq!(total, 15);
        assert_eq!(page.len(), 5);
    }
}
