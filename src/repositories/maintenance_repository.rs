//! Repositorio de mantenimientos

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::maintenance::{
    CreateMaintenanceRequest, Maintenance, MaintenanceType, UpdateMaintenanceRequest,
};
use crate::models::vehicle::canonical_alias;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::store::Store;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::pagination::Paging;

pub struct MaintenanceRepository {
    store: Arc<Store>,
    vehicles: VehicleRepository,
}

impl MaintenanceRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            vehicles: VehicleRepository::new(store.clone()),
            store,
        }
    }

    pub async fn create(
        &self,
        owner: Uuid,
        request: CreateMaintenanceRequest,
    ) -> AppResult<Maintenance> {
        let vehicle = self
            .vehicles
            .require_active(owner, &request.vehicle_alias)
            .await?;

        let now = Utc::now();
        let record = Maintenance {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            maintenance_type: request.maintenance_type,
            description: request.description,
            cost: request.cost,
            odometer: request.odometer,
            date: request.date.unwrap_or(now),
            provider: request.provider,
            next_service_date: request.next_service_date,
            next_service_km: request.next_service_km,
            notes: request.notes,
            owner,
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert_maintenance(record).await)
    }

    /// Listado con filtros y paginación. El filtro por alias admite
    /// vehículos inactivos: el historial de un vehículo dado de baja
    /// sigue siendo consultable.
    #[allow(clippy::too_many_arguments)]
    pub async fn list(
        &self,
        owner: Uuid,
        vehicle_alias: Option<&str>,
        maintenance_type: Option<MaintenanceType>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        paging: Paging,
    ) -> AppResult<(Vec<Maintenance>, usize)> {
        let vehicle = match vehicle_alias {
            Some(alias) => Some(self.vehicles.get_by_alias(owner, alias).await?.id),
            None => None,
        };
        Ok(self
            .store
            .list_maintenance(
                owner,
                vehicle,
                maintenance_type,
                start,
                end,
                paging.skip(),
                paging.limit as usize,
            )
            .await)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<Maintenance> {
        self.store
            .find_maintenance(owner, id)
            .await
            .ok_or_else(|| AppError::NotFound("Mantenimiento no encontrado".to_string()))
    }

    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateMaintenanceRequest,
    ) -> AppResult<Maintenance> {
        let mut record = self.get(owner, id).await?;

        if let Some(alias) = request.vehicle_alias {
            let alias = canonical_alias(&alias);
            if alias != record.vehicle_alias {
                let vehicle = self
                    .vehicles
                    .require_active(owner, &alias)
                    .await
                    .map_err(|_| {
                        AppError::NotFound("Nuevo vehículo no encontrado".to_string())
                    })?;
                record.vehicle = vehicle.id;
                record.vehicle_alias = vehicle.alias;
            }
        }
        if let Some(maintenance_type) = request.maintenance_type {
            record.maintenance_type = maintenance_type;
        }
        if let Some(description) = request.description {
            record.description = description;
        }
        if let Some(cost) = request.cost {
            record.cost = cost;
        }
        if let Some(odometer) = request.odometer {
            record.odometer = odometer;
        }
        if let Some(date) = request.date {
            record.date = date;
        }
        if let Some(provider) = request.provider {
            record.provider = Some(provider);
        }
        if let Some(next_date) = request.next_service_date {
            record.next_service_date = Some(next_date);
        }
        if let Some(next_km) = request.next_service_km {
            record.next_service_km = Some(next_km);
        }
        if let Some(notes) = request.notes {
            record.notes = Some(notes);
        }
        record.updated_at = Utc::now();

        Ok(self.store.update_maintenance(record).await)
    }

    pub async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<()> {
        self.store
            .delete_maintenance(owner, id)
            .await
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Mantenimiento no encontrado".to_string()))
    }

    /// Todos los mantenimientos del dueño, para el listado de próximos
    pub async fn list_all(&self, owner: Uuid) -> Vec<Maintenance> {
        self.store.list_all_maintenance(owner, None).await
    }
}
