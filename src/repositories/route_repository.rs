//! Repositorio de rutas
//!
//! Cada mutación de ruta pasa por el ledger de odómetro en la misma
//! operación, así el total del vehículo nunca queda desincronizado de
//! sus rutas.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::route::{CreateRouteRequest, Route, UpdateRouteRequest};
use crate::models::vehicle::canonical_alias;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::odometer::OdometerLedger;
use crate::store::Store;
use crate::utils::errors::{AppError, AppResult};

pub struct RouteRepository {
    store: Arc<Store>,
    vehicles: VehicleRepository,
    ledger: OdometerLedger,
}

impl RouteRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            vehicles: VehicleRepository::new(store.clone()),
            ledger: OdometerLedger::new(store.clone()),
            store,
        }
    }

    /// Crear una ruta y sumar su distancia al vehículo. Devuelve la
    /// ruta y el kilometraje resultante.
    pub async fn create(
        &self,
        owner: Uuid,
        request: CreateRouteRequest,
    ) -> AppResult<(Route, f64)> {
        let vehicle = self
            .vehicles
            .require_active(owner, &request.vehicle_alias)
            .await?;

        let now = Utc::now();
        let route = Route {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            date: request.date.unwrap_or(now),
            distance: request.distance,
            notes: request.notes.unwrap_or_default(),
            owner,
            created_at: now,
            updated_at: now,
        };

        let route = self.store.insert_route(route).await;
        let total = self.ledger.record(owner, vehicle.id, route.distance).await?;
        Ok((route, total))
    }

    pub async fn list(
        &self,
        owner: Uuid,
        vehicle_alias: Option<&str>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Route>> {
        let vehicle = match vehicle_alias {
            Some(alias) => Some(self.vehicles.get_by_alias(owner, alias).await?.id),
            None => None,
        };
        Ok(self.store.list_routes(owner, vehicle, start, end).await)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<Route> {
        self.store
            .find_route(owner, id)
            .await
            .ok_or_else(|| AppError::NotFound("Ruta no encontrada".to_string()))
    }

    /// Actualizar una ruta reconciliando el ledger: cambio de vehículo
    /// mueve la distancia entera; cambio de distancia ajusta el delta.
    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateRouteRequest,
    ) -> AppResult<Route> {
        let mut route = self.get(owner, id).await?;
        let old_distance = route.distance;
        let new_distance = request.distance.unwrap_or(old_distance);

        let reassigned = request
            .vehicle_alias
            .as_deref()
            .map(canonical_alias)
            .filter(|alias| *alias != route.vehicle_alias);

        if let Some(new_alias) = reassigned {
            let new_vehicle = self
                .vehicles
                .require_active(owner, &new_alias)
                .await
                .map_err(|_| AppError::NotFound("Nuevo vehículo no encontrado".to_string()))?;

            self.ledger
                .transfer(owner, route.vehicle, new_vehicle.id, old_distance, new_distance)
                .await?;
            route.vehicle = new_vehicle.id;
            route.vehicle_alias = new_vehicle.alias;
        } else if new_distance != old_distance {
            self.ledger
                .amend(owner, route.vehicle, old_distance, new_distance)
                .await?;
        }

        route.distance = new_distance;
        if let Some(date) = request.date {
            route.date = date;
        }
        if let Some(notes) = request.notes {
            route.notes = notes;
        }
        route.updated_at = Utc::now();

        Ok(self.store.update_route(route).await)
    }

    /// Borrar una ruta y restar su distancia. Devuelve el kilometraje
    /// resultante del vehículo si este todavía existe.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> AppResult<Option<f64>> {
        let removed = self
            .store
            .delete_route(owner, id)
            .await
            .ok_or_else(|| AppError::NotFound("Ruta no encontrada".to_string()))?;

        match self.ledger.remove(owner, removed.vehicle, removed.distance).await {
            Ok(total) => Ok(Some(total)),
            // El vehículo pudo haber sido borrado; la ruta ya se fue igual
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
