//! Ledger de odómetro
//!
//! Único punto que toca `kilometrajeTotal` de un vehículo. Cada
//! distancia de ruta se refleja exactamente una vez en el total de su
//! vehículo; crear, corregir, mover o borrar una ruta reconcilia el
//! total por el delta correspondiente.

use std::sync::Arc;

use uuid::Uuid;

use crate::store::Store;
use crate::utils::errors::AppResult;

pub struct OdometerLedger {
    store: Arc<Store>,
}

impl OdometerLedger {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Registrar una ruta nueva: sumar su distancia al total del
    /// vehículo. Devuelve el total resultante.
    pub async fn record(&self, owner: Uuid, vehicle: Uuid, distance: f64) -> AppResult<f64> {
        self.store
            .adjust_total_odometer(owner, vehicle, distance)
            .await
    }

    /// Corregir la distancia de una ruta existente sobre el mismo
    /// vehículo: ajustar por el delta.
    pub async fn amend(
        &self,
        owner: Uuid,
        vehicle: Uuid,
        old_distance: f64,
        new_distance: f64,
    ) -> AppResult<f64> {
        self.store
            .adjust_total_odometer(owner, vehicle, new_distance - old_distance)
            .await
    }

    /// Mover una ruta de un vehículo a otro: restar la distancia vieja
    /// del origen y sumar la nueva al destino. Devuelve el total del
    /// vehículo destino.
    pub async fn transfer(
        &self,
        owner: Uuid,
        from_vehicle: Uuid,
        to_vehicle: Uuid,
        old_distance: f64,
        new_distance: f64,
    ) -> AppResult<f64> {
        self.store
            .adjust_total_odometer(owner, from_vehicle, -old_distance)
            .await?;
        self.store
            .adjust_total_odometer(owner, to_vehicle, new_distance)
            .await
    }

    /// Borrar una ruta: restar su distancia del total del vehículo.
    pub async fn remove(&self, owner: Uuid, vehicle: Uuid, distance: f64) -> AppResult<f64> {
        self.store
            .adjust_total_odometer(owner, vehicle, -distance)
            .await
    }
}
