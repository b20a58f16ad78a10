//! Almacén de documentos en memoria
//!
//! Una colección por entidad, protegida por su propio `RwLock`. Todas
//! las consultas sobre colecciones de un dueño reciben el `owner` y
//! filtran por él: un documento de otro dueño simplemente no existe
//! para el que consulta.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::expense::{Expense, ExpenseCategory};
use crate::models::maintenance::{Maintenance, MaintenanceType};
use crate::models::refuel::Refuel;
use crate::models::route::Route;
use crate::models::user::User;
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{AppError, AppResult};

/// Colecciones del sistema
#[derive(Default)]
pub struct Store {
    users: RwLock<HashMap<Uuid, User>>,
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
    routes: RwLock<HashMap<Uuid, Route>>,
    refuels: RwLock<HashMap<Uuid, Refuel>>,
    maintenance: RwLock<HashMap<Uuid, Maintenance>>,
    expenses: RwLock<HashMap<Uuid, Expense>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Usuarios ====================

    /// Insertar un usuario nuevo. Email y username son únicos globalmente.
    pub async fn create_user(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        for existing in users.values() {
            if existing.email.eq_ignore_ascii_case(&user.email) {
                return Err(AppError::Duplicate("email".to_string()));
            }
            if existing.username == user.username {
                return Err(AppError::Duplicate("nombre de usuario".to_string()));
            }
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn find_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    /// Reemplazar un usuario existente, re-chequeando unicidad contra
    /// todos los demás.
    pub async fn update_user(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(AppError::NotFound("Usuario no encontrado".to_string()));
        }
        for existing in users.values() {
            if existing.id == user.id {
                continue;
            }
            if existing.email.eq_ignore_ascii_case(&user.email) {
                return Err(AppError::Duplicate("email".to_string()));
            }
            if existing.username == user.username {
                return Err(AppError::Duplicate("nombre de usuario".to_string()));
            }
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn list_users(&self, is_active: Option<bool>) -> Vec<User> {
        let users = self.users.read().await;
        let mut result: Vec<User> = users
            .values()
            .filter(|u| is_active.map_or(true, |active| u.is_active == active))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    // ==================== Vehículos ====================

    /// Insertar un vehículo. El alias es único por dueño.
    pub async fn insert_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let mut vehicles = self.vehicles.write().await;
        let taken = vehicles
            .values()
            .any(|v| v.owner == vehicle.owner && v.alias == vehicle.alias);
        if taken {
            return Err(AppError::Duplicate("alias".to_string()));
        }
        vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    pub async fn find_vehicle(&self, owner: Uuid, id: Uuid) -> Option<Vehicle> {
        self.vehicles
            .read()
            .await
            .get(&id)
            .filter(|v| v.owner == owner)
            .cloned()
    }

    pub async fn find_vehicle_by_alias(&self, owner: Uuid, alias: &str) -> Option<Vehicle> {
        self.vehicles
            .read()
            .await
            .values()
            .find(|v| v.owner == owner && v.alias == alias)
            .cloned()
    }

    pub async fn list_vehicles(&self, owner: Uuid, is_active: Option<bool>) -> Vec<Vehicle> {
        let vehicles = self.vehicles.read().await;
        let mut result: Vec<Vehicle> = vehicles
            .values()
            .filter(|v| v.owner == owner)
            .filter(|v| is_active.map_or(true, |active| v.is_active == active))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    pub async fn update_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let mut vehicles = self.vehicles.write().await;
        if !vehicles.contains_key(&vehicle.id) {
            return Err(AppError::NotFound("Vehículo no encontrado".to_string()));
        }
        let taken = vehicles
            .values()
            .any(|v| v.id != vehicle.id && v.owner == vehicle.owner && v.alias == vehicle.alias);
        if taken {
            return Err(AppError::Duplicate("alias".to_string()));
        }
        vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    /// Ajustar atómicamente el kilometraje total de un vehículo.
    /// Toma el write lock una sola vez: leer-modificar-escribir sin
    /// ventana para lecturas intercaladas. Devuelve el total resultante.
    pub async fn adjust_total_odometer(
        &self,
        owner: Uuid,
        vehicle_id: Uuid,
        delta: f64,
    ) -> AppResult<f64> {
        let mut vehicles = self.vehicles.write().await;
        let vehicle = vehicles
            .get_mut(&vehicle_id)
            .filter(|v| v.owner == owner)
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
        vehicle.total_odometer += delta;
        vehicle.updated_at = Utc::now();
        Ok(vehicle.total_odometer)
    }

    // ==================== Rutas ====================

    pub async fn insert_route(&self, route: Route) -> Route {
        self.routes.write().await.insert(route.id, route.clone());
        route
    }

    pub async fn find_route(&self, owner: Uuid, id: Uuid) -> Option<Route> {
        self.routes
            .read()
            .await
            .get(&id)
            .filter(|r| r.owner == owner)
            .cloned()
    }

    pub async fn list_routes(
        &self,
        owner: Uuid,
        vehicle: Option<Uuid>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<Route> {
        let routes = self.routes.read().await;
        let mut result: Vec<Route> = routes
            .values()
            .filter(|r| r.owner == owner)
            .filter(|r| vehicle.map_or(true, |v| r.vehicle == v))
            .filter(|r| start.map_or(true, |s| r.date >= s))
            .filter(|r| end.map_or(true, |e| r.date <= e))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        result
    }

    pub async fn update_route(&self, route: Route) -> Route {
        self.routes.write().await.insert(route.id, route.clone());
        route
    }

    pub async fn delete_route(&self, owner: Uuid, id: Uuid) -> Option<Route> {
        let mut routes = self.routes.write().await;
        match routes.get(&id) {
            Some(r) if r.owner == owner => routes.remove(&id),
            _ => None,
        }
    }

    // ==================== Reabastecimientos ====================

    pub async fn insert_refuel(&self, refuel: Refuel) -> Refuel {
        self.refuels
            .write()
            .await
            .insert(refuel.id, refuel.clone());
        refuel
    }

    pub async fn find_refuel(&self, owner: Uuid, id: Uuid) -> Option<Refuel> {
        self.refuels
            .read()
            .await
            .get(&id)
            .filter(|r| r.owner == owner)
            .cloned()
    }

    /// Listar reabastecimientos con paginación. Devuelve la página y el
    /// total de documentos que matchean el filtro.
    pub async fn list_refuels(
        &self,
        owner: Uuid,
        vehicle: Option<Uuid>,
        skip: usize,
        limit: usize,
    ) -> (Vec<Refuel>, usize) {
        let refuels = self.refuels.read().await;
        let mut matching: Vec<Refuel> = refuels
            .values()
            .filter(|r| r.owner == owner)
            .filter(|r| vehicle.map_or(true, |v| r.vehicle == v))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        let total = matching.len();
        let page = matching.into_iter().skip(skip).take(limit).collect();
        (page, total)
    }

    pub async fn list_all_refuels(&self, owner: Uuid, vehicle: Option<Uuid>) -> Vec<Refuel> {
        let refuels = self.refuels.read().await;
        let mut result: Vec<Refuel> = refuels
            .values()
            .filter(|r| r.owner == owner)
            .filter(|r| vehicle.map_or(true, |v| r.vehicle == v))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        result
    }

    pub async fn update_refuel(&self, refuel: Refuel) -> Refuel {
        self.refuels
            .write()
            .await
            .insert(refuel.id, refuel.clone());
        refuel
    }

    pub async fn delete_refuel(&self, owner: Uuid, id: Uuid) -> Option<Refuel> {
        let mut refuels = self.refuels.write().await;
        match refuels.get(&id) {
            Some(r) if r.owner == owner => refuels.remove(&id),
            _ => None,
        }
    }

    // ==================== Mantenimientos ====================

    pub async fn insert_maintenance(&self, record: Maintenance) -> Maintenance {
        self.maintenance
            .write()
            .await
            .insert(record.id, record.clone());
        record
    }

    pub async fn find_maintenance(&self, owner: Uuid, id: Uuid) -> Option<Maintenance> {
        self.maintenance
            .read()
            .await
            .get(&id)
            .filter(|m| m.owner == owner)
            .cloned()
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn list_maintenance(
        &self,
        owner: Uuid,
        vehicle: Option<Uuid>,
        maintenance_type: Option<MaintenanceType>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        skip: usize,
        limit: usize,
    ) -> (Vec<Maintenance>, usize) {
        let records = self.maintenance.read().await;
        let mut matching: Vec<Maintenance> = records
            .values()
            .filter(|m| m.owner == owner)
            .filter(|m| vehicle.map_or(true, |v| m.vehicle == v))
            .filter(|m| maintenance_type.map_or(true, |t| m.maintenance_type == t))
            .filter(|m| start.map_or(true, |s| m.date >= s))
            .filter(|m| end.map_or(true, |e| m.date <= e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date.cmp(&a.date));
        let total = matching.len();
        let page = matching.into_iter().skip(skip).take(limit).collect();
        (page, total)
    }

    pub async fn list_all_maintenance(
        &self,
        owner: Uuid,
        vehicle: Option<Uuid>,
    ) -> Vec<Maintenance> {
        let records = self.maintenance.read().await;
        let mut result: Vec<Maintenance> = records
            .values()
            .filter(|m| m.owner == owner)
            .filter(|m| vehicle.map_or(true, |v| m.vehicle == v))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        result
    }

    pub async fn update_maintenance(&self, record: Maintenance) -> Maintenance {
        self.maintenance
            .write()
            .await
            .insert(record.id, record.clone());
        record
    }

    pub async fn delete_maintenance(&self, owner: Uuid, id: Uuid) -> Option<Maintenance> {
        let mut records = self.maintenance.write().await;
        match records.get(&id) {
            Some(m) if m.owner == owner => records.remove(&id),
            _ => None,
        }
    }

    // ==================== Gastos ====================

    pub async fn insert_expense(&self, expense: Expense) -> Expense {
        self.expenses
            .write()
            .await
            .insert(expense.id, expense.clone());
        expense
    }

    pub async fn find_expense(&self, owner: Uuid, id: Uuid) -> Option<Expense> {
        self.expenses
            .read()
            .await
            .get(&id)
            .filter(|e| e.owner == owner)
            .cloned()
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn list_expenses(
        &self,
        owner: Uuid,
        vehicle: Option<Uuid>,
        category: Option<ExpenseCategory>,
        is_tax_deductible: Option<bool>,
        is_active: Option<bool>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Vec<Expense> {
        let expenses = self.expenses.read().await;
        let mut result: Vec<Expense> = expenses
            .values()
            .filter(|e| e.owner == owner)
            .filter(|e| vehicle.map_or(true, |v| e.vehicle == v))
            .filter(|e| category.map_or(true, |c| e.category == c))
            .filter(|e| is_tax_deductible.map_or(true, |d| e.is_tax_deductible == d))
            .filter(|e| is_active.map_or(true, |a| e.is_active == a))
            .filter(|e| start.map_or(true, |s| e.date >= s))
            .filter(|e| end.map_or(true, |end| e.date <= end))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        result
    }

    pub async fn update_expense(&self, expense: Expense) -> Expense {
        self.expenses
            .write()
            .await
            .insert(expense.id, expense.clone());
        expense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;

    fn sample_user(email: &str, username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Write,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_vehicle(owner: Uuid, alias: &str) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            alias: alias.to_string(),
            make: "Toyota".to_string(),
            model_year: 2020,
            plates: None,
            initial_odometer: 1000.0,
            total_odometer: 1000.0,
            owner,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = Store::new();
        store
            .create_user(sample_user("ana@example.com", "ana"))
            .await
            .unwrap();
        let result = store
            .create_user(sample_user("ANA@example.com", "otra"))
            .await;
        assert!(matches!(result, Err(AppError::Duplicate(f)) if f == "email"));
    }

    #[tokio::test]
    async fn test_alias_unique_per_owner_only() {
        let store = Store::new();
        let owner_a = Uuid::new_v4();
        let owner_b = Uuid::new_v4();

        store
            .insert_vehicle(sample_vehicle(owner_a, "CAR1"))
            .await
            .unwrap();
        // Mismo alias, otro dueño: permitido
        store
            .insert_vehicle(sample_vehicle(owner_b, "CAR1"))
            .await
            .unwrap();
        // Mismo alias, mismo dueño: rechazado
        let result = store.insert_vehicle(sample_vehicle(owner_a, "CAR1")).await;
        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_adjust_total_odometer() {
        let store = Store::new();
        let owner = Uuid::new_v4();
        let vehicle = store
            .insert_vehicle(sample_vehicle(owner, "CAR1"))
            .await
            .unwrap();

        let total = store
            .adjust_total_odometer(owner, vehicle.id, 250.0)
            .await
            .unwrap();
        assert_eq!(total, 1250.0);

        let total = store
            .adjust_total_odometer(owner, vehicle.id, -250.0)
            .await
            .unwrap();
        assert_eq!(total, 1000.0);

        // Otro dueño no puede tocar el vehículo
        let result = store
            .adjust_total_odometer(Uuid::new_v4(), vehicle.id, 10.0)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ownership_isolation_on_find() {
        let store = Store::new();
        let owner = Uuid::new_v4();
        let vehicle = store
            .insert_vehicle(sample_vehicle(owner, "CAR1"))
            .await
            .unwrap();

        assert!(store.find_vehicle(owner, vehicle.id).await.is_some());
        assert!(store
            .find_vehicle(Uuid::new_v4(), vehicle.id)
            .await
            .is_none());
    }
}
