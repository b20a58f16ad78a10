//! Repositorio de gastos

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::expense::{
    CreateExpenseRequest, Expense, ExpenseCategory, UpdateExpenseRequest,
};
use crate::models::vehicle::canonical_alias;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::store::Store;
use crate::utils::errors::{AppError, AppResult};

/// Filtros del listado de gastos ya resueltos a tipos de dominio
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpenseFilter {
    pub category: Option<ExpenseCategory>,
    pub is_tax_deductible: Option<bool>,
    pub is_active: Option<bool>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

pub struct ExpenseRepository {
    store: Arc<Store>,
    vehicles: VehicleRepository,
}

impl ExpenseRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            vehicles: VehicleRepository::new(store.clone()),
            store,
        }
    }

    pub async fn create(&self, owner: Uuid, request: CreateExpenseRequest) -> AppResult<Expense> {
        let vehicle = self
            .vehicles
            .require_active(owner, &request.vehicle_alias)
            .await?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            category: request.category,
            description: request.description,
            amount: request.amount,
            date: request.date.unwrap_or(now),
            is_recurring: request.is_recurring.unwrap_or(false),
            recurrence_frequency: request.recurrence_frequency,
            next_payment: request.next_payment,
            is_tax_deductible: request.is_tax_deductible.unwrap_or(false),
            notes: request.notes,
            is_active: true,
            owner,
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert_expense(expense).await)
    }

    /// Listado con filtros. El alias admite vehículos inactivos, igual
    /// que el historial de mantenimientos.
    pub async fn list(
        &self,
        owner: Uuid,
        vehicle_alias: Option<&str>,
        filter: ExpenseFilter,
    ) -> AppResult<Vec<Expense>> {
        let vehicle = match vehicle_alias {
            Some(alias) => Some(self.vehicles.get_by_alias(owner, alias).await?.id),
            None => None,
        };
        Ok(self
            .store
            .list_expenses(
                owner,
                vehicle,
                filter.category,
                filter.is_tax_deductible,
                filter.is_active,
                filter.start,
                filter.end,
            )
            .await)
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> AppResult<Expense> {
        self.store
            .find_expense(owner, id)
            .await
            .ok_or_else(|| AppError::NotFound("Gasto no encontrado".to_string()))
    }

    pub async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        request: UpdateExpenseRequest,
    ) -> AppResult<Expense> {
        let mut expense = self.get(owner, id).await?;

        if let Some(alias) = request.vehicle_alias {
            let alias = canonical_alias(&alias);
            if alias != expense.vehicle_alias {
                let vehicle = self
                    .vehicles
                    .require_active(owner, &alias)
                    .await
                    .map_err(|_| {
                        AppError::NotFound("Nuevo vehículo no encontrado".to_string())
                    })?;
                expense.vehicle = vehicle.id;
                expense.vehicle_alias = vehicle.alias;
            }
        }
        if let Some(category) = request.category {
            expense.category = category;
        }
        if let Some(description) = request.description {
            expense.description = description;
        }
        if let Some(amount) = request.amount {
            expense.amount = amount;
        }
        if let Some(date) = request.date {
            expense.date = date;
        }
        if let Some(is_recurring) = request.is_recurring {
            expense.is_recurring = is_recurring;
        }
        if let Some(frequency) = request.recurrence_frequency {
            expense.recurrence_frequency = Some(frequency);
        }
        if let Some(next_payment) = request.next_payment {
            expense.next_payment = Some(next_payment);
        }
        if let Some(deductible) = request.is_tax_deductible {
            expense.is_tax_deductible = deductible;
        }
        if let Some(notes) = request.notes {
            expense.notes = Some(notes);
        }
        expense.updated_at = Utc::now();

        Ok(self.store.update_expense(expense).await)
    }

    /// Borrado lógico. Idempotente.
    pub async fn soft_delete(&self, owner: Uuid, id: Uuid) -> AppResult<Expense> {
        let mut expense = self.get(owner, id).await?;
        expense.is_active = false;
        expense.updated_at = Utc::now();
        Ok(self.store.update_expense(expense).await)
    }
}
