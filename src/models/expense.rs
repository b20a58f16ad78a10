//! Modelo de Expense
//!
//! Gastos no asociados a combustible ni mantenimiento. Soportan
//! recurrencia, deducibilidad de impuestos y borrado lógico.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Categoría de gasto - enumeración cerrada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Seguro")]
    Insurance,
    #[serde(rename = "Impuestos")]
    Taxes,
    #[serde(rename = "Registro")]
    Registration,
    #[serde(rename = "Estacionamiento")]
    Parking,
    #[serde(rename = "Peajes")]
    Tolls,
    #[serde(rename = "Lavado")]
    CarWash,
    #[serde(rename = "Multas")]
    Fines,
    #[serde(rename = "Financiamiento")]
    Financing,
    #[serde(rename = "Otro")]
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Insurance => "Seguro",
            ExpenseCategory::Taxes => "Impuestos",
            ExpenseCategory::Registration => "Registro",
            ExpenseCategory::Parking => "Estacionamiento",
            ExpenseCategory::Tolls => "Peajes",
            ExpenseCategory::CarWash => "Lavado",
            ExpenseCategory::Fines => "Multas",
            ExpenseCategory::Financing => "Financiamiento",
            ExpenseCategory::Other => "Otro",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frecuencia de recurrencia para gastos recurrentes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceFrequency {
    #[serde(rename = "Mensual")]
    Monthly,
    #[serde(rename = "Trimestral")]
    Quarterly,
    #[serde(rename = "Semestral")]
    Biannual,
    #[serde(rename = "Anual")]
    Annual,
}

/// Gasto registrado contra un vehículo
#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: Uuid,
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: String,
    pub vehicle: Uuid,
    #[serde(rename = "categoria")]
    pub category: ExpenseCategory,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "monto")]
    pub amount: f64,
    #[serde(rename = "fecha")]
    pub date: DateTime<Utc>,
    #[serde(rename = "esRecurrente")]
    pub is_recurring: bool,
    #[serde(rename = "frecuenciaRecurrencia")]
    pub recurrence_frequency: Option<RecurrenceFrequency>,
    #[serde(rename = "proximoPago")]
    pub next_payment: Option<DateTime<Utc>>,
    #[serde(rename = "esDeducibleImpuestos")]
    pub is_tax_deductible: bool,
    #[serde(rename = "notas")]
    pub notes: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub owner: Uuid,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Request para crear un gasto
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExpenseRequest {
    #[serde(rename = "vehicleAlias")]
    #[validate(length(min = 1, message = "El alias del vehículo es requerido"))]
    pub vehicle_alias: String,

    #[serde(rename = "categoria")]
    pub category: ExpenseCategory,

    #[serde(rename = "descripcion")]
    #[validate(length(min = 1, max = 500, message = "La descripción es requerida"))]
    pub description: String,

    #[serde(rename = "monto")]
    #[validate(range(min = 0.0, message = "El monto debe ser mayor o igual a 0"))]
    pub amount: f64,

    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "esRecurrente")]
    pub is_recurring: Option<bool>,

    #[serde(rename = "frecuenciaRecurrencia")]
    pub recurrence_frequency: Option<RecurrenceFrequency>,

    #[serde(rename = "proximoPago")]
    pub next_payment: Option<DateTime<Utc>>,

    #[serde(rename = "esDeducibleImpuestos")]
    pub is_tax_deductible: Option<bool>,

    #[serde(rename = "notas")]
    pub notes: Option<String>,
}

/// Request para actualizar un gasto
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExpenseRequest {
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: Option<String>,

    #[serde(rename = "categoria")]
    pub category: Option<ExpenseCategory>,

    #[serde(rename = "descripcion")]
    #[validate(length(min = 1, max = 500, message = "La descripción es requerida"))]
    pub description: Option<String>,

    #[serde(rename = "monto")]
    #[validate(range(min = 0.0, message = "El monto debe ser mayor o igual a 0"))]
    pub amount: Option<f64>,

    #[serde(rename = "fecha")]
    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "esRecurrente")]
    pub is_recurring: Option<bool>,

    #[serde(rename = "frecuenciaRecurrencia")]
    pub recurrence_frequency: Option<RecurrenceFrequency>,

    #[serde(rename = "proximoPago")]
    pub next_payment: Option<DateTime<Utc>>,

    #[serde(rename = "esDeducibleImpuestos")]
    pub is_tax_deductible: Option<bool>,

    #[serde(rename = "notas")]
    pub notes: Option<String>,
}

/// Filtros para listado de gastos
#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    #[serde(rename = "vehicleAlias")]
    pub vehicle_alias: Option<String>,
    pub categoria: Option<ExpenseCategory>,
    #[serde(rename = "esDeducibleImpuestos")]
    pub is_tax_deductible: Option<bool>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

/// Total agrupado por categoría para el resumen de gastos
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    #[serde(rename = "categoria")]
    pub category: ExpenseCategory,
    #[serde(rename = "totalMonto")]
    pub total: f64,
    #[serde(rename = "cantidad")]
    pub count: usize,
}
