//! Agregador de métricas
//!
//! Funciones puras sobre los documentos ya cargados. La aritmética
//! interna usa precisión completa; el redondeo a dos decimales ocurre
//! recién al armar la respuesta.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::expense::{CategorySummary, Expense};
use crate::models::maintenance::Maintenance;
use crate::models::refuel::Refuel;
use crate::models::route::Route;
use crate::models::vehicle::{Vehicle, VehicleSummary};

/// Factor de conversión galón a litros
pub const GALLON_TO_LITERS: f64 = 3.78541;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ==================== Análisis de combustible ====================

/// Acumulado por tipo de combustible
#[derive(Debug, Default, Serialize)]
pub struct FuelTypeBreakdown {
    pub cantidad: usize,
    pub gasto: f64,
    pub galones: f64,
}

#[derive(Debug, Serialize)]
pub struct FuelAnalysisSummary {
    #[serde(rename = "totalReabastecimientos")]
    pub total_refuels: usize,
    #[serde(rename = "totalGastado")]
    pub total_spent: String,
    #[serde(rename = "totalGalones")]
    pub total_gallons: String,
    #[serde(rename = "promedioGalonPrice")]
    pub average_gallon_price: String,
}

#[derive(Debug, Serialize)]
pub struct FuelAnalysis {
    pub vehicle: VehicleSummary,
    pub summary: FuelAnalysisSummary,
    #[serde(rename = "porTipoCombustible")]
    pub by_fuel_type: BTreeMap<&'static str, FuelTypeBreakdown>,
}

/// Análisis de consumo de un vehículo: totales y desglose por tipo.
pub fn fuel_analysis(vehicle: &Vehicle, refuels: &[Refuel]) -> FuelAnalysis {
    let total_spent: f64 = refuels.iter().map(|r| r.amount_spent).sum();
    let total_gallons: f64 = refuels.iter().filter_map(|r| r.gallons).sum();
    let average = if total_gallons > 0.0 {
        total_spent / total_gallons
    } else {
        0.0
    };

    let mut by_fuel_type: BTreeMap<&'static str, FuelTypeBreakdown> = BTreeMap::new();
    for refuel in refuels {
        let entry = by_fuel_type.entry(refuel.fuel_type.as_str()).or_default();
        entry.cantidad += 1;
        entry.gasto += refuel.amount_spent;
        entry.galones += refuel.gallons.unwrap_or(0.0);
    }

    FuelAnalysis {
        vehicle: VehicleSummary::from(vehicle),
        summary: FuelAnalysisSummary {
            total_refuels: refuels.len(),
            total_spent: format!("{:.2}", total_spent),
            total_gallons: format!("{:.2}", total_gallons),
            average_gallon_price: format!("{:.2}", average),
        },
        by_fuel_type,
    }
}

// ==================== Eficiencia de combustible ====================

#[derive(Debug, Serialize)]
pub struct EfficiencyFigures {
    #[serde(rename = "kmPorLitro")]
    pub km_per_liter: f64,
    #[serde(rename = "kmPorGalon")]
    pub km_per_gallon: f64,
    #[serde(rename = "costoPorKm")]
    pub cost_per_km: f64,
    #[serde(rename = "totalDistancia")]
    pub total_distance: f64,
    #[serde(rename = "totalGalones")]
    pub total_gallons: f64,
    #[serde(rename = "totalGastoCombustible")]
    pub total_fuel_spend: f64,
}

#[derive(Debug, Serialize)]
pub struct EfficiencyPeriod {
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    #[serde(rename = "totalRefuels")]
    pub total_refuels: usize,
    #[serde(rename = "totalRoutes")]
    pub total_routes: usize,
}

#[derive(Debug, Serialize)]
pub struct FuelEfficiency {
    pub vehicle: VehicleSummary,
    pub efficiency: EfficiencyFigures,
    pub period: EfficiencyPeriod,
}

/// Eficiencia de combustible sobre un rango de fechas opcional.
/// Divisiones con denominador cero devuelven 0.
pub fn fuel_efficiency(
    vehicle: &Vehicle,
    refuels: &[Refuel],
    routes: &[Route],
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> FuelEfficiency {
    let total_gallons: f64 = refuels.iter().filter_map(|r| r.gallons).sum();
    let total_distance: f64 = routes.iter().map(|r| r.distance).sum();
    let total_fuel_spend: f64 = refuels.iter().map(|r| r.amount_spent).sum();

    let km_per_liter = if total_gallons > 0.0 {
        round2(total_distance / (total_gallons * GALLON_TO_LITERS))
    } else {
        0.0
    };
    let km_per_gallon = if total_gallons > 0.0 {
        round2(total_distance / total_gallons)
    } else {
        0.0
    };
    let cost_per_km = if total_distance > 0.0 {
        round2(total_fuel_spend / total_distance)
    } else {
        0.0
    };

    FuelEfficiency {
        vehicle: VehicleSummary::from(vehicle),
        efficiency: EfficiencyFigures {
            km_per_liter,
            km_per_gallon,
            cost_per_km,
            total_distance,
            total_gallons,
            total_fuel_spend,
        },
        period: EfficiencyPeriod {
            start_date: start_date.unwrap_or("Inicio").to_string(),
            end_date: end_date.unwrap_or("Presente").to_string(),
            total_refuels: refuels.len(),
            total_routes: routes.len(),
        },
    }
}

// ==================== Estadísticas completas ====================

#[derive(Debug, Serialize)]
pub struct StatsVehicleInfo {
    pub alias: String,
    pub marca: String,
    pub modelo: i32,
    pub plates: Option<String>,
    #[serde(rename = "kilometrajeInicial")]
    pub initial_odometer: f64,
    #[serde(rename = "kilometrajeTotal")]
    pub total_odometer: f64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

impl From<&Vehicle> for StatsVehicleInfo {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            alias: vehicle.alias.clone(),
            marca: vehicle.make.clone(),
            modelo: vehicle.model_year,
            plates: vehicle.plates.clone(),
            initial_odometer: vehicle.initial_odometer,
            total_odometer: vehicle.total_odometer,
            is_active: vehicle.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsCounts {
    #[serde(rename = "totalRoutes")]
    pub total_routes: usize,
    #[serde(rename = "totalRefuels")]
    pub total_refuels: usize,
    #[serde(rename = "totalMaintenances")]
    pub total_maintenances: usize,
    #[serde(rename = "totalExpenses")]
    pub total_expenses: usize,
    #[serde(rename = "totalDistancia")]
    pub total_distance: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsCosts {
    pub combustible: f64,
    pub mantenimiento: f64,
    #[serde(rename = "gastosOtros")]
    pub other_expenses: f64,
    pub total: f64,
    #[serde(rename = "costoPorKm")]
    pub cost_per_km: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsEfficiency {
    #[serde(rename = "kmPorLitro")]
    pub km_per_liter: f64,
    #[serde(rename = "kmPorGalon")]
    pub km_per_gallon: f64,
    #[serde(rename = "promedioDistanciaPorRuta")]
    pub average_distance_per_route: f64,
}

#[derive(Debug, Serialize)]
pub struct VehicleStats {
    pub vehicle: StatsVehicleInfo,
    pub statistics: StatsCounts,
    pub costs: StatsCosts,
    pub efficiency: StatsEfficiency,
}

/// Estadísticas completas de un vehículo: conteos, costos de operación
/// y eficiencia.
pub fn vehicle_stats(
    vehicle: &Vehicle,
    routes: &[Route],
    refuels: &[Refuel],
    maintenance: &[Maintenance],
    expenses: &[Expense],
) -> VehicleStats {
    let total_distance: f64 = routes.iter().map(|r| r.distance).sum();
    let fuel_spend: f64 = refuels.iter().map(|r| r.amount_spent).sum();
    let maintenance_cost: f64 = maintenance.iter().map(|m| m.cost).sum();
    let other_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let total_gallons: f64 = refuels.iter().filter_map(|r| r.gallons).sum();

    let total_cost = fuel_spend + maintenance_cost + other_expenses;
    let cost_per_km = if total_distance > 0.0 {
        round2(total_cost / total_distance)
    } else {
        0.0
    };
    let km_per_liter = if total_gallons > 0.0 {
        round2(total_distance / (total_gallons * GALLON_TO_LITERS))
    } else {
        0.0
    };
    let km_per_gallon = if total_gallons > 0.0 {
        round2(total_distance / total_gallons)
    } else {
        0.0
    };
    let average_distance = if routes.is_empty() {
        0.0
    } else {
        round2(total_distance / routes.len() as f64)
    };

    VehicleStats {
        vehicle: StatsVehicleInfo::from(vehicle),
        statistics: StatsCounts {
            total_routes: routes.len(),
            total_refuels: refuels.len(),
            total_maintenances: maintenance.len(),
            total_expenses: expenses.len(),
            total_distance: round2(total_distance),
        },
        costs: StatsCosts {
            combustible: round2(fuel_spend),
            mantenimiento: round2(maintenance_cost),
            other_expenses: round2(other_expenses),
            total: round2(total_cost),
            cost_per_km,
        },
        efficiency: StatsEfficiency {
            km_per_liter,
            km_per_gallon,
            average_distance_per_route: average_distance,
        },
    }
}

// ==================== Resumen de gastos ====================

#[derive(Debug, Serialize)]
pub struct ExpenseSummary {
    pub summary: Vec<CategorySummary>,
    #[serde(rename = "totalGastos")]
    pub total: f64,
    #[serde(rename = "categorias")]
    pub categories: usize,
}

/// Agrupar gastos por categoría, ordenado por monto descendente.
pub fn expense_summary(expenses: &[Expense]) -> ExpenseSummary {
    let mut grouped: BTreeMap<_, (f64, usize)> = BTreeMap::new();
    for expense in expenses {
        let entry = grouped.entry(expense.category).or_insert((0.0, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    let mut summary: Vec<CategorySummary> = grouped
        .into_iter()
        .map(|(category, (total, count))| CategorySummary {
            category,
            total,
            count,
        })
        .collect();
    summary.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(std::cmp::Ordering::Equal));

    let total = summary.iter().map(|c| c.total).sum();
    let categories = summary.len();
    ExpenseSummary {
        summary,
        total,
        categories,
    }
}

// ==================== Próximos ====================

/// Gastos recurrentes con próximo pago dentro de los 30 días a partir
/// de `now`, ordenados por fecha de pago ascendente.
pub fn upcoming_expenses(expenses: Vec<Expense>, now: DateTime<Utc>) -> Vec<Expense> {
    let horizon = now + Duration::days(30);
    let mut upcoming: Vec<Expense> = expenses
        .into_iter()
        .filter(|e| e.is_active && e.is_recurring)
        .filter(|e| {
            e.next_payment
                .map_or(false, |p| p >= now && p <= horizon)
        })
        .collect();
    upcoming.sort_by_key(|e| e.next_payment);
    upcoming
}

/// Mantenimientos con un próximo servicio programado (por fecha o por
/// kilometraje), ordenados por fecha ascendente; sin fecha van al final.
pub fn upcoming_maintenance(records: Vec<Maintenance>) -> Vec<Maintenance> {
    let mut upcoming: Vec<Maintenance> = records
        .into_iter()
        .filter(|m| m.next_service_date.is_some() || m.next_service_km.is_some())
        .collect();
    upcoming.sort_by(|a, b| match (a.next_service_date, b.next_service_date) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::{ExpenseCategory, RecurrenceFrequency};
    use crate::models::maintenance::MaintenanceType;
    use crate::models::refuel::FuelType;
    use uuid::Uuid;

    fn sample_vehicle() -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            alias: "CAR1".to_string(),
            make: "Toyota".to_string(),
            model_year: 2020,
            plates: None,
            initial_odometer: 1000.0,
            total_odometer: 1000.0,
            owner: Uuid::new_v4(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn refuel(vehicle: &Vehicle, amount: f64, gallons: Option<f64>, fuel_type: FuelType) -> Refuel {
        Refuel {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            fuel_type,
            amount_spent: amount,
            gallons,
            date: Utc::now(),
            owner: vehicle.owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn route(vehicle: &Vehicle, distance: f64) -> Route {
        Route {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            date: Utc::now(),
            distance,
            notes: String::new(),
            owner: vehicle.owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn expense(
        vehicle: &Vehicle,
        category: ExpenseCategory,
        amount: f64,
        next_payment: Option<DateTime<Utc>>,
    ) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            category,
            description: "gasto".to_string(),
            amount,
            date: Utc::now(),
            is_recurring: next_payment.is_some(),
            recurrence_frequency: next_payment.map(|_| RecurrenceFrequency::Monthly),
            next_payment,
            is_tax_deductible: false,
            notes: None,
            is_active: true,
            owner: vehicle.owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fuel_analysis_totals() {
        let vehicle = sample_vehicle();
        let refuels = vec![
            refuel(&vehicle, 500.0, Some(10.0), FuelType::Regular),
            refuel(&vehicle, 600.0, Some(10.0), FuelType::Regular),
        ];

        let analysis = fuel_analysis(&vehicle, &refuels);
        assert_eq!(analysis.summary.total_refuels, 2);
        assert_eq!(analysis.summary.total_spent, "1100.00");
        assert_eq!(analysis.summary.total_gallons, "20.00");
        assert_eq!(analysis.summary.average_gallon_price, "55.00");

        let regular = &analysis.by_fuel_type["Regular"];
        assert_eq!(regular.cantidad, 2);
        assert_eq!(regular.gasto, 1100.0);
    }

    #[test]
    fn test_fuel_analysis_empty_is_zero() {
        let vehicle = sample_vehicle();
        let analysis = fuel_analysis(&vehicle, &[]);
        assert_eq!(analysis.summary.average_gallon_price, "0.00");
        assert!(analysis.by_fuel_type.is_empty());
    }

    #[test]
    fn test_fuel_efficiency_zero_safe() {
        let vehicle = sample_vehicle();
        let result = fuel_efficiency(&vehicle, &[], &[], None, None);
        assert_eq!(result.efficiency.km_per_liter, 0.0);
        assert_eq!(result.efficiency.km_per_gallon, 0.0);
        assert_eq!(result.efficiency.cost_per_km, 0.0);
        assert_eq!(result.period.start_date, "Inicio");
        assert_eq!(result.period.end_date, "Presente");
    }

    #[test]
    fn test_fuel_efficiency_liters_conversion() {
        let vehicle = sample_vehicle();
        let refuels = vec![refuel(&vehicle, 500.0, Some(10.0), FuelType::Regular)];
        let routes = vec![route(&vehicle, 378.541)];

        let result = fuel_efficiency(&vehicle, &refuels, &routes, None, None);
        assert_eq!(result.efficiency.km_per_liter, 10.0);
        assert_eq!(result.efficiency.km_per_gallon, 37.85);
    }

    #[test]
    fn test_vehicle_stats_costs() {
        let vehicle = sample_vehicle();
        let routes = vec![route(&vehicle, 100.0), route(&vehicle, 300.0)];
        let refuels = vec![refuel(&vehicle, 500.0, Some(10.0), FuelType::Regular)];
        let maintenance = vec![Maintenance {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            maintenance_type: MaintenanceType::OilChange,
            description: "cambio".to_string(),
            cost: 300.0,
            odometer: 12_000.0,
            date: Utc::now(),
            provider: None,
            next_service_date: None,
            next_service_km: None,
            notes: None,
            owner: vehicle.owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }];
        let expenses = vec![expense(&vehicle, ExpenseCategory::Insurance, 200.0, None)];

        let stats = vehicle_stats(&vehicle, &routes, &refuels, &maintenance, &expenses);
        assert_eq!(stats.costs.total, 1000.0);
        assert_eq!(stats.costs.cost_per_km, 2.5);
        assert_eq!(stats.efficiency.average_distance_per_route, 200.0);
        assert_eq!(stats.statistics.total_distance, 400.0);
    }

    #[test]
    fn test_expense_summary_sorted_desc() {
        let vehicle = sample_vehicle();
        let expenses = vec![
            expense(&vehicle, ExpenseCategory::Insurance, 100.0, None),
            expense(&vehicle, ExpenseCategory::Tolls, 50.0, None),
            expense(&vehicle, ExpenseCategory::Tolls, 300.0, None),
        ];

        let summary = expense_summary(&expenses);
        assert_eq!(summary.categories, 2);
        assert_eq!(summary.total, 450.0);
        assert_eq!(summary.summary[0].category, ExpenseCategory::Tolls);
        assert_eq!(summary.summary[0].total, 350.0);
        assert_eq!(summary.summary[0].count, 2);
    }

    #[test]
    fn test_upcoming_expenses_window() {
        let vehicle = sample_vehicle();
        let now = Utc::now();
        let inside = expense(
            &vehicle,
            ExpenseCategory::Insurance,
            100.0,
            Some(now + Duration::days(10)),
        );
        let outside = expense(
            &vehicle,
            ExpenseCategory::Taxes,
            100.0,
            Some(now + Duration::days(45)),
        );
        let not_recurring = expense(&vehicle, ExpenseCategory::Tolls, 100.0, None);

        let upcoming = upcoming_expenses(vec![outside, inside.clone(), not_recurring], now);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].id, inside.id);
    }

    #[test]
    fn test_upcoming_maintenance_none_date_sorts_last() {
        let vehicle = sample_vehicle();
        let base = Maintenance {
            id: Uuid::new_v4(),
            vehicle_alias: vehicle.alias.clone(),
            vehicle: vehicle.id,
            maintenance_type: MaintenanceType::Brakes,
            description: "frenos".to_string(),
            cost: 100.0,
            odometer: 12_000.0,
            date: Utc::now(),
            provider: None,
            next_service_date: None,
            next_service_km: None,
            notes: None,
            owner: vehicle.owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let by_km = Maintenance {
            id: Uuid::new_v4(),
            next_service_km: Some(15000.0),
            ..base.clone()
        };
        let by_date = Maintenance {
            id: Uuid::new_v4(),
            next_service_date: Some(Utc::now() + Duration::days(5)),
            ..base.clone()
        };
        let unscheduled = base;

        let upcoming = upcoming_maintenance(vec![by_km.clone(), unscheduled, by_date.clone()]);
        assert_eq!(upcoming.len(), 2);
        assert_eq!(upcoming[0].id, by_date.id);
        assert_eq!(upcoming[1].id, by_km.id);
    }
}
