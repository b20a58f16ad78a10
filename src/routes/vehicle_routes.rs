//! Rutas de vehículos
//!
//! Los vehículos se direccionan por alias, no por id. Las escrituras
//! pasan por el role gate de escritura.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, patch, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::middleware::auth::{auth_middleware, require_write, AuthUser};
use crate::models::response::ApiResponse;
use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, Vehicle, VehicleListQuery,
};
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::metrics::{self, FuelEfficiency, VehicleStats};
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::validation::parse_date_param;

pub fn router(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_vehicles))
        .route("/:alias", get(get_vehicle))
        .route("/:alias/fuel-efficiency", get(fuel_efficiency))
        .route("/:alias/stats", get(vehicle_stats));

    let write = Router::new()
        .route("/", post(create_vehicle))
        .route("/:alias", put(update_vehicle).delete(delete_vehicle))
        .route("/:alias/reactivate", patch(reactivate_vehicle))
        .route_layer(from_fn(require_write));

    read.merge(write)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<VehicleListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Vehicle>>>> {
    let vehicles = VehicleRepository::new(state.store.clone())
        .list(auth.id, query.is_active)
        .await;
    Ok(Json(ApiResponse::list(vehicles)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(alias): Path<String>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let vehicle = VehicleRepository::new(state.store.clone())
        .get_by_alias(auth.id, &alias)
        .await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let vehicle = VehicleRepository::new(state.store.clone())
        .create(auth.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle))))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(alias): Path<String>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    payload.validate()?;

    let vehicle = VehicleRepository::new(state.store.clone())
        .update(auth.id, &alias, payload)
        .await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(alias): Path<String>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let vehicle = VehicleRepository::new(state.store.clone())
        .soft_delete(auth.id, &alias)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        "Vehículo desactivado correctamente",
        vehicle,
    )))
}

async fn reactivate_vehicle(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(alias): Path<String>,
) -> AppResult<Json<ApiResponse<Vehicle>>> {
    let vehicle = VehicleRepository::new(state.store.clone())
        .reactivate(auth.id, &alias)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        "Vehículo reactivado correctamente",
        vehicle,
    )))
}

#[derive(Debug, Deserialize)]
struct DateRangeQuery {
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

async fn fuel_efficiency(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(alias): Path<String>,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<ApiResponse<FuelEfficiency>>> {
    let vehicle = VehicleRepository::new(state.store.clone())
        .get_by_alias(auth.id, &alias)
        .await?;

    let start = match query.start_date.as_deref() {
        Some(raw) => Some(parse_date_param("startDate", raw)?),
        None => None,
    };
    let end = match query.end_date.as_deref() {
        Some(raw) => Some(parse_date_param("endDate", raw)?),
        None => None,
    };

    let refuels: Vec<_> = state
        .store
        .list_all_refuels(auth.id, Some(vehicle.id))
        .await
        .into_iter()
        .filter(|r| start.map_or(true, |s| r.date >= s))
        .filter(|r| end.map_or(true, |e| r.date <= e))
        .collect();
    let routes = state
        .store
        .list_routes(auth.id, Some(vehicle.id), start, end)
        .await;

    let result = metrics::fuel_efficiency(
        &vehicle,
        &refuels,
        &routes,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    );
    Ok(Json(ApiResponse::success(result)))
}

async fn vehicle_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(alias): Path<String>,
) -> AppResult<Json<ApiResponse<VehicleStats>>> {
    let vehicle = VehicleRepository::new(state.store.clone())
        .get_by_alias(auth.id, &alias)
        .await?;

    let routes = state
        .store
        .list_routes(auth.id, Some(vehicle.id), None, None)
        .await;
    let refuels = state
        .store
        .list_all_refuels(auth.id, Some(vehicle.id))
        .await;
    let maintenance = state
        .store
        .list_all_maintenance(auth.id, Some(vehicle.id))
        .await;
    let expenses = state
        .store
        .list_expenses(
            auth.id,
            Some(vehicle.id),
            None,
            None,
            Some(true),
            None,
            None,
        )
        .await;

    let stats = metrics::vehicle_stats(&vehicle, &routes, &refuels, &maintenance, &expenses);
    Ok(Json(ApiResponse::success(stats)))
}
