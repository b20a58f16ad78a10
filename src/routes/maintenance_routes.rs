//! Rutas de mantenimientos

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde_json::json;
use validator::Validate;

use crate::middleware::auth::{auth_middleware, require_write, AuthUser};
use crate::models::maintenance::{
    CreateMaintenanceRequest, Maintenance, MaintenanceListQuery, UpdateMaintenanceRequest,
};
use crate::models::response::ApiResponse;
use crate::repositories::maintenance_repository::MaintenanceRepository;
use crate::routes::parse_id;
use crate::services::metrics;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::pagination::{pagination_data, Paging};
use crate::utils::validation::parse_date_param;

pub fn router(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_maintenance))
        .route("/upcoming", get(upcoming_maintenance))
        .route("/:id", get(get_maintenance));

    let write = Router::new()
        .route("/", post(create_maintenance))
        .route("/:id", put(update_maintenance).delete(delete_maintenance))
        .route_layer(from_fn(require_write));

    read.merge(write)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

async fn list_maintenance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<MaintenanceListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Maintenance>>>> {
    let start = match query.start_date.as_deref() {
        Some(raw) => Some(parse_date_param("startDate", raw)?),
        None => None,
    };
    let end = match query.end_date.as_deref() {
        Some(raw) => Some(parse_date_param("endDate", raw)?),
        None => None,
    };
    let paging = Paging::clamp(query.page, query.limit);

    let (records, total) = MaintenanceRepository::new(state.store.clone())
        .list(
            auth.id,
            query.vehicle_alias.as_deref(),
            query.tipo,
            start,
            end,
            paging,
        )
        .await?;

    Ok(Json(ApiResponse::paginated(
        records,
        pagination_data(total, paging),
    )))
}

async fn upcoming_maintenance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<Vec<Maintenance>>>> {
    let records = MaintenanceRepository::new(state.store.clone())
        .list_all(auth.id)
        .await;
    Ok(Json(ApiResponse::list(metrics::upcoming_maintenance(
        records,
    ))))
}

async fn get_maintenance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Maintenance>>> {
    let id = parse_id(&id)?;
    let record = MaintenanceRepository::new(state.store.clone())
        .get(auth.id, id)
        .await?;
    Ok(Json(ApiResponse::success(record)))
}

async fn create_maintenance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateMaintenanceRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let record = MaintenanceRepository::new(state.store.clone())
        .create(auth.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(record))))
}

async fn update_maintenance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateMaintenanceRequest>,
) -> AppResult<Json<ApiResponse<Maintenance>>> {
    payload.validate()?;

    let id = parse_id(&id)?;
    let record = MaintenanceRepository::new(state.store.clone())
        .update(auth.id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(record)))
}

async fn delete_maintenance(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    MaintenanceRepository::new(state.store.clone())
        .delete(auth.id, id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Mantenimiento eliminado correctamente",
    })))
}
