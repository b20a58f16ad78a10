//! Rutas de reabastecimientos

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
use crate::models::refuel::{
    CreateRefuelRequest, RefuelListQuery, RefuelResponse, UpdateRefuelRequest,
};
use crate::models::response::ApiResponse;
use crate::repositories::refuel_repository::RefuelRepository;
use crate::routes::parse_id;
use crate::services::metrics::{self, FuelAnalysis};
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::pagination::{pagination_data, Paging};

pub fn router(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_refuels))
        .route("/vehicle/:alias/analysis", get(fuel_analysis))
        .route("/:id", get(get_refuel));

    let write = Router::new()
        .route("/", post(create_refuel))
        .route("/:id", put(update_refuel).delete(delete_refuel))
        .route_layer(from_fn(require_write));

    read.merge(write)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

async fn list_refuels(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<RefuelListQuery>,
) -> AppResult<Json<ApiResponse<Vec<RefuelResponse>>>> {
    let paging = Paging::clamp(query.page, query.limit);
    let (refuels, total) = RefuelRepository::new(state.store.clone())
        .list(auth.id, query.vehicle_alias.as_deref(), paging)
        .await?;

    let items = refuels.into_iter().map(RefuelResponse::from).collect();
    Ok(Json(ApiResponse::paginated(
        items,
        pagination_data(total, paging),
    )))
}

async fn get_refuel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<RefuelResponse>>> {
    let id = parse_id(&id)?;
    let refuel = RefuelRepository::new(state.store.clone())
        .get(auth.id, id)
        .await?;
    Ok(Json(ApiResponse::success(RefuelResponse::from(refuel))))
}

async fn create_refuel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateRefuelRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let refuel = RefuelRepository::new(state.store.clone())
        .create(auth.id, payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RefuelResponse::from(refuel))),
    ))
}

async fn update_refuel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRefuelRequest>,
) -> AppResult<Json<ApiResponse<RefuelResponse>>> {
    payload.validate()?;

    let id = parse_id(&id)?;
    let refuel = RefuelRepository::new(state.store.clone())
        .update(auth.id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(RefuelResponse::from(refuel))))
}

async fn delete_refuel(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    RefuelRepository::new(state.store.clone())
        .delete(auth.id, id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Reabastecimiento eliminado correctamente",
    })))
}

async fn fuel_analysis(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(alias): Path<String>,
) -> AppResult<Json<ApiResponse<FuelAnalysis>>> {
    let (vehicle, refuels) = RefuelRepository::new(state.store.clone())
        .for_analysis(auth.id, &alias)
        .await?;
    Ok(Json(ApiResponse::success(metrics::fuel_analysis(
        &vehicle, &refuels,
    ))))
}
