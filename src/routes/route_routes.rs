//! Rutas de recorridos
//!
//! Crear y borrar devuelven además el kilometraje resultante del
//! vehículo, así el cliente ve el efecto del ledger sin otra consulta.

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
use crate::models::response::ApiResponse;
use crate::models::route::{CreateRouteRequest, Route, RouteListQuery, UpdateRouteRequest};
use crate::repositories::route_repository::RouteRepository;
use crate::routes::parse_id;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::validation::parse_date_param;

pub fn router(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_routes))
        .route("/:id", get(get_route));

    let write = Router::new()
        .route("/", post(create_route))
        .route("/:id", put(update_route).delete(delete_route))
        .route_layer(from_fn(require_write));

    read.merge(write)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

async fn list_routes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<RouteListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Route>>>> {
    let start = match query.start_date.as_deref() {
        Some(raw) => Some(parse_date_param("startDate", raw)?),
        None => None,
    };
    let end = match query.end_date.as_deref() {
        Some(raw) => Some(parse_date_param("endDate", raw)?),
        None => None,
    };

    let routes = RouteRepository::new(state.store.clone())
        .list(auth.id, query.vehicle_alias.as_deref(), start, end)
        .await?;
    Ok(Json(ApiResponse::list(routes)))
}

async fn get_route(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Route>>> {
    let id = parse_id(&id)?;
    let route = RouteRepository::new(state.store.clone()).get(auth.id, id).await?;
    Ok(Json(ApiResponse::success(route)))
}

async fn create_route(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateRouteRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let (route, total) = RouteRepository::new(state.store.clone())
        .create(auth.id, payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": route,
            "vehicleKilometraje": total,
        })),
    ))
}

async fn update_route(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRouteRequest>,
) -> AppResult<Json<ApiResponse<Route>>> {
    payload.validate()?;

    let id = parse_id(&id)?;
    let route = RouteRepository::new(state.store.clone())
        .update(auth.id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(route)))
}

async fn delete_route(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    let total = RouteRepository::new(state.store.clone())
        .delete(auth.id, id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Ruta eliminada correctamente",
        "vehicleKilometraje": total,
    })))
}
