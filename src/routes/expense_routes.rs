//! Rutas de gastos

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::middleware::auth::{auth_middleware, require_write, AuthUser};
use crate::models::expense::{
    CreateExpenseRequest, Expense, ExpenseListQuery, UpdateExpenseRequest,
};
use crate::models::response::ApiResponse;
use crate::repositories::expense_repository::{ExpenseFilter, ExpenseRepository};
use crate::routes::parse_id;
use crate::services::metrics::{self, ExpenseSummary};
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::validation::parse_date_param;

pub fn router(state: &AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/", get(list_expenses))
        .route("/summary", get(expense_summary))
        .route("/upcoming", get(upcoming_expenses))
        .route("/:id", get(get_expense));

    let write = Router::new()
        .route("/", post(create_expense))
        .route("/:id", put(update_expense).delete(delete_expense))
        .route_layer(from_fn(require_write));

    read.merge(write)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
}

fn build_filter(query: &ExpenseListQuery) -> AppResult<ExpenseFilter> {
    let start = match query.start_date.as_deref() {
        Some(raw) => Some(parse_date_param("startDate", raw)?),
        None => None,
    };
    let end = match query.end_date.as_deref() {
        Some(raw) => Some(parse_date_param("endDate", raw)?),
        None => None,
    };
    Ok(ExpenseFilter {
        category: query.categoria,
        is_tax_deductible: query.is_tax_deductible,
        is_active: query.is_active,
        start,
        end,
    })
}

async fn list_expenses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExpenseListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Expense>>>> {
    let filter = build_filter(&query)?;
    let expenses = ExpenseRepository::new(state.store.clone())
        .list(auth.id, query.vehicle_alias.as_deref(), filter)
        .await?;
    Ok(Json(ApiResponse::list(expenses)))
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    #[serde(rename = "vehicleAlias")]
    vehicle_alias: Option<String>,
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

async fn expense_summary(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<ApiResponse<ExpenseSummary>>> {
    let start = match query.start_date.as_deref() {
        Some(raw) => Some(parse_date_param("startDate", raw)?),
        None => None,
    };
    let end = match query.end_date.as_deref() {
        Some(raw) => Some(parse_date_param("endDate", raw)?),
        None => None,
    };

    let expenses = ExpenseRepository::new(state.store.clone())
        .list(
            auth.id,
            query.vehicle_alias.as_deref(),
            ExpenseFilter {
                is_active: Some(true),
                start,
                end,
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(metrics::expense_summary(
        &expenses,
    ))))
}

async fn upcoming_expenses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<Vec<Expense>>>> {
    let expenses = ExpenseRepository::new(state.store.clone())
        .list(
            auth.id,
            None,
            ExpenseFilter {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await?;

    Ok(Json(ApiResponse::list(metrics::upcoming_expenses(
        expenses,
        Utc::now(),
    ))))
}

async fn get_expense(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Expense>>> {
    let id = parse_id(&id)?;
    let expense = ExpenseRepository::new(state.store.clone())
        .get(auth.id, id)
        .await?;
    Ok(Json(ApiResponse::success(expense)))
}

async fn create_expense(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateExpenseRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let expense = ExpenseRepository::new(state.store.clone())
        .create(auth.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(expense))))
}

async fn update_expense(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> AppResult<Json<ApiResponse<Expense>>> {
    payload.validate()?;

    let id = parse_id(&id)?;
    let expense = ExpenseRepository::new(state.store.clone())
        .update(auth.id, id, payload)
        .await?;
    Ok(Json(ApiResponse::success(expense)))
}

async fn delete_expense(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let id = parse_id(&id)?;
    ExpenseRepository::new(state.store.clone())
        .soft_delete(auth.id, id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Gasto eliminado correctamente",
    })))
}
