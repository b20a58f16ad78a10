//! Rutas de autenticación y administración de usuarios
//!
//! Registro y login son públicos pero pasan por el rate limit estricto
//! de autenticación. El resto exige identidad; la administración de
//! usuarios exige además el rol admin. Los eventos sensibles se emiten
//! al target `audit`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::middleware::auth::{auth_middleware, require_admin, AuthUser};
use crate::middleware::rate_limit::auth_rate_limit;
use crate::models::response::ApiResponse;
use crate::models::user::{
    LoginRequest, RegisterRequest, UpdatePasswordRequest, UpdateProfileRequest, UpdateRoleRequest,
    User,
};
use crate::repositories::user_repository::UserRepository;
use crate::routes::parse_id;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

pub fn router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let admin = Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user).delete(deactivate_user))
        .route("/users/:id/role", put(update_role))
        .route("/users/:id/reactivate", axum::routing::patch(reactivate_user))
        .route_layer(from_fn(require_admin));

    let protected = Router::new()
        .route("/me", get(me))
        .route("/updateprofile", put(update_profile))
        .route("/updatepassword", put(update_password))
        .merge(admin)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    public
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), auth_rate_limit))
}

fn session_payload(user: &User, token: String) -> serde_json::Value {
    json!({
        "user": {
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "role": user.role,
        },
        "token": token,
    })
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    payload.validate()?;

    let users = UserRepository::new(state.store.clone());
    let user = users.register(payload).await?;
    let token = state
        .jwt
        .generate_token(user.id)
        .map_err(|e| AppError::Internal(format!("Error generando token: {}", e)))?;

    tracing::info!(
        target: "audit",
        event = "USER_REGISTERED",
        user_id = %user.id,
        username = %user.username,
        email = %user.email,
        role = %user.role,
        "Usuario registrado"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(session_payload(&user, token))),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    payload.validate()?;

    let users = UserRepository::new(state.store.clone());
    let user = match users.authenticate(&payload.email, &payload.password).await {
        Ok(user) => user,
        Err(e) => {
            if matches!(&e, AppError::Unauthorized(msg) if msg == "Usuario inactivo") {
                tracing::warn!(
                    target: "audit",
                    event = "LOGIN_FAILED_INACTIVE",
                    email = %payload.email,
                    "Intento de login de usuario inactivo"
                );
            }
            return Err(e);
        }
    };

    let token = state
        .jwt
        .generate_token(user.id)
        .map_err(|e| AppError::Internal(format!("Error generando token: {}", e)))?;

    tracing::info!(
        target: "audit",
        event = "USER_LOGIN",
        user_id = %user.id,
        email = %user.email,
        "Login exitoso"
    );

    Ok(Json(ApiResponse::success(session_payload(&user, token))))
}

async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = UserRepository::new(state.store.clone()).find(auth.id).await?;
    Ok(Json(ApiResponse::success(user)))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    payload.validate()?;

    let user = UserRepository::new(state.store.clone())
        .update_profile(auth.id, payload)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    payload.validate()?;

    UserRepository::new(state.store.clone())
        .update_password(auth.id, &payload.current_password, &payload.new_password)
        .await?;

    tracing::info!(
        target: "audit",
        event = "PASSWORD_CHANGED",
        user_id = %auth.id,
        "Contraseña actualizada"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Contraseña actualizada correctamente",
    })))
}

#[derive(Debug, Deserialize)]
struct UserListQuery {
    #[serde(rename = "isActive")]
    is_active: Option<bool>,
}

async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let users = UserRepository::new(state.store.clone())
        .list(query.is_active)
        .await;
    Ok(Json(ApiResponse::list(users)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let id = parse_id(&id)?;
    let user = UserRepository::new(state.store.clone()).find(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

async fn update_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let id = parse_id(&id)?;
    let users = UserRepository::new(state.store.clone());
    let old_role = users.find(id).await?.role;
    let user = users.set_role(id, payload.role).await?;

    tracing::info!(
        target: "audit",
        event = "ROLE_CHANGED",
        target_user_id = %id,
        target_email = %user.email,
        old_role = %old_role,
        new_role = %user.role,
        changed_by = %auth.id,
        "Rol actualizado"
    );

    Ok(Json(ApiResponse::success(user)))
}

async fn deactivate_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let id = parse_id(&id)?;
    if id == auth.id {
        return Err(crate::utils::errors::validation_error(
            "id",
            "No puedes desactivar tu propia cuenta",
        ));
    }

    let user = UserRepository::new(state.store.clone()).deactivate(id).await?;

    tracing::info!(
        target: "audit",
        event = "USER_DEACTIVATED",
        target_user_id = %id,
        target_email = %user.email,
        deactivated_by = %auth.id,
        "Usuario desactivado"
    );

    Ok(Json(ApiResponse::success_with_message(
        "Usuario desactivado correctamente",
        user,
    )))
}

async fn reactivate_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<User>>> {
    let id = parse_id(&id)?;
    let user = UserRepository::new(state.store.clone()).reactivate(id).await?;

    tracing::info!(
        target: "audit",
        event = "USER_REACTIVATED",
        target_user_id = %id,
        target_email = %user.email,
        reactivated_by = %auth.id,
        "Usuario reactivado"
    );

    Ok(Json(ApiResponse::success_with_message(
        "Usuario reactivado correctamente",
        user,
    )))
}
