//! Middleware de autenticación y autorización
//!
//! El auth gate extrae el bearer token, lo verifica y resuelve el
//! usuario contra el almacén. Hacia afuera toda falla de verificación
//! colapsa en "token inválido"; la distinción expirado/malformado queda
//! solo en el log. El role gate corre después y solo lee la identidad
//! ya resuelta.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Identidad resuelta que se inyecta en las requests
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
}

/// Id del caller, expuesto en las extensions de la respuesta para que
/// el tracer lo loggee aunque corra por fuera del auth gate.
#[derive(Debug, Clone, Copy)]
pub struct CallerId(pub Uuid);

/// Roles admitidos en endpoints de escritura
pub const WRITE_ROLES: &[UserRole] = &[UserRole::Write, UserRole::Admin];

/// Roles admitidos en endpoints administrativos
pub const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Middleware de autenticación
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::Unauthorized("No autorizado - Token no proporcionado".to_string())
        })?;

    let claims = state.jwt.verify_token(token).map_err(|reason| {
        tracing::debug!(?reason, "Token rechazado");
        AppError::Unauthorized("No autorizado - Token inválido".to_string())
    })?;

    let user = state
        .store
        .find_user(claims.sub)
        .await
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::Unauthorized("Usuario no encontrado o inactivo".to_string()))?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        role: user.role,
    });

    let mut response = next.run(request).await;
    response.extensions_mut().insert(CallerId(user.id));
    Ok(response)
}

fn require_role(user: &AuthUser, allowed: &[UserRole]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "El rol {} no tiene permisos para esta acción",
            user.role
        )))
    }
}

/// Role gate para endpoints de escritura
pub async fn require_write(
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&user, WRITE_ROLES)?;
    Ok(next.run(request).await)
}

/// Role gate para endpoints administrativos
pub async fn require_admin(
    Extension(user): Extension<AuthUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_role(&user, ADMIN_ONLY)?;
    Ok(next.run(request).await)
}
