//! Modelo de User
//!
//! Identidades del sistema: email y username únicos, secreto hasheado,
//! rol cerrado y flag de activo. Nunca se borran físicamente.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Rol del usuario - enumeración cerrada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Read,
    Write,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Read => "read",
            UserRole::Write => "write",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usuario principal. El hash del secreto nunca se serializa.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Request de registro
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "El nombre de usuario debe tener entre 3 y 50 caracteres"
    ))]
    pub username: String,

    #[validate(email(message = "Email inválido"))]
    pub email: String,

    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,

    pub role: Option<UserRole>,
}

/// Request de login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email inválido"))]
    pub email: String,

    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

/// Request para actualizar perfil propio
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "El nombre de usuario debe tener entre 3 y 50 caracteres"
    ))]
    pub username: Option<String>,

    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
}

/// Request para actualizar contraseña propia
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[serde(rename = "currentPassword")]
    #[validate(length(min = 1, message = "La contraseña actual es requerida"))]
    pub current_password: String,

    #[serde(rename = "newPassword")]
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub new_password: String,
}

/// Request para cambiar el rol de un usuario (solo admin)
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}
