//! Repositorio de usuarios
//!
//! Registro, autenticación y administración de identidades. El hash
//! del secreto nunca sale de acá.

use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use uuid::Uuid;

use crate::models::user::{RegisterRequest, UpdateProfileRequest, User, UserRole};
use crate::store::Store;
use crate::utils::errors::{AppError, AppResult};

pub struct UserRepository {
    store: Arc<Store>,
}

impl UserRepository {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Registrar un usuario nuevo. El rol por defecto es `read`.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Error al hashear contraseña: {}", e)))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: request.username,
            email: request.email.to_lowercase(),
            password_hash,
            role: request.role.unwrap_or(UserRole::Read),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        self.store.create_user(user).await
    }

    /// Verificar credenciales de login
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let user = self
            .store
            .find_user_by_email(email)
            .await
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        let matches = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Error al verificar contraseña: {}", e)))?;
        if !matches {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        if !user.is_active {
            return Err(AppError::Unauthorized("Usuario inactivo".to_string()));
        }

        Ok(user)
    }

    pub async fn find(&self, id: Uuid) -> AppResult<User> {
        self.store
            .find_user(id)
            .await
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<User> {
        let mut user = self.find(id).await?;
        if let Some(username) = request.username {
            user.username = username;
        }
        if let Some(email) = request.email {
            user.email = email.to_lowercase();
        }
        user.updated_at = Utc::now();
        self.store.update_user(user).await
    }

    /// Cambiar la contraseña verificando primero la actual
    pub async fn update_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let mut user = self.find(id).await?;

        let matches = verify(current_password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Error al verificar contraseña: {}", e)))?;
        if !matches {
            return Err(AppError::Unauthorized(
                "Contraseña actual incorrecta".to_string(),
            ));
        }

        user.password_hash = hash(new_password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Error al hashear contraseña: {}", e)))?;
        user.updated_at = Utc::now();
        self.store.update_user(user).await?;
        Ok(())
    }

    pub async fn list(&self, is_active: Option<bool>) -> Vec<User> {
        self.store.list_users(is_active).await
    }

    pub async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        let mut user = self.find(id).await?;
        user.role = role;
        user.updated_at = Utc::now();
        self.store.update_user(user).await
    }

    /// Desactivar un usuario. Idempotente.
    pub async fn deactivate(&self, id: Uuid) -> AppResult<User> {
        let mut user = self.find(id).await?;
        user.is_active = false;
        user.updated_at = Utc::now();
        self.store.update_user(user).await
    }

    /// Reactivar un usuario. Idempotente.
    pub async fn reactivate(&self, id: Uuid) -> AppResult<User> {
        let mut user = self.find(id).await?;
        user.is_active = true;
        user.updated_at = Utc::now();
        self.store.update_user(user).await
    }
}
