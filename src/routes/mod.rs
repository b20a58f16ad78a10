pub mod auth_routes;
pub mod expense_routes;
pub mod maintenance_routes;
pub mod refuel_routes;
pub mod route_routes;
pub mod vehicle_routes;

use uuid::Uuid;

use crate::utils::errors::{validation_error, AppError};

/// Parsear un id de path. Un id malformado es un error de validación,
/// no un 404.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| validation_error("id", "ID inválido"))
}
