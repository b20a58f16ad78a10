//! Utilidades de validación
//!
//! Helpers para chequeos que dependen de valores en runtime y para
//! el parsing de filtros del query string.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::utils::errors::{validation_error, AppError};

/// Parsear un parámetro de fecha del query string.
/// Acepta RFC3339 o `YYYY-MM-DD` (interpretado a medianoche UTC).
pub fn parse_date_param(field: &'static str, value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(validation_error(field, "Fecha inválida"))
}

/// Validar año de fabricación: 1900 hasta el año próximo.
/// El límite superior depende del reloj, así que no puede ser un
/// atributo `range` estático en el DTO.
pub fn validate_model_year(year: i32) -> Result<(), AppError> {
    let max = Utc::now().year() + 1;
    if year < 1900 || year > max {
        return Err(validation_error(
            "modelo",
            "El año de fabricación es inválido",
        ));
    }
    Ok(())
}
