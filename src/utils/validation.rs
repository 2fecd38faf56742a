//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos de entrada
//! (coordenadas, radios, horarios) y conversión de tipos.

use serde_json::Value;
use validator::ValidationError;

use crate::models::GeoPoint;
use crate::services::schedule::parse_schedule_minutes;
use crate::utils::errors::{invalid_input_error, AppResult};

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar una hora programada en formato "HH:mm"
pub fn validate_schedule_time(value: &str) -> Result<(), ValidationError> {
    if parse_schedule_minutes(value).is_none() {
        let mut error = ValidationError::new("schedule_time");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"HH:mm".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar un radio en km (finito y positivo)
pub fn validate_radius(field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid_input_error(format!(
            "{} must be a positive number of kilometres, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Leer una coordenada de un JSON arbitrario.
///
/// Acepta números y cadenas numéricas; rechaza ausencias y cualquier otro tipo.
pub fn parse_coordinate(field: &str, value: Option<&Value>) -> AppResult<f64> {
    let parsed = match value {
        None | Some(Value::Null) => {
            return Err(invalid_input_error(format!("{} is required", field)));
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(invalid_input_error(format!("{} must be a number", field))),
    }
}

/// Construir un punto validado a partir de latitud/longitud en JSON
pub fn parse_location(latitude: Option<&Value>, longitude: Option<&Value>) -> AppResult<GeoPoint> {
    let latitude = parse_coordinate("latitude", latitude)?;
    let longitude = parse_coordinate("longitude", longitude)?;
    GeoPoint::new(latitude, longitude).map_err(invalid_input_error)
}
