//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y los parámetros de
//! seguimiento del motor de progresión de checkpoints.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

pub const DEFAULT_APPROACH_RADIUS_KM: f64 = 0.5;
pub const DEFAULT_ARRIVAL_RADIUS_KM: f64 = 0.1;
/// Banda de histéresis: `arrived → departed` sólo más allá de arrival × factor
pub const DEFAULT_HYSTERESIS_FACTOR: f64 = 1.2;
/// Alineación mínima (producto escalar) para el detector de paso
pub const DEFAULT_DIRECTION_THRESHOLD: f64 = 0.5;
/// Hora local de Corea (UTC+9)
pub const DEFAULT_SCHEDULE_UTC_OFFSET_MINUTES: i32 = 9 * 60;

/// Parámetros del motor de seguimiento
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingConfig {
    pub approach_radius_km: f64,
    pub arrival_radius_km: f64,
    pub hysteresis_factor: f64,
    pub direction_threshold: f64,
    pub schedule_utc_offset_minutes: i32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            approach_radius_km: DEFAULT_APPROACH_RADIUS_KM,
            arrival_radius_km: DEFAULT_ARRIVAL_RADIUS_KM,
            hysteresis_factor: DEFAULT_HYSTERESIS_FACTOR,
            direction_threshold: DEFAULT_DIRECTION_THRESHOLD,
            schedule_utc_offset_minutes: DEFAULT_SCHEDULE_UTC_OFFSET_MINUTES,
        }
    }
}

impl TrackingConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            approach_radius_km: parse_var("TRACKING_APPROACH_RADIUS_KM", defaults.approach_radius_km)?,
            arrival_radius_km: parse_var("TRACKING_ARRIVAL_RADIUS_KM", defaults.arrival_radius_km)?,
            hysteresis_factor: parse_var("TRACKING_HYSTERESIS_FACTOR", defaults.hysteresis_factor)?,
            direction_threshold: parse_var(
                "TRACKING_DIRECTION_THRESHOLD",
                defaults.direction_threshold,
            )?,
            schedule_utc_offset_minutes: parse_var(
                "SCHEDULE_UTC_OFFSET_MINUTES",
                defaults.schedule_utc_offset_minutes,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Verificar que los parámetros tienen sentido
    pub fn validate(&self) -> Result<()> {
        if !(self.approach_radius_km.is_finite() && self.approach_radius_km > 0.0) {
            return Err(anyhow!("TRACKING_APPROACH_RADIUS_KM must be a positive number"));
        }
        if !(self.arrival_radius_km.is_finite() && self.arrival_radius_km > 0.0) {
            return Err(anyhow!("TRACKING_ARRIVAL_RADIUS_KM must be a positive number"));
        }
        if !(self.hysteresis_factor.is_finite() && self.hysteresis_factor >= 1.0) {
            return Err(anyhow!("TRACKING_HYSTERESIS_FACTOR must be >= 1.0"));
        }
        if !(-1.0..=1.0).contains(&self.direction_threshold) {
            return Err(anyhow!("TRACKING_DIRECTION_THRESHOLD must be within [-1, 1]"));
        }
        if self.schedule_utc_offset_minutes.abs() >= 24 * 60 {
            return Err(anyhow!("SCHEDULE_UTC_OFFSET_MINUTES must be less than a day"));
        }
        Ok(())
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: Option<String>,
    pub cors_origins: Vec<String>,
    pub log_level: tracing::Level,
    pub tracking: TrackingConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 5679,
            host: "0.0.0.0".to_string(),
            database_url: None,
            cors_origins: Vec::new(),
            log_level: tracing::Level::DEBUG,
            tracking: TrackingConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let environment = env::var("ENVIRONMENT").unwrap_or(defaults.environment);
        let default_level = if environment == "development" {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        Ok(Self {
            port: parse_var("PORT", defaults.port)?,
            host: env::var("HOST").unwrap_or(defaults.host),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log_level: parse_var("LOG_LEVEL", default_level)?,
            tracking: TrackingConfig::from_env()?,
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub(crate) fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("{} has an invalid value '{}'", name, raw)),
        _ => Ok(default),
    }
}
