//! Servicios
//!
//! Lógica de negocio: cálculos geográficos, motor de progresión de
//! checkpoints, detector de paso y ciclo de vida de las sesiones.

pub mod checkpoint_engine;
pub mod drive_service;
pub mod geo;
pub mod pass_detector;
pub mod schedule;
pub mod session_locks;

pub use drive_service::{DriveService, LocationUpdate};
