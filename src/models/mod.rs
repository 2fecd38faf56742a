//! Modelos del sistema
//!
//! Este módulo contiene los modelos de dominio: rutas, sesiones de conducción,
//! checkpoints y registros GPS.

pub mod drive_session;
pub mod gps_log;
pub mod location;
pub mod route;

pub use drive_session::{Checkpoint, CheckpointStatus, DriveSession, SessionSettings, SessionStatus};
pub use gps_log::GpsLogEntry;
pub use location::GeoPoint;
pub use route::{PointKind, Route, RoutePoint, RouteSnapshot};
