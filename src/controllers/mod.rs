//! Controladores
//!
//! Adaptan los DTOs de la API a los servicios y repositorios.

pub mod drive_controller;
pub mod gps_log_controller;
pub mod route_controller;
