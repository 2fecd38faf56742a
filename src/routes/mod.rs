pub mod drive_routes;
pub mod gps_routes;
pub mod route_routes;
