//! Cálculos geográficos
//!
//! Distancia de gran círculo (haversine) y vectores de desplazamiento
//! localmente planos usados por el detector de paso.

use crate::models::GeoPoint;

/// Radio ecuatorial WGS84 en km, el mismo que usaba el cálculo de distancia del cliente
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Distancia haversine entre dos puntos, en kilómetros
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // h puede pasar de 1.0 por redondeo en puntos antipodales
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Vector 2D en un plano tangente local (x = este, y = norte)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarVector {
    pub x: f64,
    pub y: f64,
}

impl PlanarVector {
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// `None` para vectores de longitud cero (sin movimiento)
    pub fn normalize(&self) -> Option<Self> {
        let len = self.length();
        if len <= f64::EPSILON || !len.is_finite() {
            return None;
        }
        Some(Self {
            x: self.x / len,
            y: self.y / len,
        })
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

/// Desplazamiento equirectangular de `from` a `to`, en grados de latitud.
///
/// La longitud se escala por cos(latitud media). Sólo es válido para tramos
/// cortos y para longitudes que no cruzan el antimeridiano.
pub fn projected_delta(from: GeoPoint, to: GeoPoint) -> PlanarVector {
    let mean_lat = ((from.latitude() + to.latitude()) / 2.0).to_radians();
    PlanarVector {
        x: (to.longitude() - from.longitude()) * mean_lat.cos(),
        y: to.latitude() - from.latitude(),
    }
}

/// Puntuación de alineación entre dos desplazamientos, en [-1, 1]
pub fn direction_score(movement: PlanarVector, route: PlanarVector) -> Option<f64> {
    let movement = movement.normalize()?;
    let route = route.normalize()?;
    Some(movement.dot(&route).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for point in [p(37.5665, 126.978), p(-33.86, 151.2), p(0.0, 0.0), p(89.9, -179.9)] {
            assert_eq!(distance_km(point, point), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let seoul = p(37.5665, 126.978);
        let busan = p(35.1796, 129.0756);
        assert_eq!(distance_km(seoul, busan), distance_km(busan, seoul));
    }

    #[test]
    fn test_distance_seoul_busan() {
        // ~325 km en línea recta
        let d = distance_km(p(37.5665, 126.978), p(35.1796, 129.0756));
        assert!((d - 325.0).abs() < 5.0, "distance was {}", d);
    }

    #[test]
    fn test_one_degree_latitude() {
        let d = distance_km(p(35.0, 139.0), p(36.0, 139.0));
        assert!((d - 111.3).abs() < 0.5, "distance was {}", d);
    }

    #[test]
    fn test_antipodal_points_do_not_produce_nan() {
        let d = distance_km(p(0.0, 0.0), p(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_projected_delta_scales_longitude() {
        let v = projected_delta(p(60.0, 10.0), p(60.0, 11.0));
        // cos(60°) = 0.5
        assert!((v.x - 0.5).abs() < 1e-9);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_normalize_zero_vector() {
        let v = projected_delta(p(37.5, 127.0), p(37.5, 127.0));
        assert!(v.normalize().is_none());
    }

    #[test]
    fn test_direction_score() {
        let east = projected_delta(p(37.5, 127.0), p(37.5, 127.01));
        let west = projected_delta(p(37.5, 127.01), p(37.5, 127.0));
        let north = projected_delta(p(37.5, 127.0), p(37.51, 127.0));

        assert!((direction_score(east, east).unwrap() - 1.0).abs() < 1e-9);
        assert!((direction_score(east, west).unwrap() + 1.0).abs() < 1e-9);
        assert!(direction_score(east, north).unwrap().abs() < 1e-9);
    }
}
