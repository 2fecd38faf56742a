//! Modelo de ubicación
//!
//! Coordenada geográfica validada. En la base de datos y en la API se
//! representa como un `Point` GeoJSON con `[longitud, latitud]`.

use serde::{Deserialize, Serialize};

/// Punto geográfico con latitud/longitud finitas y dentro de rango
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "PointGeometry", try_from = "PointGeometry")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Crear un punto validando rangos (lat ∈ [-90, 90], lon ∈ [-180, 180])
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(format!(
                "coordinates must be finite numbers (lat: {}, lon: {})",
                latitude, longitude
            ));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {} is outside [-90, 90]", latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude {} is outside [-180, 180]", longitude));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Geometría GeoJSON `Point` tal como se persiste y se expone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type", default = "point_type")]
    pub geometry_type: String,
    pub coordinates: [f64; 2], // [longitude, latitude]
}

fn point_type() -> String {
    "Point".to_string()
}

impl From<GeoPoint> for PointGeometry {
    fn from(point: GeoPoint) -> Self {
        Self {
            geometry_type: point_type(),
            coordinates: [point.longitude, point.latitude],
        }
    }
}

impl TryFrom<PointGeometry> for GeoPoint {
    type Error = String;

    fn try_from(geometry: PointGeometry) -> Result<Self, Self::Error> {
        if geometry.geometry_type != "Point" {
            return Err(format!(
                "unsupported geometry type '{}', expected 'Point'",
                geometry.geometry_type
            ));
        }
        let [longitude, latitude] = geometry.coordinates;
        GeoPoint::new(latitude, longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(GeoPoint::new(91.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 127.0).is_err());
        assert!(GeoPoint::new(37.5665, 126.978).is_ok());
    }

    #[test]
    fn test_geojson_layout_is_lon_lat() {
        let point = GeoPoint::new(37.5665, 126.978).unwrap();
        let value = serde_json::to_value(point).unwrap();
        assert_eq!(value, json!({ "type": "Point", "coordinates": [126.978, 37.5665] }));

        let parsed: GeoPoint =
            serde_json::from_value(json!({ "coordinates": [126.978, 37.5665] })).unwrap();
        assert_eq!(parsed, point);
    }

    #[test]
    fn test_rejects_other_geometry_types() {
        let parsed = serde_json::from_value::<GeoPoint>(
            json!({ "type": "LineString", "coordinates": [126.978, 37.5665] }),
        );
        assert!(parsed.is_err());
    }
}
