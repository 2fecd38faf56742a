//! Detector de paso (fail-safe)
//!
//! Recupera un checkpoint que el vehículo pasó sin que ninguna muestra cayera
//! dentro de sus radios de aproximación o llegada (muestras escasas, limitadas
//! por el cliente o con ruido GPS).
//!
//! Se infiere el paso por B sólo si se cumplen las tres condiciones a la vez:
//! el vehículo se aleja de B, está más cerca del siguiente punto N que de B,
//! y su dirección de movimiento está alineada con el tramo B → N.

use crate::models::GeoPoint;
use crate::services::geo::{direction_score, distance_km, projected_delta};

/// Datos medidos cuando el detector confirma un paso
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassEvidence {
    pub dist_prev_to_checkpoint: f64,
    pub dist_now_to_checkpoint: f64,
    pub dist_now_to_next: f64,
    pub dir_score: f64,
}

/// Entrada del detector: P (anterior), C (actual), B (checkpoint), N (siguiente)
#[derive(Debug, Clone, Copy)]
pub struct PassQuery {
    pub previous: GeoPoint,
    pub current: GeoPoint,
    pub checkpoint: GeoPoint,
    pub next: GeoPoint,
}

impl PassQuery {
    /// Evaluar las tres condiciones. `threshold` es la alineación mínima exigida
    /// (estrictamente mayor).
    pub fn detect(&self, threshold: f64) -> Option<PassEvidence> {
        let dist_prev_to_checkpoint = distance_km(self.previous, self.checkpoint);
        let dist_now_to_checkpoint = distance_km(self.current, self.checkpoint);
        let dist_now_to_next = distance_km(self.current, self.next);

        let moving_away = dist_now_to_checkpoint > dist_prev_to_checkpoint;
        let closer_to_next = dist_now_to_next < dist_now_to_checkpoint;
        if !moving_away || !closer_to_next {
            return None;
        }

        let dir_score = direction_score(
            projected_delta(self.previous, self.current),
            projected_delta(self.checkpoint, self.next),
        )?;
        if dir_score <= threshold {
            return None;
        }

        Some(PassEvidence {
            dist_prev_to_checkpoint,
            dist_now_to_checkpoint,
            dist_now_to_next,
            dir_score,
        })
    }
}
