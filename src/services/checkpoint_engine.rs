//! Motor de progresión de checkpoints
//!
//! Dada una muestra GPS y la sesión, recorre los checkpoints en orden de ruta
//! y aplica como máximo UNA transición de estado. Las reglas son funciones
//! puras evaluadas en orden de prioridad; la primera que coincide gana y el
//! recorrido termina ahí.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::{CheckpointStatus, DriveSession, GeoPoint, RoutePoint, SessionSettings};
use crate::services::geo::distance_km;
use crate::services::pass_detector::PassQuery;

/// Tipo de transición aplicada a un checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// pending → approaching
    Approach,
    /// approaching → arrived
    Arrival,
    /// arrived → departed
    Departure,
    /// pending → departed, inferido por el detector de paso
    PassThrough,
}

impl TransitionKind {
    pub fn target(&self) -> CheckpointStatus {
        match self {
            TransitionKind::Approach => CheckpointStatus::Approaching,
            TransitionKind::Arrival => CheckpointStatus::Arrived,
            TransitionKind::Departure | TransitionKind::PassThrough => CheckpointStatus::Departed,
        }
    }

    pub fn message(&self, point_name: &str) -> String {
        match self {
            TransitionKind::Approach => format!("{}에 접근 중입니다.", point_name),
            TransitionKind::Arrival => format!("{}에 도착했습니다.", point_name),
            TransitionKind::Departure => format!("{}에서 출발했습니다.", point_name),
            TransitionKind::PassThrough => format!("{}을(를) 통과했습니다.", point_name),
        }
    }
}

/// Todo lo que una regla necesita para decidir sobre un checkpoint
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub index: usize,
    pub status: CheckpointStatus,
    pub point: &'a RoutePoint,
    pub next_point: Option<&'a RoutePoint>,
    pub sample: GeoPoint,
    pub previous: Option<GeoPoint>,
    pub distance_km: f64,
    pub settings: &'a SessionSettings,
}

pub type TransitionRule = fn(&RuleContext<'_>) -> Option<TransitionKind>;

/// Reglas en orden estricto de prioridad
pub const RULES: [TransitionRule; 4] = [approach_rule, arrival_rule, departure_rule, pass_through_rule];

pub fn approach_rule(ctx: &RuleContext<'_>) -> Option<TransitionKind> {
    (ctx.status == CheckpointStatus::Pending && ctx.distance_km <= ctx.settings.approach_radius)
        .then_some(TransitionKind::Approach)
}

pub fn arrival_rule(ctx: &RuleContext<'_>) -> Option<TransitionKind> {
    (ctx.status == CheckpointStatus::Approaching && ctx.distance_km <= ctx.settings.arrival_radius)
        .then_some(TransitionKind::Arrival)
}

pub fn departure_rule(ctx: &RuleContext<'_>) -> Option<TransitionKind> {
    (ctx.status == CheckpointStatus::Arrived && ctx.distance_km > ctx.settings.departure_radius())
        .then_some(TransitionKind::Departure)
}

pub fn pass_through_rule(ctx: &RuleContext<'_>) -> Option<TransitionKind> {
    if ctx.status != CheckpointStatus::Pending {
        return None;
    }
    let query = PassQuery {
        previous: ctx.previous?,
        current: ctx.sample,
        checkpoint: ctx.point.location,
        next: ctx.next_point?.location,
    };
    let evidence = query.detect(ctx.settings.direction_threshold)?;
    debug!(
        "🧭 Paso inferido por '{}' (idx {}): prev→B {:.3} km, now→B {:.3} km, now→N {:.3} km, dir {:.3}",
        ctx.point.name,
        ctx.index,
        evidence.dist_prev_to_checkpoint,
        evidence.dist_now_to_checkpoint,
        evidence.dist_now_to_next,
        evidence.dir_score
    );
    Some(TransitionKind::PassThrough)
}

/// Primera regla que coincide para un checkpoint
pub fn evaluate(ctx: &RuleContext<'_>) -> Option<TransitionKind> {
    RULES.iter().find_map(|rule| rule(ctx))
}

/// Transición aplicada en una muestra
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTransition {
    pub index: usize,
    pub kind: TransitionKind,
    pub from: CheckpointStatus,
    pub to: CheckpointStatus,
}

/// Resultado de procesar una muestra
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleOutcome {
    pub transition: Option<AppliedTransition>,
    pub message: String,
    pub play_announcement: bool,
}

/// Procesar una muestra sobre la sesión.
///
/// Aplica como máximo una transición, actualiza las distancias mínimas y
/// desplaza current → previous. La sesión debe estar en curso; el llamador
/// lo comprueba antes.
pub fn process_sample(session: &mut DriveSession, sample: GeoPoint, now: DateTime<Utc>) -> SampleOutcome {
    let previous = session.current_location;
    let mut outcome = SampleOutcome::default();

    let distances: Vec<f64> = session
        .route
        .points
        .iter()
        .map(|point| distance_km(sample, point.location))
        .collect();

    for (checkpoint, &d) in session.checkpoints.iter_mut().zip(&distances) {
        if checkpoint.status != CheckpointStatus::Departed {
            checkpoint.observe_distance(d);
        }
    }

    let points = &session.route.points;
    let found = session
        .checkpoints
        .iter()
        .enumerate()
        .filter(|(_, cp)| cp.status != CheckpointStatus::Departed)
        .find_map(|(index, cp)| {
            let ctx = RuleContext {
                index,
                status: cp.status,
                point: &points[index],
                next_point: points.get(index + 1),
                sample,
                previous,
                distance_km: distances[index],
                settings: &session.settings,
            };
            evaluate(&ctx).map(|kind| (index, kind))
        });

    if let Some((index, kind)) = found {
        outcome = apply_transition(session, index, kind, now);
    }

    session.record_location(sample);
    outcome
}

/// Efectos secundarios de cada transición
fn apply_transition(
    session: &mut DriveSession,
    index: usize,
    kind: TransitionKind,
    now: DateTime<Utc>,
) -> SampleOutcome {
    let announce = session.route.points[index].use_announcement;
    let checkpoint = &mut session.checkpoints[index];
    let from = checkpoint.status;
    let to = kind.target();

    if !checkpoint.advance(to) {
        return SampleOutcome::default();
    }

    let mut play_announcement = false;
    match kind {
        TransitionKind::Approach => play_announcement = announce,
        TransitionKind::Arrival => checkpoint.mark_arrival(now),
        TransitionKind::Departure => checkpoint.mark_departure(now),
        TransitionKind::PassThrough => {
            checkpoint.mark_arrival(now);
            checkpoint.mark_departure(now);
        }
    }

    let message = kind.message(&checkpoint.point_name);
    info!(
        "📍 Sesión {} checkpoint {} ('{}'): {:?} → {:?}",
        session.id, index, checkpoint.point_name, from, to
    );

    // La llegada al primer punto marca el inicio real del recorrido
    if kind == TransitionKind::Arrival && index == 0 {
        session.start_time = now;
    }

    SampleOutcome {
        transition: Some(AppliedTransition { index, kind, from, to }),
        message,
        play_announcement,
    }
}
