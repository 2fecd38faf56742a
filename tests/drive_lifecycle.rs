use async_trait::async_trait;
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use bus_tracking::config::EnvironmentConfig;
use bus_tracking::models::{CheckpointStatus, DriveSession, GeoPoint, PointKind, Route, RoutePoint, SessionStatus};
use bus_tracking::repositories::{
    DriveSessionRepository, InMemoryDriveSessionRepository, InMemoryGpsLogRepository,
    InMemoryRouteRepository, RouteRepository,
};
use bus_tracking::services::DriveService;
use bus_tracking::state::AppState;
use bus_tracking::utils::errors::AppError;

/// Repositorio que falla en `update` mientras `failing` esté activo
struct FailingSessionRepository {
    inner: InMemoryDriveSessionRepository,
    failing: AtomicBool,
}

impl FailingSessionRepository {
    fn new() -> Self {
        Self {
            inner: InMemoryDriveSessionRepository::new(),
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl DriveSessionRepository for FailingSessionRepository {
    async fn insert(&self, session: &DriveSession) -> Result<(), AppError> {
        self.inner.insert(session).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<DriveSession>, AppError> {
        self.inner.find_by_id(id).await
    }

    async fn update(&self, session: &DriveSession) -> Result<DriveSession, AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("storage unavailable".to_string()));
        }
        self.inner.update(session).await
    }

    async fn list_running(&self) -> Result<Vec<DriveSession>, AppError> {
        self.inner.list_running().await
    }
}

fn geo(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).unwrap()
}

/// Ruta recta hacia el norte, un punto cada ~1 km
fn straight_route(stops: usize) -> Route {
    let points = (0..stops)
        .map(|i| RoutePoint {
            name: format!("정류장{}", i),
            location: geo(37.5 + i as f64 * 0.009, 127.0),
            kind: match i {
                0 => PointKind::Origin,
                i if i + 1 == stops => PointKind::Destination,
                _ => PointKind::Waypoint,
            },
            scheduled_time: Some(format!("06:{:02}", i * 5)),
            use_announcement: false,
        })
        .collect();
    Route::new("직선 노선".to_string(), points)
}

async fn setup(stops: usize) -> (DriveService, Route) {
    let state = AppState::in_memory(EnvironmentConfig::default());
    let route = state.routes.create(straight_route(stops)).await.unwrap();
    (DriveService::new(&state), route)
}

async fn setup_failing(stops: usize) -> (DriveService, Arc<FailingSessionRepository>, Route) {
    let routes = Arc::new(InMemoryRouteRepository::new());
    let sessions = Arc::new(FailingSessionRepository::new());
    let state = AppState::new(
        EnvironmentConfig::default(),
        routes.clone(),
        sessions.clone(),
        Arc::new(InMemoryGpsLogRepository::new()),
    );
    let route = routes.create(straight_route(stops)).await.unwrap();
    (DriveService::new(&state), sessions, route)
}

#[tokio::test]
async fn test_start_rejects_unknown_route_and_bad_radius() {
    let (service, route) = setup(3).await;

    let missing = Uuid::new_v4();
    let err = service.start(missing, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::RouteNotFound(id) if id == missing));

    let err = service.start(route.id, Some(0.0), None).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    // Llegada más amplia que la aproximación
    let err = service.start(route.id, Some(0.1), Some(0.3)).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    assert!(service.start(route.id, Some(0.2), Some(0.2)).await.is_ok());
    let stored = service.list_active().await.unwrap();
    assert_eq!(stored.len(), 1);
    service.end(stored[0].id).await.unwrap();

    assert!(service.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_start_uses_configured_defaults() {
    let (service, route) = setup(3).await;
    let session = service.start(route.id, None, Some(0.05)).await.unwrap();

    assert_eq!(session.settings.approach_radius, 0.5);
    assert_eq!(session.settings.arrival_radius, 0.05);
    assert_eq!(session.settings.hysteresis_factor, 1.2);
    assert_eq!(session.checkpoints.len(), 3);
    assert!(session
        .checkpoints
        .iter()
        .all(|c| c.status == CheckpointStatus::Pending));
}

#[tokio::test]
async fn test_completed_session_is_final() {
    let (service, route) = setup(3).await;
    let session = service.start(route.id, None, None).await.unwrap();

    let ended = service.end(session.id).await.unwrap();
    assert_eq!(ended.status, SessionStatus::Completed);
    assert!(ended.end_time.is_some());

    let err = service.submit_location(session.id, geo(37.5, 127.0)).await.unwrap_err();
    assert!(matches!(err, AppError::SessionNotFound(_)));

    let err = service.complete(session.id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::SessionNotFound(_)));

    // Terminar de nuevo no cambia nada
    let again = service.end(session.id).await.unwrap();
    assert_eq!(again.version, ended.version);
    assert_eq!(again.end_time, ended.end_time);

    // Sigue siendo consultable
    let fetched = service.get(session.id).await.unwrap();
    assert_eq!(fetched.status, SessionStatus::Completed);
    assert!(fetched
        .checkpoints
        .iter()
        .all(|c| c.status == CheckpointStatus::Pending));
}

#[tokio::test]
async fn test_manual_complete_is_idempotent() {
    let (service, route) = setup(5).await;
    let session = service.start(route.id, None, None).await.unwrap();

    let first = service.complete(session.id, 3).await.unwrap();
    let statuses: Vec<_> = first.checkpoints.iter().map(|c| c.status).collect();
    assert_eq!(
        statuses,
        vec![
            CheckpointStatus::Arrived,
            CheckpointStatus::Arrived,
            CheckpointStatus::Arrived,
            CheckpointStatus::Arrived,
            CheckpointStatus::Pending,
        ]
    );

    let second = service.complete(session.id, 3).await.unwrap();
    assert_eq!(second.version, first.version);
    for (a, b) in first.checkpoints.iter().zip(&second.checkpoints) {
        assert_eq!(a.status, b.status);
        assert_eq!(a.arrival_time, b.arrival_time);
    }

    let err = service.complete(session.id, 5).await.unwrap_err();
    assert!(matches!(err, AppError::CheckpointNotFound { index: 5, .. }));
}

#[tokio::test]
async fn test_manual_complete_never_regresses_departed() {
    let (service, route) = setup(3).await;
    let session = service.start(route.id, None, None).await.unwrap();

    service.submit_location(session.id, geo(37.5, 127.0)).await.unwrap();
    service.submit_location(session.id, geo(37.5, 127.0)).await.unwrap();
    let update = service.submit_location(session.id, geo(37.5045, 127.0)).await.unwrap();
    assert_eq!(update.session.checkpoints[0].status, CheckpointStatus::Departed);
    let departed_at = update.session.checkpoints[0].departure_time;

    let completed = service.complete(session.id, 1).await.unwrap();
    assert_eq!(completed.checkpoints[0].status, CheckpointStatus::Departed);
    assert_eq!(completed.checkpoints[0].departure_time, departed_at);
    assert_eq!(completed.checkpoints[1].status, CheckpointStatus::Arrived);
}

#[tokio::test]
async fn test_first_arrival_resets_start_time() {
    let (service, route) = setup(2).await;
    let session = service.start(route.id, None, None).await.unwrap();

    service.submit_location(session.id, geo(37.5, 127.0)).await.unwrap();
    let update = service.submit_location(session.id, geo(37.5, 127.0)).await.unwrap();

    let arrival = update.session.checkpoints[0].arrival_time.unwrap();
    assert_eq!(update.session.start_time, arrival);
    assert!(update.session.start_time >= session.start_time);
}

#[tokio::test]
async fn test_sparse_samples_recover_skipped_stops() {
    let (service, route) = setup(3).await;
    // Radio de aproximación pequeño: ninguna muestra cae cerca de las paradas
    let session = service.start(route.id, Some(0.3), Some(0.1)).await.unwrap();

    let first = service.submit_location(session.id, geo(37.5054, 127.0)).await.unwrap();
    assert!(first.outcome.transition.is_none());

    let second = service.submit_location(session.id, geo(37.512, 127.0)).await.unwrap();
    assert_eq!(second.session.checkpoints[0].status, CheckpointStatus::Departed);
    assert_eq!(second.session.checkpoints[1].status, CheckpointStatus::Pending);
    assert_eq!(second.outcome.message, "정류장0을(를) 통과했습니다.");

    let third = service.submit_location(session.id, geo(37.515, 127.0)).await.unwrap();
    let passed = &third.session.checkpoints[1];
    assert_eq!(passed.status, CheckpointStatus::Departed);
    assert!(passed.arrival_time.is_some());
    assert!(passed.departure_time.is_some());
    assert_eq!(third.outcome.message, "정류장1을(를) 통과했습니다.");
    assert_eq!(third.session.checkpoints[2].status, CheckpointStatus::Pending);
}

#[tokio::test]
async fn test_persistence_failure_discards_the_sample() {
    let (service, repo, route) = setup_failing(3).await;
    let session = service.start(route.id, None, None).await.unwrap();

    repo.set_failing(true);
    let err = service.submit_location(session.id, geo(37.5, 127.0)).await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));

    let err = service.complete(session.id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));

    let err = service.end(session.id).await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));

    repo.set_failing(false);
    let stored = service.get(session.id).await.unwrap();
    assert_eq!(stored.version, 0);
    assert_eq!(stored.status, SessionStatus::Running);
    assert!(stored.current_location.is_none());
    assert!(stored.previous_location.is_none());
    assert!(stored
        .checkpoints
        .iter()
        .all(|c| c.status == CheckpointStatus::Pending && c.min_distance.is_none()));

    // El sample perdido no se reintenta: el siguiente parte del estado guardado
    let update = service.submit_location(session.id, geo(37.5, 127.0)).await.unwrap();
    assert_eq!(update.session.checkpoints[0].status, CheckpointStatus::Approaching);
    assert!(update.session.previous_location.is_none());
    assert_eq!(update.session.version, 1);
}

#[tokio::test]
async fn test_concurrent_samples_are_serialized() {
    let (service, route) = setup(3).await;
    let service = Arc::new(service);
    let session = service.start(route.id, None, None).await.unwrap();

    let tasks = (0..10).map(|i| {
        let service = service.clone();
        let id = session.id;
        async move {
            let sample = geo(37.5 + i as f64 * 0.00005, 127.0);
            service.submit_location(id, sample).await
        }
    });
    let results = join_all(tasks).await;
    assert!(results.iter().all(|r| r.is_ok()));

    let stored = service.get(session.id).await.unwrap();
    assert_eq!(stored.version, 10);
    assert!(stored.current_location.is_some());
    assert!(stored.previous_location.is_some());
    // Todas las muestras quedan dentro de la llegada: approaching y luego arrived
    assert_eq!(stored.checkpoints[0].status, CheckpointStatus::Arrived);
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let (service, route) = setup(3).await;
    let service = Arc::new(service);
    let a = service.start(route.id, None, None).await.unwrap();
    let b = service.start(route.id, None, None).await.unwrap();

    let (ra, rb) = tokio::join!(
        service.submit_location(a.id, geo(37.5, 127.0)),
        service.submit_location(b.id, geo(37.509, 127.0)),
    );
    let ra = ra.unwrap();
    let rb = rb.unwrap();

    assert_eq!(ra.session.checkpoints[0].status, CheckpointStatus::Approaching);
    assert_eq!(rb.session.checkpoints[0].status, CheckpointStatus::Pending);
    assert_eq!(rb.session.checkpoints[1].status, CheckpointStatus::Approaching);

    assert_eq!(service.list_active().await.unwrap().len(), 2);
    service.end(a.id).await.unwrap();
    let active = service.list_active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, b.id);
}

#[tokio::test]
async fn test_session_locks_do_not_outlive_requests() {
    let state = AppState::in_memory(EnvironmentConfig::default());
    let route = state.routes.create(straight_route(3)).await.unwrap();
    let service = DriveService::new(&state);

    for _ in 0..50 {
        let id = Uuid::new_v4();
        assert!(service.submit_location(id, geo(37.5, 127.0)).await.is_err());
        assert!(service.complete(id, 0).await.is_err());
        assert!(service.end(id).await.is_err());
    }
    assert_eq!(state.session_locks.len().await, 0);

    let session = service.start(route.id, None, None).await.unwrap();
    service.submit_location(session.id, geo(37.5, 127.0)).await.unwrap();
    assert_eq!(state.session_locks.len().await, 0);

    service.end(session.id).await.unwrap();
    // Sesión terminada: todo se rechaza o no cambia, sin dejar locks
    assert!(service.submit_location(session.id, geo(37.5, 127.0)).await.is_err());
    assert!(service.complete(session.id, 0).await.is_err());
    service.end(session.id).await.unwrap();
    assert_eq!(state.session_locks.len().await, 0);
}
