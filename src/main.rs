use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};

use bus_tracking::config::EnvironmentConfig;
use bus_tracking::create_app;
use bus_tracking::database::DatabaseConnection;
use bus_tracking::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚌 Bus Tracking Server - Motor de progresión de checkpoints");
    info!("==========================================================");
    info!(
        "📐 Radios por defecto: aproximación {} km, llegada {} km, histéresis x{}",
        config.tracking.approach_radius_km,
        config.tracking.arrival_radius_km,
        config.tracking.hysteresis_factor
    );

    if config.is_production() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío en producción: se acepta cualquier origen");
    }

    // Inicializar almacenamiento
    let app_state = match config.database_url.clone() {
        Some(url) => {
            let db_connection = match DatabaseConnection::connect(&url).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(e);
                }
            };
            db_connection.run_migrations().await?;
            AppState::with_postgres(config.clone(), db_connection.pool().clone())
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida: usando almacenamiento en memoria (los datos se pierden al reiniciar)");
            AppState::in_memory(config.clone())
        }
    };

    let app = create_app(app_state);

    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{} ({})", addr, config.environment);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🗺️ Rutas:");
    info!("   POST /api/routes - Registrar ruta");
    info!("   GET  /api/routes - Listar rutas");
    info!("   GET  /api/routes/:id - Obtener ruta");
    info!("🚌 Sesiones de conducción:");
    info!("   POST  /api/drive/start - Iniciar sesión");
    info!("   POST  /api/drive/:id/location - Enviar ubicación");
    info!("   PATCH /api/drive/:id/checkpoint/:index/complete - Completado manual");
    info!("   POST  /api/drive/:id/end - Terminar sesión");
    info!("   GET   /api/drive/:id - Obtener sesión");
    info!("   GET   /api/drive/active/all - Sesiones en curso");
    info!("🛰️ Registros GPS:");
    info!("   POST /api/gps/log - Guardar registro GPS crudo");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
