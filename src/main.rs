use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use dotenvy::dotenv;

use scooter_tracking::api;
use scooter_tracking::config::environment::EnvironmentConfig;
use scooter_tracking::middleware::cors::cors_layer_from_config;
use scooter_tracking::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🛴 Scooter Tracking - Motor de sesiones de viaje");
    info!("================================================");

    let config = EnvironmentConfig::default();
    info!(
        "⚙️  Tick cada {}s | drenaje {}/kmh + {}/s | máx {} km/h",
        config.engine.tick_interval_secs,
        config.engine.drain_rate_per_kmh,
        config.engine.idle_drain_per_second,
        config.engine.max_speed_kmh,
    );

    let app_state = AppState::new(config.clone());

    let app = Router::new()
        .route("/ws", get(api::ws::ws_handler))
        .nest("/api", api::create_api_router())
        .layer(cors_layer_from_config(&config.cors_origins))
        .with_state(app_state);

    // Puerto del servidor
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /ws - Canal de eventos (WebSocket)");
    info!("   GET  /api/health - Health check");
    info!("   GET  /api/scooters - Scooters registrados");
    info!("   GET  /api/scooters/:id - Snapshot de un scooter");

    // Iniciar servidor en background
    let server_handle = tokio::spawn(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                error!("❌ Error del servidor: {}", e);
                e
            })
    });

    // Esperar a que el servidor termine
    if let Err(e) = server_handle.await? {
        error!("❌ Servidor terminó con error: {}", e);
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
