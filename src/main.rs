use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use taxi_dispatch::config::{DatabaseConfig, EnvironmentConfig};
use taxi_dispatch::database::{health_check, DatabaseConnection};
use taxi_dispatch::routes::build_router;
use taxi_dispatch::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,taxi_dispatch=debug")),
        )
        .init();

    info!("🚕 Taxi Dispatch - API de despacho");
    info!("================================================");

    let config = EnvironmentConfig::from_env().context("Configuración del servidor inválida")?;
    let db_config = DatabaseConfig::from_env().context("Configuración de base de datos inválida")?;

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::connect(&db_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };
    health_check(db_connection.pool())
        .await
        .context("La base de datos no responde")?;
    info!("✅ PostgreSQL conectado");

    if config.is_development() {
        warn!("⚠️ Modo desarrollo ({})", config.environment);
    }

    let addr: SocketAddr = config.server_url().parse()?;
    let app = build_router(AppState::new(db_connection.into_pool(), config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Liveness");
    info!("🔑 Auth:      /api/auth/login, /api/auth/register, /api/auth/me");
    info!("🚕 Viajes:    /api/trips (assign, status, notes, vehicle/:id/active)");
    info!("🚗 Flota:     /api/vehicles, /api/drivers, /api/handover");
    info!("👥 Clientes:  /api/customers");
    info!("💰 Finanzas:  /api/transactions, /api/expenses, /api/reports");
    info!("🛠️ Admin:     /api/admin");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
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
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
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
