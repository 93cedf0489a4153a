//! Church Admin API server
//!
//! Main application entry point

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use church_admin::{
    config::Settings,
    database::{
        connection::{create_pool, run_migrations, DatabaseConfig},
        DatabaseService,
    },
    utils::{errors::configure_error_details, logging},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;
    configure_error_details(&settings.server.environment);

    info!("Starting {}...", church_admin::info());

    let database = if settings.uses_memory_store() {
        warn!("Using the in-memory store, data will not survive a restart");
        DatabaseService::in_memory()
    } else {
        info!("Connecting to database...");
        let pool = create_pool(&DatabaseConfig::from_settings(&settings.database)).await?;
        run_migrations(&pool).await?;
        DatabaseService::postgres(pool)
    };

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = AppState::new(settings, database);

    if state.settings.auth.seed_admin_email.is_some() && state.settings.auth.seed_admin_password.is_some() {
        match state.services.auth_service.seed_admin().await {
            Ok(outcome) => info!(outcome = %outcome.message, "Seed admin checked"),
            Err(e) => error!(error = %e, "Failed to seed admin account"),
        }
    }

    let app = church_admin::create_router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Church Admin API has been shut down.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
