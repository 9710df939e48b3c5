use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

use adinvoice_api::{build_router, AppState};
use adinvoice_infrastructure::{create_pool, run_control_migrations, PgTenantDatabases};
use adinvoice_shared::config::AppConfig;
use adinvoice_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env, config/*.toml, APP__* variables)
    let config = AppConfig::load().context("failed to load configuration")?;

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_telemetry(&config.log);

    info!("{} starting ({})", config.app.name, config.app.env);

    // Control database
    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to the control database")?;
    run_control_migrations(&pool)
        .await
        .context("failed to migrate the control database")?;
    info!("Control database ready");

    // Tenant pool registry
    let databases = Arc::new(
        PgTenantDatabases::new(pool.clone(), &config.database.url, config.tenancy.clone())
            .context("failed to initialise tenant databases")?,
    );

    let state = AppState::new(config.clone(), pool, databases.clone());
    let idle_sweeper = databases.clone().spawn_idle_sweeper();

    if config.tenancy.migrate_on_startup {
        match state.tenants.migrate_all().await {
            Ok(count) => info!("Migrated {} tenant database(s)", count),
            Err(e) => warn!("Tenant migrations incomplete: {}", e),
        }
    }

    if let (Some(email), Some(password)) = (
        config.bootstrap.superadmin_email.as_deref(),
        config.bootstrap.superadmin_password.as_deref(),
    ) {
        if let Err(e) = state.auth.bootstrap_superadmin(email, password).await {
            error!("Super-admin bootstrap failed: {}", e);
        }
    }

    let app = build_router(state);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse().context("invalid app.host")?;
    let addr = SocketAddr::from((host, config.app.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    idle_sweeper.abort();
    databases.close_all().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
