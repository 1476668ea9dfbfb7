use std::{sync::Arc, time::Duration};

use glowup::{
    AppState, Config, build_router, cors_layer, database,
    services::{
        admins::{SeedOutcome, ensure_seed_admin},
        mail::{BrevoMailer, SharedMailer},
        media::{CloudinaryStore, SharedMediaStore},
        notifications::NotificationQueue,
    },
    workers::notification_dispatch_worker,
};
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("glowup=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration, refusing to start");
    })?;
    tracing::debug!("Loaded configuration:\n{}", config);

    let pool = database::connect(&config.database).await?;
    database::migrate(&pool).await?;

    {
        let mut conn = pool.acquire().await?;
        let (admin, outcome) = ensure_seed_admin(&mut conn, &config.admin).await?;
        match outcome {
            SeedOutcome::Created => tracing::info!(email = %admin.email, "Seed administrator created"),
            SeedOutcome::Promoted => {
                tracing::info!(email = %admin.email, "Seed administrator promoted to superadmin")
            }
            SeedOutcome::PasswordReset => {
                tracing::info!(email = %admin.email, "Seed administrator password reset")
            }
            SeedOutcome::Unchanged => tracing::info!(email = %admin.email, "Seed administrator present"),
        }
    }

    let timeout = Duration::from_secs(config.server.http_timeout_seconds);
    let media: SharedMediaStore = Arc::new(CloudinaryStore::new(&config.storage, timeout)?);
    let mailer: SharedMailer = Arc::new(BrevoMailer::new(&config.mail, timeout)?);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let (notifier, receiver) = NotificationQueue::new();
    let worker = tokio::spawn(notification_dispatch_worker(
        receiver,
        mailer,
        config.mail.admin_email.clone(),
        shutdown_tx.subscribe(),
    ));

    let state = AppState::new(pool.clone(), config.jwt.clone(), media, notifier);
    let app = build_router(state, cors_layer(&config.server.cors_origin)?);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down background workers");
    let _ = shutdown_tx.send(());
    if let Err(e) = worker.await {
        tracing::warn!(error = %e, "Notification worker ended abnormally");
    }

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received");
}
