//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use apalis_sql::{postgres::PostgresStorage, sqlx::postgres::PgPoolOptions};

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::{Config, SmsDelivery};
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database, LocalDisk};
use crate::jobs::sms_storage;
use crate::services::{LogSms, QueuedSms, Services, SmsSender};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Initialize database (applies pending migrations)
    let db = Database::connect(&config).await?;

    // Initialize Redis cache
    let cache = Cache::try_connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?;

    let sms = sms_sender(&config).await?;
    let trust_proxy = config.trust_proxy;
    let storage = Arc::new(LocalDisk::from_config(&config));
    tracing::info!(root = %config.storage_root, url = %config.storage_url, "Serving uploads");

    // Create application state with centralized service container
    // Uses Unit of Work internally for repository access
    let services = Services::from_connection(db.get_connection(), config.clone(), sms, storage);
    let cache = Arc::new(cache);
    let app_state = AppState::new(
        Arc::new(services),
        cache.clone(),
        Arc::new(db),
        cache,
        config,
    );

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    if trust_proxy {
        tracing::info!("Client addresses are taken from proxy headers");
    }
    tracing::info!("Server running on http://{}", addr);

    // Peer addresses feed the rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Pick the SMS transport configured by `SMS_DELIVERY`.
async fn sms_sender(config: &Config) -> AppResult<Arc<dyn SmsSender>> {
    match config.sms_delivery {
        SmsDelivery::Log => {
            tracing::warn!("SMS delivery set to log - codes are written to the log");
            Ok(Arc::new(LogSms))
        }
        SmsDelivery::Queue => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&config.database_url)
                .await
                .map_err(|e| AppError::internal(format!("Failed to connect job queue: {}", e)))?;

            PostgresStorage::setup(&pool)
                .await
                .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

            tracing::info!("SMS messages are queued for the job worker");
            Ok(Arc::new(QueuedSms::new(sms_storage(pool))))
        }
    }
}
