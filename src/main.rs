//! EstimateX server
//!
//! Loads configuration, wires adapters to the room use cases and serves
//! HTTP plus live WebSocket updates until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use estimatex::adapters::http::{app_router, RoomAppState};
use estimatex::adapters::websocket::LiveState;
use estimatex::adapters::{
    InMemoryEventBus, InMemoryRoomRepository, JwtCredentialService, RedisEventListener,
    RedisEventPublisher, RedisRoomRepository, RoomChannels,
};
use estimatex::application::NotificationRelay;
use estimatex::config::AppConfig;
use estimatex::ports::{CredentialService, EventPublisher, RoomRepository};

/// Pause before resubscribing after the fanout listener loses Redis.
const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    config.validate().map_err(|e| {
        error!(error = %e, "invalid configuration");
        e
    })?;

    info!(
        environment = ?config.server.environment,
        redis = config.redis.is_some(),
        "starting EstimateX"
    );

    let credentials: Arc<dyn CredentialService> =
        Arc::new(JwtCredentialService::from_config(&config.auth));
    let channels = Arc::new(RoomChannels::new(config.events.push_channel_capacity));
    let relay = Arc::new(NotificationRelay::new(channels.clone()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (repository, event_publisher, listener_task): (
        Arc<dyn RoomRepository>,
        Arc<dyn EventPublisher>,
        Option<tokio::task::JoinHandle<()>>,
    ) = match &config.redis {
        Some(redis_config) => {
            let repository = RedisRoomRepository::connect(redis_config).await?;

            let client = redis::Client::open(redis_config.url.as_str())?;
            let conn = client.get_multiplexed_tokio_connection().await?;
            let publisher = RedisEventPublisher::new(
                conn,
                config.events.channel_prefix.clone(),
                redis_config.timeout(),
            );

            let listener = Arc::new(RedisEventListener::new(
                client,
                config.events.channel_prefix.clone(),
            ));
            relay.register(listener.as_ref());
            let task = tokio::spawn(async move {
                listener
                    .supervise(shutdown_rx, LISTENER_RETRY_DELAY)
                    .await;
            });

            info!(key_prefix = %redis_config.key_prefix, "using Redis store and fanout");
            let repository: Arc<dyn RoomRepository> = Arc::new(repository);
            let publisher: Arc<dyn EventPublisher> = Arc::new(publisher);
            (repository, publisher, Some(task))
        }
        None => {
            let bus = Arc::new(InMemoryEventBus::new());
            relay.register(bus.as_ref());
            info!("no Redis configured, rooms live in process memory");
            let repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
            let publisher: Arc<dyn EventPublisher> = bus;
            (repository, publisher, None)
        }
    };

    let app = app_router(
        RoomAppState {
            repository,
            event_publisher,
            credentials: credentials.clone(),
        },
        LiveState::new(channels, credentials),
        config.server.request_timeout(),
        &config.server.cors_origins_list(),
    );

    let addr = config.server.socket_addr().map_err(|e| {
        error!(host = %config.server.host, error = %e, "invalid bind address");
        e
    })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the fanout listener after in-flight requests have drained
    let _ = shutdown_tx.send(true);
    if let Some(task) = listener_task {
        let _ = task.await;
    }

    info!("shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured level; JSON lines in production.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let (json, pretty) = if config.is_production() {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("received SIGINT, shutting down"),
            Err(e) => error!(error = %e, "failed to listen for SIGINT"),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received SIGTERM, shutting down");
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
