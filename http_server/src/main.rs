//! Main entry point for the base microservice binary

use anyhow::Result;
use core_lib::{
    config::LoggingConfig, create_app, run_server, AppConfig, AppState, BrokerClient, BuildInfo,
    DatabaseManager, LogLevel, LogLevelController,
};
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    let initial_level = LogLevel::parse_or_default(Some(config.logging.level.as_str()));
    let log_levels = LogLevelController::new(initial_level);
    init_tracing(&log_levels, &config.logging);

    if config.logging.level.parse::<LogLevel>().is_err() {
        warn!(
            "Unrecognized log level '{}', using {}",
            config.logging.level, initial_level
        );
    }

    let build = BuildInfo::current();
    info!(
        version = %build.version,
        commit = %build.commit,
        built_at = %build.date,
        built_by = %build.built_by,
        "base-ms starting"
    );

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let mut state = AppState::new(log_levels)
        .with_request_timeout(config.server.request_timeout());

    if config.database.enabled {
        let db_manager = DatabaseManager::connect(&config.database)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
        state = state.with_database(db_manager);
    } else {
        info!("Database disabled");
    }

    if config.kafka.enabled {
        let broker = BrokerClient::new(&config.kafka)
            .map_err(|e| anyhow::anyhow!("Failed to configure kafka: {}", e))?;

        if let Err(e) = broker.health_check().await {
            warn!(
                "Kafka not reachable at startup ({}): {}",
                broker.brokers().join(","),
                e
            );
        }
        state = state.with_broker(broker);
    } else {
        info!("Kafka disabled");
    }

    let state = state.with_health_checker();
    let db_manager = state.db_manager.clone();

    info!(
        "Readiness checks: [{}]",
        state.health_checker.names().collect::<Vec<_>>().join(", ")
    );

    let app = create_app(state);

    run_server(app, addr, config.server.shutdown_timeout()).await?;

    if let Some(db_manager) = db_manager {
        db_manager.close().await;
    }

    info!("Server stopped");
    Ok(())
}

/// Installs the global subscriber. Every record goes through `log_levels`,
/// so level changes made through the admin API apply immediately.
fn init_tracing(log_levels: &LogLevelController, logging: &LoggingConfig) {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if logging.is_json() {
        tracing_subscriber::registry()
            .with(fmt_layer.json().with_filter(log_levels.clone()))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer.pretty().with_filter(log_levels.clone()))
            .init();
    }
}
