//! Core library for the base microservice: probes, runtime log-level control
//! and the router that exposes them.

pub mod config;
pub mod database;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod messaging;
pub mod middleware;
pub mod models;
pub mod version;

pub use config::AppConfig;
pub use database::{get_database_pool, DatabaseManager};
pub use error::{AppError, Result};
pub use handlers::routes::create_routes;
pub use health::{Checker, HealthChecker, HealthReport, HealthStatus, LivenessReport};
pub use logging::{LogLevel, LogLevelController};
pub use messaging::BrokerClient;
pub use version::BuildInfo;

use axum::Router;
use std::future::IntoFuture;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{signal, sync::Notify};
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub app_name: String,
    pub version: String,
    pub build_info: BuildInfo,
    pub log_levels: LogLevelController,
    pub db_manager: Option<DatabaseManager>,
    pub broker: Option<BrokerClient>,
    pub health_checker: Arc<HealthChecker>,
    pub request_timeout: Duration,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LogLevelController::default())
    }
}

impl AppState {
    pub fn new(log_levels: LogLevelController) -> Self {
        let build_info = BuildInfo::current();

        Self {
            app_name: "Rust Base Microservice".to_string(),
            version: build_info.version.clone(),
            build_info,
            log_levels,
            db_manager: None,
            broker: None,
            health_checker: Arc::new(HealthChecker::new()),
            request_timeout: AppConfig::default().server.request_timeout(),
        }
    }

    pub fn with_database(mut self, db_manager: DatabaseManager) -> Self {
        self.db_manager = Some(db_manager);
        self
    }

    pub fn with_broker(mut self, broker: BrokerClient) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Registers a checker for every configured dependency.
    pub fn with_health_checker(mut self) -> Self {
        let health_checker = HealthChecker::from_app_state(&self);
        self.health_checker = Arc::new(health_checker);
        self
    }

    pub fn with_custom_health_checker(mut self, health_checker: HealthChecker) -> Self {
        self.health_checker = Arc::new(health_checker);
        self
    }
}

pub fn create_app(state: AppState) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .merge(create_routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::logging_layer())
        .with_state(state)
}

/// Serves `app` until Ctrl+C or SIGTERM, then drains in-flight requests for
/// at most `shutdown_timeout`.
pub async fn run_server(app: Router, addr: SocketAddr, shutdown_timeout: Duration) -> Result<()> {
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let app = app.into_make_service_with_connect_info::<SocketAddr>();

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = Arc::clone(&shutdown);
            async move { shutdown.notified().await }
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result.map_err(Into::into),
        _ = shutdown_signal() => shutdown.notify_one(),
    }

    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(result) => result?,
        Err(_) => warn!("Graceful shutdown timed out after {:?}", shutdown_timeout),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
