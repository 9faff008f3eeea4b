//! Dependency health checks and readiness aggregation

use crate::{database::DatabaseManager, messaging::BrokerClient, AppState};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, warn};

/// Ceiling applied to every readiness check, shared by all dependencies.
pub const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("{0}")]
    Unreachable(String),

    #[error("health check timed out")]
    Timeout,

    #[error("health check panicked")]
    Panicked,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyHealth {
    pub status: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DependencyHealth {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            error: Some(error.into()),
        }
    }
}

/// Result of a readiness check. Overall status is unhealthy iff any
/// dependency is unhealthy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, DependencyHealth>,
}

impl HealthReport {
    pub fn from_details(details: BTreeMap<String, DependencyHealth>) -> Self {
        let status = if details.values().any(|d| d.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        };

        Self {
            status,
            timestamp: chrono::Utc::now(),
            details,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessReport {
    pub status: HealthStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// A dependency that can report whether it is currently reachable.
///
/// The aggregator enforces the readiness deadline by dropping the ping
/// future, so implementations must be cancel-safe. Callers outside the
/// aggregator get no deadline beyond what the client itself applies (the
/// database pool's acquire timeout, the broker connect timeout).
#[async_trait::async_trait]
pub trait Checker: Send + Sync {
    async fn ping(&self) -> Result<(), CheckError>;
}

#[async_trait::async_trait]
impl Checker for DatabaseManager {
    async fn ping(&self) -> Result<(), CheckError> {
        self.health_check()
            .await
            .map_err(|e| CheckError::Unreachable(e.to_string()))
    }
}

#[async_trait::async_trait]
impl Checker for BrokerClient {
    async fn ping(&self) -> Result<(), CheckError> {
        self.health_check()
            .await
            .map_err(|e| CheckError::Unreachable(e.to_string()))
    }
}

pub struct HealthChecker {
    checks: BTreeMap<String, Arc<dyn Checker>>,
    timeout: Duration,
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            checks: BTreeMap::new(),
            timeout: READINESS_TIMEOUT,
        }
    }

    /// Registers `checker` under `name`, replacing any previous checker
    /// with the same name.
    pub fn with_checker<C>(mut self, name: impl Into<String>, checker: C) -> Self
    where
        C: Checker + 'static,
    {
        self.checks.insert(name.into(), Arc::new(checker));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.checks.keys().map(String::as_str)
    }

    pub fn liveness(&self) -> LivenessReport {
        LivenessReport {
            status: HealthStatus::Healthy,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Pings every registered dependency in parallel.
    ///
    /// All pings share one deadline: the readiness timeout from now, or the
    /// caller's deadline when that comes first. Dropping the returned future
    /// aborts any ping still in flight.
    pub async fn readiness(&self, caller_deadline: Option<Instant>) -> HealthReport {
        let mut deadline = Instant::now() + self.timeout;
        if let Some(caller_deadline) = caller_deadline {
            deadline = deadline.min(caller_deadline);
        }

        let mut pings = JoinSet::new();
        for (name, checker) in &self.checks {
            let name = name.clone();
            let checker = Arc::clone(checker);

            pings.spawn(async move {
                let ping = AssertUnwindSafe(checker.ping()).catch_unwind();
                let result = match timeout_at(deadline, ping).await {
                    Ok(Ok(result)) => result,
                    Ok(Err(_)) => Err(CheckError::Panicked),
                    Err(_) => Err(CheckError::Timeout),
                };
                (name, result)
            });
        }

        let mut details = BTreeMap::new();
        while let Some(joined) = pings.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    details.insert(name, DependencyHealth::healthy());
                }
                Ok((name, Err(e))) => {
                    warn!(dependency = %name, error = %e, "Dependency health check failed");
                    details.insert(name, DependencyHealth::unhealthy(e.to_string()));
                }
                Err(e) => {
                    error!("Health check task failed: {}", e);
                }
            }
        }

        for name in self.checks.keys() {
            if !details.contains_key(name) {
                details.insert(
                    name.clone(),
                    DependencyHealth::unhealthy("health check task failed"),
                );
            }
        }

        let report = HealthReport::from_details(details);
        debug!("Readiness check completed - Overall status: {}", report.status);
        report
    }
}

impl HealthChecker {
    pub fn from_app_state(state: &AppState) -> Self {
        let mut checker = HealthChecker::new();

        if let Some(db_manager) = &state.db_manager {
            checker = checker.with_checker("database", db_manager.clone());
        }

        if let Some(broker) = &state.broker {
            checker = checker.with_checker("kafka", broker.clone());
        }

        checker
    }
}
