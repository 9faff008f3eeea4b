pub mod checks;

#[cfg(test)]
mod tests;

pub use checks::{
    CheckError, Checker, DependencyHealth, HealthChecker, HealthReport, HealthStatus,
    LivenessReport, READINESS_TIMEOUT,
};
