use crate::health::checks::{
    CheckError, Checker, DependencyHealth, HealthChecker, HealthReport, HealthStatus,
    READINESS_TIMEOUT,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

enum MockChecker {
    Ok,
    Fail(&'static str),
    Hang,
    Slow(Duration),
    Panic,
}

#[async_trait::async_trait]
impl Checker for MockChecker {
    async fn ping(&self) -> Result<(), CheckError> {
        match self {
            MockChecker::Ok => Ok(()),
            MockChecker::Fail(msg) => Err(CheckError::Unreachable(msg.to_string())),
            MockChecker::Hang => std::future::pending().await,
            MockChecker::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(())
            }
            MockChecker::Panic => panic!("checker blew up"),
        }
    }
}

struct CountingChecker(Arc<AtomicUsize>);

#[async_trait::async_trait]
impl Checker for CountingChecker {
    async fn ping(&self) -> Result<(), CheckError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_health_status_display() {
    assert_eq!(HealthStatus::Healthy.to_string(), "healthy");
    assert_eq!(HealthStatus::Unhealthy.to_string(), "unhealthy");
}

#[test]
fn test_report_status_follows_details() {
    let report = HealthReport::from_details(BTreeMap::new());
    assert_eq!(report.status, HealthStatus::Healthy);

    let mut details = BTreeMap::new();
    details.insert("a".to_string(), DependencyHealth::healthy());
    details.insert("b".to_string(), DependencyHealth::healthy());
    assert!(HealthReport::from_details(details.clone()).is_healthy());

    details.insert("c".to_string(), DependencyHealth::unhealthy("down"));
    let report = HealthReport::from_details(details);
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert!(!report.is_healthy());
}

#[test]
fn test_liveness_ignores_dependencies() {
    let checker = HealthChecker::new()
        .with_checker("database", MockChecker::Fail("connection refused"))
        .with_checker("kafka", MockChecker::Hang);

    let report = checker.liveness();
    assert_eq!(report.status, HealthStatus::Healthy);
    assert!(report.timestamp.timestamp() > 0);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_readiness_all_healthy() {
    let checker = HealthChecker::new()
        .with_checker("a", MockChecker::Ok)
        .with_checker("b", MockChecker::Ok);

    let report = checker.readiness(None).await;

    assert_eq!(report.status, HealthStatus::Healthy);
    assert_eq!(report.details.len(), 2);
    assert_eq!(report.details["a"], DependencyHealth::healthy());
    assert_eq!(report.details["b"], DependencyHealth::healthy());
}

#[tokio::test]
async fn test_readiness_matrix() {
    let cases = [
        (true, true, HealthStatus::Healthy),
        (false, true, HealthStatus::Unhealthy),
        (true, false, HealthStatus::Unhealthy),
        (false, false, HealthStatus::Unhealthy),
    ];

    for (db_ok, kafka_ok, expected) in cases {
        let db = if db_ok {
            MockChecker::Ok
        } else {
            MockChecker::Fail("connection refused")
        };
        let kafka = if kafka_ok {
            MockChecker::Ok
        } else {
            MockChecker::Fail("broker not available")
        };

        let checker = HealthChecker::new()
            .with_checker("database", db)
            .with_checker("kafka", kafka);
        let report = checker.readiness(None).await;

        assert_eq!(report.status, expected, "db_ok={} kafka_ok={}", db_ok, kafka_ok);
        assert_eq!(report.details.len(), 2);

        let database = &report.details["database"];
        if db_ok {
            assert_eq!(database.status, HealthStatus::Healthy);
            assert!(database.error.is_none());
        } else {
            assert_eq!(database.status, HealthStatus::Unhealthy);
            assert_eq!(database.error.as_deref(), Some("connection refused"));
        }

        let kafka = &report.details["kafka"];
        if kafka_ok {
            assert!(kafka.error.is_none());
        } else {
            assert_eq!(kafka.error.as_deref(), Some("broker not available"));
        }
    }
}

#[tokio::test]
async fn test_readiness_report_json_shape() {
    let checker = HealthChecker::new()
        .with_checker("database", MockChecker::Fail("connection refused"))
        .with_checker("kafka", MockChecker::Ok);

    let report = checker.readiness(None).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["status"], "unhealthy");
    assert!(json["timestamp"].is_string());
    assert_eq!(
        json["details"],
        serde_json::json!({
            "database": {"status": "unhealthy", "error": "connection refused"},
            "kafka": {"status": "healthy"}
        })
    );
}

#[tokio::test]
async fn test_readiness_without_checkers_omits_details() {
    let report = HealthChecker::new().readiness(None).await;

    assert!(report.is_healthy());
    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn test_readiness_pings_each_checker_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let checker = HealthChecker::new()
        .with_checker("one", CountingChecker(calls.clone()))
        .with_checker("two", CountingChecker(calls.clone()))
        .with_checker("three", CountingChecker(calls.clone()));

    let report = checker.readiness(None).await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(report.details.len(), 3);
    let names: Vec<_> = checker.names().collect();
    assert_eq!(names, vec!["one", "three", "two"]);
}

#[tokio::test]
async fn test_panicking_checker_is_isolated() {
    let checker = HealthChecker::new()
        .with_checker("broken", MockChecker::Panic)
        .with_checker("fine", MockChecker::Ok);

    let report = checker.readiness(None).await;

    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert_eq!(report.details["broken"].error.as_deref(), Some("health check panicked"));
    assert_eq!(report.details["fine"], DependencyHealth::healthy());
}

#[tokio::test(start_paused = true)]
async fn test_hanging_checker_stops_at_readiness_timeout() {
    let checker = HealthChecker::new()
        .with_checker("database", MockChecker::Hang)
        .with_checker("kafka", MockChecker::Ok);

    let start = Instant::now();
    let report = checker.readiness(None).await;
    let elapsed = start.elapsed();

    assert!(elapsed >= READINESS_TIMEOUT);
    assert!(elapsed < READINESS_TIMEOUT + Duration::from_millis(100));
    assert_eq!(report.status, HealthStatus::Unhealthy);
    assert_eq!(report.details["database"].error.as_deref(), Some("health check timed out"));
    assert_eq!(report.details["kafka"], DependencyHealth::healthy());
}

#[tokio::test(start_paused = true)]
async fn test_caller_deadline_caps_readiness() {
    let checker = HealthChecker::new().with_checker("database", MockChecker::Hang);

    let start = Instant::now();
    let report = checker
        .readiness(Some(start + Duration::from_secs(1)))
        .await;

    assert!(start.elapsed() < Duration::from_secs(2));
    assert_eq!(report.status, HealthStatus::Unhealthy);
}

#[tokio::test(start_paused = true)]
async fn test_later_caller_deadline_does_not_extend_timeout() {
    let checker = HealthChecker::new().with_checker("database", MockChecker::Hang);

    let start = Instant::now();
    checker
        .readiness(Some(start + Duration::from_secs(60)))
        .await;

    assert!(start.elapsed() < READINESS_TIMEOUT + Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_slow_checker_within_deadline_is_healthy() {
    let checker = HealthChecker::new()
        .with_checker("slow", MockChecker::Slow(Duration::from_secs(2)))
        .with_checker("slower", MockChecker::Slow(Duration::from_secs(3)));

    let start = Instant::now();
    let report = checker.readiness(None).await;

    // Pings run in parallel, so the total is the slowest ping, not the sum.
    assert!(start.elapsed() < Duration::from_secs(4));
    assert!(report.is_healthy());
}

#[tokio::test(start_paused = true)]
async fn test_custom_timeout() {
    let checker = HealthChecker::new()
        .with_timeout(Duration::from_millis(250))
        .with_checker("slow", MockChecker::Slow(Duration::from_secs(1)));

    let report = checker.readiness(None).await;
    assert_eq!(report.details["slow"].error.as_deref(), Some("health check timed out"));
}
