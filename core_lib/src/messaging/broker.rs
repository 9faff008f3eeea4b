use crate::config::KafkaConfig;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("no kafka brokers configured")]
    NoBrokers,

    #[error("no kafka broker reachable: {0}")]
    Unreachable(String),
}

/// Kafka bootstrap endpoint set.
///
/// Producing and consuming are left to a dedicated client; this type only
/// knows where the brokers are and whether any of them accepts connections.
#[derive(Debug, Clone)]
pub struct BrokerClient {
    brokers: Vec<String>,
    connect_timeout: Duration,
}

impl BrokerClient {
    pub fn new(config: &KafkaConfig) -> Result<Self, BrokerError> {
        let brokers: Vec<String> = config
            .brokers
            .iter()
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();

        if brokers.is_empty() {
            return Err(BrokerError::NoBrokers);
        }

        info!(
            "Kafka client configured: brokers={}, topic={}, group_id={}, security_protocol={}",
            brokers.join(","),
            config.topic,
            config.group_id,
            config.security_protocol
        );

        Ok(Self {
            brokers,
            connect_timeout: Duration::from_secs(config.connect_timeout_seconds),
        })
    }

    pub fn brokers(&self) -> &[String] {
        &self.brokers
    }

    /// Succeeds as soon as one broker accepts a TCP connection.
    pub async fn health_check(&self) -> Result<(), BrokerError> {
        let mut failures = Vec::with_capacity(self.brokers.len());

        for broker in &self.brokers {
            match timeout(self.connect_timeout, TcpStream::connect(broker.as_str())).await {
                Ok(Ok(_stream)) => {
                    debug!("Kafka broker {} reachable", broker);
                    return Ok(());
                }
                Ok(Err(e)) => failures.push(format!("{}: {}", broker, e)),
                Err(_) => failures.push(format!("{}: connect timed out", broker)),
            }
        }

        Err(BrokerError::Unreachable(failures.join("; ")))
    }
}
