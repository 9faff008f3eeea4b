use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SSL_MODES: [&str; 6] = ["disable", "allow", "prefer", "require", "verify-ca", "verify-full"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub kafka: KafkaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub shutdown_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub ssl_mode: String,
    pub max_open_connections: u32,
    pub max_idle_connections: u32,
    pub connection_max_lifetime_minutes: u64,
    pub acquire_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    pub enabled: bool,
    pub brokers: Vec<String>,
    pub topic: String,
    pub group_id: String,
    pub security_protocol: String,
    pub connect_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            database: DatabaseConfig::default(),
            kafka: KafkaConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 15,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "basems".to_string(),
            ssl_mode: "disable".to_string(),
            max_open_connections: 25,
            max_idle_connections: 5,
            connection_max_lifetime_minutes: 5,
            acquire_timeout_seconds: 5,
        }
    }
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            brokers: vec!["localhost:9092".to_string()],
            topic: "events".to_string(),
            group_id: "base-ms".to_string(),
            security_protocol: "PLAINTEXT".to_string(),
            connect_timeout_seconds: 3,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl AppConfig {
    /// Defaults, then `config.toml` if present, then `APP_*` variables
    /// (`APP_SERVER__PORT`, `APP_KAFKA__BROKERS=a:9092,b:9092`), then the
    /// plain `PORT`, `LOG_LEVEL` and `LOG_FORMAT` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(path).required(false));

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("kafka.brokers")
                .try_parsing(true),
        );

        builder = builder
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("logging.level", std::env::var("LOG_LEVEL").ok())?
            .set_override_option("logging.format", std::env::var("LOG_FORMAT").ok())?;

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::Message(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.database.enabled {
            if self.database.host.is_empty() || self.database.name.is_empty() {
                return Err(ConfigError::Message(
                    "Database host and name are required when the database is enabled".to_string(),
                ));
            }

            if self.database.max_open_connections == 0 {
                return Err(ConfigError::Message(
                    "Database max open connections must be greater than 0".to_string(),
                ));
            }

            if !SSL_MODES.contains(&self.database.ssl_mode.as_str()) {
                return Err(ConfigError::Message(format!(
                    "Unsupported database ssl mode: {}",
                    self.database.ssl_mode
                )));
            }
        }

        if self.kafka.enabled && self.kafka.brokers.iter().all(|b| b.trim().is_empty()) {
            return Err(ConfigError::Message(
                "At least one Kafka broker is required when Kafka is enabled".to_string(),
            ));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
