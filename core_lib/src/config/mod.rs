pub mod settings;

pub use settings::{AppConfig, DatabaseConfig, KafkaConfig, LoggingConfig, ServerConfig};
