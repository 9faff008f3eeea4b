//! Request and response models

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct LogLevelRequest {
    #[serde(default)]
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogLevelResponse {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogLevelUpdated {
    pub level: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
    pub version: String,
}
