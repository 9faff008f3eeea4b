//! Build information reported by `/version` and the startup banner

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: String,
    pub commit: String,
    pub date: String,
    pub built_by: String,
}

impl BuildInfo {
    /// Reads `BUILD_COMMIT`, `BUILD_DATE` and `BUILD_BY` at compile time.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("BUILD_COMMIT").unwrap_or("none").to_string(),
            date: option_env!("BUILD_DATE").unwrap_or("unknown").to_string(),
            built_by: option_env!("BUILD_BY").unwrap_or("unknown").to_string(),
        }
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        Self::current()
    }
}
