pub mod request;

pub use request::{HelloResponse, LogLevelRequest, LogLevelResponse, LogLevelUpdated};
