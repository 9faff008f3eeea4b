pub mod level;

pub use level::{InvalidLevelError, LogLevel, LogLevelController};
