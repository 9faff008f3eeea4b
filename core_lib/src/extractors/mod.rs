pub mod json;

pub use json::{ApiJson, ApiJsonRejection};
