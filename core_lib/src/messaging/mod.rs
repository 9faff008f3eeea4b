//! Message broker connectivity

pub mod broker;

pub use broker::{BrokerClient, BrokerError};
