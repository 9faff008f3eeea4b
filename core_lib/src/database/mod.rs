pub mod connection;

pub use connection::{connect_options, get_database_pool, DatabaseManager};
