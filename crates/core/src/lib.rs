pub mod config;

pub use config::{BigQueryConfig, Config, GcpConfig, ServerConfig};
