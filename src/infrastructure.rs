//! Infrastructure layer for HTTP fetching, HTML parsing, and app plumbing

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;

pub use config::{AppConfig, ConfigManager};
pub use http_client::{FetchError, HttpClient, HttpClientConfig};
