//! Configuration types shared across crates
//!
//! - `environment` - Environment detection and logging configuration

pub mod environment;

pub use environment::{Environment, LogFormat, LoggingConfig};
