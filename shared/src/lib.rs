//! Shared utilities for the SMS channel workspace
//!
//! This crate provides functionality used by both the domain and the
//! infrastructure crates:
//! - Environment and logging configuration
//! - Tracing subscriber initialisation
//! - Phone number helpers (validation, masking for logs)

pub mod config;
pub mod logging;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{Environment, LogFormat, LoggingConfig};
pub use logging::init_tracing;
pub use utils::phone;
