//! CNIS Core — error type, configuration and heuristic policy constants.

pub mod config;
pub mod error;

pub use config::{AppConfig, DataPaths, HeuristicConfig};
pub use error::{Error, Result};
