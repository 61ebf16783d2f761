//! Data models for probing, statistics and diagnosis

pub mod config;
pub mod diagnosis;
pub mod probe;
pub mod statistics;

// Re-export main model types
pub use config::Config;
pub use diagnosis::Diagnosis;
pub use probe::{ProbeConfig, ProbeResult};
pub use statistics::Statistics;
