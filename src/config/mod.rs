//! Configuration management module
//!
//! Layering, lowest to highest: built-in defaults, the `.env` file,
//! process environment variables, command-line arguments. The merged
//! result is validated once at the end.

pub mod env;
pub mod parser;

pub use env::EnvManager;
pub use parser::{display_config_summary, load_config, ConfigParser};

pub use crate::models::Config;
