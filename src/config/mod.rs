//! Configuration module for Geo-Lens
//!
//! Handles loading, parsing, and validating TOML configuration files.

mod parser;
mod types;

pub use parser::{load_config, validate_config};
pub use types::{AnalysisConfig, Config, LimitsConfig, OutputConfig, ScraperConfig};
