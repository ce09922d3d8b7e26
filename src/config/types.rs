//! Configuration types for iam-krn
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::store::Effect;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Statement source for evaluations
    pub store: StoreConfig,

    /// Random statement generation
    pub generator: GeneratorConfig,
}

/// Statement store configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file holding an array of statements; generated statements are
    /// used when unset
    pub statements_path: Option<String>,

    /// Effect filter applied to evaluations unless given on the command line
    pub effect: Option<Effect>,
}

/// Statement generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of distinct services
    pub services: usize,

    /// Statements generated per service, each for a fresh tenant
    pub statements_per_service: usize,

    /// Resources per statement
    pub resources_per_statement: usize,

    /// Principals per statement
    pub principals_per_statement: usize,

    /// Every n-th statement of a service also covers the whole service
    /// (0 disables)
    pub wildcard_every: usize,

    /// RNG seed for reproducible output
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            services: 10,
            statements_per_service: 100,
            resources_per_statement: 10,
            principals_per_statement: 5,
            wildcard_every: 10,
            seed: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
