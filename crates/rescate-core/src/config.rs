//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.
//!
//! Every policy literal of the entitlement engine lives here, so tuning a market
//! (thresholds, overage prices, unlimited markers) never touches policy code.

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::env;
use tracing::debug;

use crate::models::ServiceType;

/// Main application configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub entitlements: EntitlementConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Entitlement engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EntitlementConfig {
    /// Usage percentage at which a tracked service is flagged as near its limit
    #[serde(default = "default_near_limit_percent")]
    pub near_limit_percent: u32,

    /// Pool size assumed for flexible limits when the plan omits `total_services`
    #[serde(default = "default_total_services")]
    pub default_total_services: u32,

    /// Marker strings that exempt a service from numeric tracking
    #[serde(default = "default_unlimited_markers")]
    pub unlimited_markers: Vec<String>,

    /// Alert policy thresholds and prices
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_near_limit_percent() -> u32 {
    80
}

fn default_total_services() -> u32 {
    12
}

fn default_unlimited_markers() -> Vec<String> {
    vec![
        "ILIMITADO".to_string(),
        "ILIMITADA".to_string(),
        "UNLIMITED".to_string(),
    ]
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            near_limit_percent: default_near_limit_percent(),
            default_total_services: default_total_services(),
            unlimited_markers: default_unlimited_markers(),
            policy: PolicyConfig::default(),
        }
    }
}

impl EntitlementConfig {
    /// Check whether a string is one of the configured unlimited markers (case-insensitive)
    pub fn is_unlimited_marker(&self, value: &str) -> bool {
        let value = value.trim();
        self.unlimited_markers
            .iter()
            .any(|marker| marker.eq_ignore_ascii_case(value))
    }
}

/// Alert policy configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    /// Pooled (HELP) plans warn when remaining services are at or below this value
    #[serde(default = "default_pooled_warning")]
    pub pooled_warning_threshold: u32,

    /// Corporate plans warn when remaining services are at or below this value
    #[serde(default = "default_corporate_warning")]
    pub corporate_warning_threshold: u32,

    /// External company pool warns at or below this value
    #[serde(default = "default_company_pool_warning")]
    pub company_pool_warning_threshold: u32,

    /// External company pool warning becomes urgent at or below this value
    #[serde(default = "default_company_pool_urgent")]
    pub company_pool_urgent_threshold: u32,

    /// Price of an additional service on a pooled (HELP) plan
    #[serde(default = "default_help_additional_cost")]
    pub help_additional_cost: Decimal,

    /// Overage price for external affiliates when the plan has no billing info
    #[serde(default = "default_external_additional_cost")]
    pub default_external_additional_cost: Decimal,

    /// Per-service prices for tracked plans
    #[serde(default)]
    pub service_costs: ServiceCosts,
}

fn default_pooled_warning() -> u32 {
    2
}

fn default_corporate_warning() -> u32 {
    5
}

fn default_company_pool_warning() -> u32 {
    10
}

fn default_company_pool_urgent() -> u32 {
    5
}

fn default_help_additional_cost() -> Decimal {
    dec!(85000)
}

fn default_external_additional_cost() -> Decimal {
    dec!(100000)
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            pooled_warning_threshold: default_pooled_warning(),
            corporate_warning_threshold: default_corporate_warning(),
            company_pool_warning_threshold: default_company_pool_warning(),
            company_pool_urgent_threshold: default_company_pool_urgent(),
            help_additional_cost: default_help_additional_cost(),
            default_external_additional_cost: default_external_additional_cost(),
            service_costs: ServiceCosts::default(),
        }
    }
}

/// Per-service price table
///
/// Fields are named after the service codes in lowercase, which is how the
/// `config` crate normalizes keys anyway.
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceCosts {
    #[serde(default = "default_urgencia_cost")]
    pub urgencia: Decimal,

    #[serde(default = "default_medico_domicilio_cost")]
    pub medico_domicilio: Decimal,

    #[serde(default = "default_traslado_programado_cost")]
    pub traslado_programado: Decimal,

    #[serde(default = "default_zona_protegida_cost")]
    pub zona_protegida: Decimal,

    #[serde(default = "default_general_cost")]
    pub general: Decimal,

    /// Price used for service types missing from this table
    #[serde(default = "default_general_cost")]
    pub fallback: Decimal,
}

fn default_urgencia_cost() -> Decimal {
    dec!(85000)
}

fn default_medico_domicilio_cost() -> Decimal {
    dec!(95000)
}

fn default_traslado_programado_cost() -> Decimal {
    dec!(120000)
}

fn default_zona_protegida_cost() -> Decimal {
    dec!(150000)
}

fn default_general_cost() -> Decimal {
    dec!(85000)
}

impl Default for ServiceCosts {
    fn default() -> Self {
        Self {
            urgencia: default_urgencia_cost(),
            medico_domicilio: default_medico_domicilio_cost(),
            traslado_programado: default_traslado_programado_cost(),
            zona_protegida: default_zona_protegida_cost(),
            general: default_general_cost(),
            fallback: default_general_cost(),
        }
    }
}

impl ServiceCosts {
    /// Price of one additional service of the given type
    pub fn cost_for(&self, service_type: &ServiceType) -> Decimal {
        match service_type {
            ServiceType::Urgencia => self.urgencia,
            ServiceType::MedicoDomicilio => self.medico_domicilio,
            ServiceType::TrasladoProgramado => self.traslado_programado,
            ServiceType::ZonaProtegida => self.zona_protegida,
            ServiceType::General => self.general,
            ServiceType::Other(_) => self.fallback,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
        debug!(run_mode = %run_mode, "Loading configuration");

        let config = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with RESCATE_ prefix
            .add_source(
                Environment::with_prefix("RESCATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("RESCATE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
