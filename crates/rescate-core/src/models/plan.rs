//! Plan model
//!
//! Plans carry the subtype that selects an alert policy, the pool size for
//! flexible limits, benefit flags and overage billing information.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Plan subtype enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlanSubtype {
    /// Family plan with a shared pool of services
    #[serde(rename = "HELP")]
    Help,
    /// External affiliate billed directly to the company, unlimited
    #[serde(rename = "CASO_1")]
    Caso1,
    /// External affiliate with an individual annual quota and overage billing
    #[serde(rename = "CASO_2")]
    Caso2,
    /// Any other subtype (per-service tracked plans)
    #[default]
    #[serde(rename = "OTHER")]
    #[serde(other)]
    Other,
}

impl fmt::Display for PlanSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanSubtype::Help => write!(f, "HELP"),
            PlanSubtype::Caso1 => write!(f, "CASO_1"),
            PlanSubtype::Caso2 => write!(f, "CASO_2"),
            PlanSubtype::Other => write!(f, "OTHER"),
        }
    }
}

/// Overage billing information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingInfo {
    /// Price of each service beyond the quota
    #[serde(default)]
    pub cost_per_additional_service: Option<Decimal>,
}

/// Plan snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Plan {
    /// Plan subtype
    #[serde(default)]
    pub subtype: PlanSubtype,

    /// Human-readable plan name (e.g., "Plan Help")
    #[serde(default)]
    #[validate(length(min = 1, message = "El nombre del plan es obligatorio"))]
    pub name: String,

    /// Size of the shared service pool, if the plan has one
    #[serde(default)]
    pub total_services: Option<u32>,

    /// Benefit flags (benefit code -> enabled)
    #[serde(default)]
    pub benefits: Option<IndexMap<String, bool>>,

    /// Overage billing information
    #[serde(default)]
    pub billing_info: Option<BillingInfo>,
}

impl Plan {
    /// Enabled benefit codes, sorted; empty when the plan carries no benefits
    pub fn enabled_benefits(&self) -> Vec<String> {
        let mut enabled: Vec<String> = self
            .benefits
            .iter()
            .flatten()
            .filter(|(_, enabled)| **enabled)
            .map(|(code, _)| code.clone())
            .collect();
        enabled.sort();
        enabled
    }

    /// Overage price configured on the plan, if any
    pub fn cost_per_additional_service(&self) -> Option<Decimal> {
        self.billing_info
            .as_ref()
            .and_then(|info| info.cost_per_additional_service)
    }
}
