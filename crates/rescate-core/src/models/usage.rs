//! Service usage model
//!
//! Current-period usage comes in three shapes depending on the plan:
//! a per-service breakdown, a pooled counter pair, or an individual quota
//! split from a company pool.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AppError;
use crate::AppResult;

/// Service type code
///
/// Known codes get their own variant; anything else is carried verbatim so
/// that unknown services still round-trip and render.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceType {
    Urgencia,
    MedicoDomicilio,
    TrasladoProgramado,
    ZonaProtegida,
    General,
    Other(String),
}

impl ServiceType {
    /// Canonical code of the service type
    pub fn code(&self) -> &str {
        match self {
            ServiceType::Urgencia => "URGENCIA",
            ServiceType::MedicoDomicilio => "MEDICO_DOMICILIO",
            ServiceType::TrasladoProgramado => "TRASLADO_PROGRAMADO",
            ServiceType::ZonaProtegida => "ZONA_PROTEGIDA",
            ServiceType::General => "GENERAL",
            ServiceType::Other(code) => code,
        }
    }

    /// Whether the code is one the catalog knows
    pub fn is_known(&self) -> bool {
        !matches!(self, ServiceType::Other(_))
    }
}

impl From<&str> for ServiceType {
    fn from(code: &str) -> Self {
        match code {
            "URGENCIA" => ServiceType::Urgencia,
            "MEDICO_DOMICILIO" => ServiceType::MedicoDomicilio,
            "TRASLADO_PROGRAMADO" => ServiceType::TrasladoProgramado,
            "ZONA_PROTEGIDA" => ServiceType::ZonaProtegida,
            "GENERAL" => ServiceType::General,
            other => ServiceType::Other(other.to_string()),
        }
    }
}

impl From<String> for ServiceType {
    fn from(code: String) -> Self {
        ServiceType::from(code.as_str())
    }
}

impl From<ServiceType> for String {
    fn from(service_type: ServiceType) -> Self {
        service_type.code().to_string()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One entry of a per-service usage breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UsageEntry {
    /// Counted against a numeric cap
    Tracked { used: u32, limit: u32 },
    /// Exempt from numeric tracking (marker string, e.g. "ILIMITADO")
    Unlimited(String),
}

/// Pooled counters shared by every service type (HELP and corporate plans)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PooledUsage {
    pub remaining_services: u32,
    pub used_services: u32,
}

impl PooledUsage {
    /// Remaining services, derived as `total - used`
    ///
    /// `total` is the plan's pool size; when the plan does not state one, the
    /// pool is whatever the counters add up to.
    pub fn remaining(&self, total: Option<u32>) -> u32 {
        let total =
            total.unwrap_or_else(|| self.used_services.saturating_add(self.remaining_services));
        total.saturating_sub(self.used_services)
    }
}

/// Company-level pool for external affiliates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyUsage {
    pub general_services_remaining: u32,
}

/// Individual quota split from a company pool (external affiliates)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitUsage {
    pub individual_remaining: u32,
    pub company: CompanyUsage,

    /// Overage services billed this period
    #[serde(default)]
    pub additional_services_billed: u32,
}

/// Current-period usage snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceUsage {
    Split(SplitUsage),
    Pooled(PooledUsage),
    Breakdown {
        breakdown: IndexMap<ServiceType, UsageEntry>,
    },
}

impl ServiceUsage {
    /// Short name of the usage shape, for logs and error messages
    pub fn shape(&self) -> &'static str {
        match self {
            ServiceUsage::Split(_) => "split",
            ServiceUsage::Pooled(_) => "pooled",
            ServiceUsage::Breakdown { .. } => "breakdown",
        }
    }

    /// Counter advanced by each purchase of `service_type`
    ///
    /// Purchase offers carry this value so a confirmation only applies to the
    /// state it was offered against. `None` when the service cannot be
    /// purchased in this shape.
    pub fn purchase_counter(&self, service_type: &ServiceType) -> Option<u32> {
        match self {
            ServiceUsage::Breakdown { breakdown } => match breakdown.get(service_type) {
                Some(UsageEntry::Tracked { used, .. }) => Some(*used),
                _ => None,
            },
            ServiceUsage::Pooled(pool) => Some(pool.used_services),
            ServiceUsage::Split(split) => Some(split.additional_services_billed),
        }
    }

    /// Consume one service within the current allowance
    ///
    /// Refuses when the allowance is exhausted, so `used <= limit` and
    /// `remaining >= 0` hold after every successful call. Unlimited entries
    /// are accepted without counting.
    pub fn consume(
        &mut self,
        service_type: &ServiceType,
        pool_total: Option<u32>,
    ) -> AppResult<()> {
        match self {
            ServiceUsage::Breakdown { breakdown } => match breakdown.get_mut(service_type) {
                None => Err(AppError::ServiceNotCovered(service_type.to_string())),
                Some(UsageEntry::Unlimited(_)) => Ok(()),
                Some(UsageEntry::Tracked { used, limit }) => {
                    if *used >= *limit {
                        return Err(AppError::ServiceExhausted(service_type.to_string()));
                    }
                    *used = increment(*used, service_type)?;
                    Ok(())
                }
            },
            ServiceUsage::Pooled(pool) => {
                let remaining = pool.remaining(pool_total);
                if remaining == 0 {
                    return Err(AppError::ServiceExhausted(service_type.to_string()));
                }
                pool.used_services = increment(pool.used_services, service_type)?;
                pool.remaining_services = remaining - 1;
                Ok(())
            }
            ServiceUsage::Split(split) => {
                if split.individual_remaining == 0 {
                    return Err(AppError::ServiceExhausted(service_type.to_string()));
                }
                split.individual_remaining -= 1;
                Ok(())
            }
        }
    }

    /// Record one purchased (billed) additional service
    ///
    /// The purchased service is consumed at once, so the remaining allowance
    /// is unchanged: tracked entries grow both `used` and `limit`, pools grow
    /// `used`, individual quotas count the billed overage.
    pub fn record_purchase(&mut self, service_type: &ServiceType) -> AppResult<()> {
        match self {
            ServiceUsage::Breakdown { breakdown } => match breakdown.get_mut(service_type) {
                None => Err(AppError::ServiceNotCovered(service_type.to_string())),
                Some(UsageEntry::Unlimited(_)) => {
                    Err(AppError::UnlimitedService(service_type.to_string()))
                }
                Some(UsageEntry::Tracked { used, limit }) => {
                    let next_used = increment(*used, service_type)?;
                    let next_limit = increment(*limit, service_type)?;
                    *used = next_used;
                    *limit = next_limit;
                    Ok(())
                }
            },
            ServiceUsage::Pooled(pool) => {
                pool.used_services = increment(pool.used_services, service_type)?;
                Ok(())
            }
            ServiceUsage::Split(split) => {
                split.additional_services_billed =
                    increment(split.additional_services_billed, service_type)?;
                Ok(())
            }
        }
    }
}

fn increment(counter: u32, service_type: &ServiceType) -> AppResult<u32> {
    counter.checked_add(1).ok_or_else(|| {
        AppError::InvalidInput(format!("usage counter overflow for {}", service_type))
    })
}
