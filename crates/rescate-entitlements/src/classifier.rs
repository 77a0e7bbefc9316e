//! Limit classifier
//!
//! Turns each raw limit entry into one of three variants (unlimited, tracked,
//! flexible) and computes its consumption status.

use rescate_core::{
    models::{LimitsPayload, Plan, RawLimit, ServiceType},
    EntitlementConfig,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog;
use crate::presentation::{status_colors, StatusColors, StatusKey};

/// Consumption status of a counted limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionStatus {
    Normal,
    Warning,
    Exhausted,
}

impl ConsumptionStatus {
    /// Exhausted takes precedence over warning, warning over normal
    fn resolve(is_at_limit: bool, is_near_limit: bool) -> Self {
        if is_at_limit {
            ConsumptionStatus::Exhausted
        } else if is_near_limit {
            ConsumptionStatus::Warning
        } else {
            ConsumptionStatus::Normal
        }
    }

    pub fn status_key(&self) -> StatusKey {
        match self {
            ConsumptionStatus::Normal => StatusKey::Normal,
            ConsumptionStatus::Warning => StatusKey::Warning,
            ConsumptionStatus::Exhausted => StatusKey::Exhausted,
        }
    }
}

/// Status of a tracked `{used, limit}` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitStatus {
    pub used: u32,
    pub limit: u32,
    pub percentage: u32,
    pub is_at_limit: bool,
    pub is_near_limit: bool,
    pub status: ConsumptionStatus,
}

/// Status of a flexible pool entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexibleStatus {
    pub remaining: u32,
    pub total: u32,
    pub used: u32,
    pub percentage: u32,
    pub is_at_limit: bool,
    pub is_near_limit: bool,
    pub status: ConsumptionStatus,
}

/// `round(used / limit * 100)`, rounding half up; zero when `limit` is zero
pub fn percentage(used: u32, limit: u32) -> u32 {
    if limit == 0 {
        return 0;
    }
    let used = u64::from(used);
    let limit = u64::from(limit);
    let rounded = (used * 200 + limit) / (limit * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Status of a tracked entry
pub fn calculate_limit_status(used: u32, limit: u32, config: &EntitlementConfig) -> LimitStatus {
    let percentage = percentage(used, limit);
    let is_near_limit = percentage >= config.near_limit_percent;
    let is_at_limit = used >= limit;

    LimitStatus {
        used,
        limit,
        percentage,
        is_at_limit,
        is_near_limit,
        status: ConsumptionStatus::resolve(is_at_limit, is_near_limit),
    }
}

/// Status of a flexible pool given its remaining services
///
/// The pool size comes from `plan.total_services`, falling back to the
/// configured default. A pool with nothing remaining is always at its limit,
/// which also covers a zero-sized pool.
pub fn calculate_flexible_limit_status(
    remaining: u32,
    plan: Option<&Plan>,
    config: &EntitlementConfig,
) -> FlexibleStatus {
    let total = plan
        .and_then(|p| p.total_services)
        .unwrap_or(config.default_total_services);
    let used = total.saturating_sub(remaining);
    let percentage = percentage(used, total);
    let is_near_limit = percentage >= config.near_limit_percent;
    let is_at_limit = (total > 0 && used >= total) || remaining == 0;

    FlexibleStatus {
        remaining,
        total,
        used,
        percentage,
        is_at_limit,
        is_near_limit,
        status: ConsumptionStatus::resolve(is_at_limit, is_near_limit),
    }
}

/// Variant-specific part of a classified limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LimitDetail {
    Unlimited { value: String },
    Tracked(LimitStatus),
    Flexible(FlexibleStatus),
}

impl LimitDetail {
    pub fn status_key(&self) -> StatusKey {
        match self {
            LimitDetail::Unlimited { .. } => StatusKey::Unlimited,
            LimitDetail::Tracked(status) => status.status.status_key(),
            LimitDetail::Flexible(status) => status.status.status_key(),
        }
    }
}

/// A limit entry ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedLimit {
    pub service_type: ServiceType,
    pub icon: &'static str,
    pub name: String,
    pub description: &'static str,
    #[serde(flatten)]
    pub detail: LimitDetail,
    pub colors: StatusColors,
}

impl ClassifiedLimit {
    pub fn status_key(&self) -> StatusKey {
        self.detail.status_key()
    }
}

fn classify_entry(
    raw: &RawLimit,
    plan: Option<&Plan>,
    config: &EntitlementConfig,
) -> Option<LimitDetail> {
    match raw {
        RawLimit::Marker(marker) => Some(LimitDetail::Unlimited {
            value: marker.clone(),
        }),
        RawLimit::Tracked { used, limit } => Some(LimitDetail::Tracked(calculate_limit_status(
            *used, *limit, config,
        ))),
        RawLimit::Count(remaining) => Some(LimitDetail::Flexible(
            calculate_flexible_limit_status(*remaining, plan, config),
        )),
        RawLimit::Malformed(_) => None,
    }
}

/// Classify every entry of a limits payload, in input order
///
/// Unknown service types resolve through the catalog fallback. Marker strings
/// are rendered as unlimited without numeric classification. Malformed values
/// (which the validation gate rejects) are skipped.
pub fn classify(
    limits: &LimitsPayload,
    plan: Option<&Plan>,
    config: &EntitlementConfig,
) -> Vec<ClassifiedLimit> {
    let mut classified = Vec::with_capacity(limits.len());

    for (service_type, raw) in limits.entries() {
        let Some(detail) = classify_entry(raw, plan, config) else {
            warn!(service_type = %service_type, "Skipping malformed limit entry");
            continue;
        };

        if let LimitDetail::Unlimited { value } = &detail {
            if !config.is_unlimited_marker(value) {
                debug!(
                    service_type = %service_type,
                    marker = %value,
                    "Unrecognized marker rendered as unlimited"
                );
            }
        }

        if !service_type.is_known() {
            debug!(service_type = %service_type, "Service type not in catalog, using fallback");
        }

        let descriptor = catalog::describe(service_type);
        let colors = status_colors(detail.status_key());

        classified.push(ClassifiedLimit {
            service_type: service_type.clone(),
            icon: descriptor.icon,
            name: descriptor.name,
            description: descriptor.description,
            detail,
            colors,
        });
    }

    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> EntitlementConfig {
        EntitlementConfig::default()
    }

    #[test]
    fn test_limit_status_normal() {
        let status = calculate_limit_status(5, 10, &config());
        assert_eq!(status.percentage, 50);
        assert_eq!(status.status, ConsumptionStatus::Normal);
        assert!(!status.is_near_limit);
    }

    #[test]
    fn test_limit_status_warning() {
        let status = calculate_limit_status(9, 10, &config());
        assert_eq!(status.percentage, 90);
        assert_eq!(status.status, ConsumptionStatus::Warning);
        assert!(status.is_near_limit);
        assert!(!status.is_at_limit);
    }

    #[test]
    fn test_limit_status_exhausted() {
        let status = calculate_limit_status(10, 10, &config());
        assert_eq!(status.percentage, 100);
        assert_eq!(status.status, ConsumptionStatus::Exhausted);
        assert!(status.is_at_limit);
    }

    #[test]
    fn test_zero_limit_is_zero_percent() {
        let status = calculate_limit_status(0, 0, &config());
        assert_eq!(status.percentage, 0);
        assert!(status.is_at_limit);
        assert_eq!(status.status, ConsumptionStatus::Exhausted);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(4, 5), 80);
        assert_eq!(percentage(15, 10), 150);
    }

    #[test]
    fn test_flexible_status() {
        let plan = Plan {
            name: "Plan Help".to_string(),
            total_services: Some(12),
            ..Default::default()
        };
        let status = calculate_flexible_limit_status(8, Some(&plan), &config());
        assert_eq!(status.used, 4);
        assert_eq!(status.total, 12);
        assert_eq!(status.percentage, 33);
        assert_eq!(status.status, ConsumptionStatus::Normal);
    }

    #[test]
    fn test_flexible_default_total() {
        let status = calculate_flexible_limit_status(2, None, &config());
        assert_eq!(status.total, 12);
        assert_eq!(status.used, 10);
        assert_eq!(status.percentage, 83);
        assert_eq!(status.status, ConsumptionStatus::Warning);
    }

    #[test]
    fn test_flexible_zero_pool_is_exhausted() {
        let plan = Plan {
            name: "Sin pool".to_string(),
            total_services: Some(0),
            ..Default::default()
        };
        let status = calculate_flexible_limit_status(0, Some(&plan), &config());
        assert_eq!(status.percentage, 0);
        assert!(status.is_at_limit);
        assert_eq!(status.status, ConsumptionStatus::Exhausted);
    }

    #[test]
    fn test_classify_variants_and_fallback() {
        let limits: LimitsPayload = [
            (ServiceType::Urgencia, RawLimit::Tracked { used: 3, limit: 3 }),
            (
                ServiceType::ZonaProtegida,
                RawLimit::Marker("ILIMITADO".to_string()),
            ),
            (ServiceType::General, RawLimit::Count(6)),
            (ServiceType::from("ODONTOLOGIA"), RawLimit::Tracked { used: 0, limit: 2 }),
        ]
        .into_iter()
        .collect();

        let classified = classify(&limits, None, &config());
        assert_eq!(classified.len(), 4);

        assert_eq!(classified[0].status_key(), StatusKey::Exhausted);
        assert_eq!(classified[1].status_key(), StatusKey::Unlimited);
        assert!(matches!(classified[2].detail, LimitDetail::Flexible(_)));

        let unknown = &classified[3];
        assert_eq!(unknown.icon, "fas fa-medical-cross");
        assert_eq!(unknown.name, "ODONTOLOGIA");
        assert_eq!(unknown.description, "Servicio médico");
        assert_eq!(unknown.colors, status_colors(StatusKey::Normal));
    }

    #[test]
    fn test_classify_skips_malformed() {
        let limits: LimitsPayload = [
            (ServiceType::Urgencia, RawLimit::Malformed(json!([1, 2]))),
            (ServiceType::General, RawLimit::Count(4)),
        ]
        .into_iter()
        .collect();

        let classified = classify(&limits, None, &config());
        assert_eq!(classified.len(), 1);
        assert_eq!(classified[0].service_type, ServiceType::General);
    }

    #[test]
    fn test_classified_wire_shape() {
        let limits: LimitsPayload = [
            (ServiceType::Urgencia, RawLimit::Tracked { used: 9, limit: 10 }),
            (
                ServiceType::ZonaProtegida,
                RawLimit::Marker("ILIMITADO".to_string()),
            ),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(classify(&limits, None, &config())).unwrap();
        assert_eq!(value[0]["type"], "tracked");
        assert_eq!(value[0]["serviceType"], "URGENCIA");
        assert_eq!(value[0]["isNearLimit"], true);
        assert_eq!(value[0]["status"], "warning");
        assert_eq!(value[1]["type"], "unlimited");
        assert_eq!(value[1]["value"], "ILIMITADO");
    }
}
