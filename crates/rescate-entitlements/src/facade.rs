//! Entitlement facade
//!
//! `EntitlementEngine` composes the validation gate, the classifier and the
//! alert generator into the single aggregate read used by the UI.

use indexmap::IndexMap;
use rescate_core::{
    models::{Alert, EntitlementQuery, Subscriber},
    AppError, AppResult, EntitlementConfig,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::classifier::{self, ClassifiedLimit};
use crate::policy;
use crate::presentation::StatusKey;
use crate::validation::{validate_limits_data, LimitsValidationInput, ValidationReport};

/// Counts over a classified limits list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitStatistics {
    pub total_services: usize,
    pub exhausted_services: usize,
    pub warning_services: usize,
    pub unlimited_services: usize,
}

impl LimitStatistics {
    /// Count in a single pass
    pub fn from_limits(limits: &[ClassifiedLimit]) -> Self {
        limits
            .iter()
            .fold(Self::default(), |mut stats, limit| {
                stats.total_services += 1;
                match limit.status_key() {
                    StatusKey::Exhausted => stats.exhausted_services += 1,
                    StatusKey::Warning => stats.warning_services += 1,
                    StatusKey::Unlimited => stats.unlimited_services += 1,
                    StatusKey::Normal => {}
                }
                stats
            })
    }
}

/// Aggregate view of one subscriber's entitlements
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSummary {
    pub is_valid: bool,
    pub errors: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_error: Option<String>,
    pub limits: Vec<ClassifiedLimit>,
    pub alerts: Vec<Alert>,
    pub statistics: LimitStatistics,
    pub benefits: Vec<String>,
}

impl EntitlementSummary {
    fn rejected(report: ValidationReport) -> Self {
        Self {
            is_valid: false,
            first_error: report.first_error().map(str::to_string),
            errors: report.errors,
            limits: Vec::new(),
            alerts: Vec::new(),
            statistics: LimitStatistics::default(),
            benefits: Vec::new(),
        }
    }
}

/// Entitlement engine
///
/// Holds only configuration; every call is a pure function of its input.
#[derive(Debug, Clone)]
pub struct EntitlementEngine {
    config: Arc<EntitlementConfig>,
}

impl Default for EntitlementEngine {
    fn default() -> Self {
        Self::new(EntitlementConfig::default())
    }
}

impl EntitlementEngine {
    pub fn new(config: EntitlementConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Run the validation gate over a query
    pub fn validate(&self, query: &EntitlementQuery) -> ValidationReport {
        validate_limits_data(&LimitsValidationInput::from_query(query), &self.config)
    }

    /// Classify the query's limits; empty when the gate rejects the input
    pub fn classify(&self, query: &EntitlementQuery) -> Vec<ClassifiedLimit> {
        self.classify_checked(query).unwrap_or_default()
    }

    /// Classify the query's limits, reporting a rejected input as an error
    pub fn classify_checked(&self, query: &EntitlementQuery) -> AppResult<Vec<ClassifiedLimit>> {
        let report = self.validate(query);
        if let Some(message) = report.first_error() {
            return Err(AppError::Validation(message.to_string()));
        }

        Ok(classifier::classify(
            &query.limits_payload(),
            query.plan_info(),
            &self.config,
        ))
    }

    /// Alerts for a subscriber snapshot
    pub fn alerts(&self, subscriber: &Subscriber) -> Vec<Alert> {
        policy::generate_alerts(subscriber, &self.config)
    }

    /// Aggregate read: validation, classification, alerts and statistics
    #[instrument(skip(self, query), fields(subscriber = query.user.id, role = %query.user.role))]
    pub fn aggregate(&self, query: &EntitlementQuery) -> EntitlementSummary {
        let report = self.validate(query);
        if !report.is_valid {
            debug!(errors = report.errors.len(), "Aggregate rejected by validation gate");
            return EntitlementSummary::rejected(report);
        }

        let limits = classifier::classify(&query.limits_payload(), query.plan_info(), &self.config);
        let statistics = LimitStatistics::from_limits(&limits);
        let alerts = self.alerts(&query.user);
        let benefits = query
            .plan_info()
            .map(|plan| plan.enabled_benefits())
            .unwrap_or_default();

        debug!(
            limits = statistics.total_services,
            exhausted = statistics.exhausted_services,
            alerts = alerts.len(),
            "Aggregate computed"
        );

        EntitlementSummary {
            is_valid: true,
            errors: report.errors,
            first_error: None,
            limits,
            alerts,
            statistics,
            benefits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rescate_core::models::{AlertAction, UserRole};
    use serde_json::json;

    fn help_query() -> EntitlementQuery {
        serde_json::from_value(json!({
            "title": "Mis servicios",
            "user": {
                "id": 7,
                "name": "Marta",
                "role": "FAMILIAR",
                "plan": {
                    "subtype": "HELP",
                    "name": "Plan Help",
                    "total_services": 12,
                    "benefits": { "telemedicina": true, "farmacia": false, "ambulancia": true }
                },
                "service_usage": { "remaining_services": 0, "used_services": 12 }
            },
            "limits": {
                "general": {
                    "GENERAL": 0,
                    "ZONA_PROTEGIDA": "ILIMITADO"
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_aggregate_help_exhausted() {
        let summary = EntitlementEngine::default().aggregate(&help_query());

        assert!(summary.is_valid);
        assert_eq!(summary.first_error, None);
        assert_eq!(
            summary.statistics,
            LimitStatistics {
                total_services: 2,
                exhausted_services: 1,
                warning_services: 0,
                unlimited_services: 1,
            }
        );
        assert_eq!(summary.alerts.len(), 1);
        assert_eq!(summary.alerts[0].action, AlertAction::Purchase);
        assert_eq!(summary.benefits, vec!["ambulancia", "telemedicina"]);
    }

    #[test]
    fn test_aggregate_fails_closed() {
        let mut query = help_query();
        query.title = "x".to_string();

        let summary = EntitlementEngine::default().aggregate(&query);
        assert!(!summary.is_valid);
        assert!(summary.limits.is_empty());
        assert!(summary.alerts.is_empty());
        assert_eq!(summary.statistics, LimitStatistics::default());
        assert_eq!(
            summary.first_error.as_deref(),
            Some("El título debe tener al menos 3 caracteres")
        );
    }

    #[test]
    fn test_classify_checked_reports_first_error() {
        let engine = EntitlementEngine::default();
        let err = engine
            .classify_checked(&EntitlementQuery::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "validation_error");
        assert!(engine.classify(&EntitlementQuery::default()).is_empty());
    }

    #[test]
    fn test_benefits_absent_is_empty() {
        let mut query = help_query();
        if let Some(plan) = query.user.plan.as_mut() {
            plan.benefits = None;
        }
        let summary = EntitlementEngine::default().aggregate(&query);
        assert!(summary.is_valid);
        assert!(summary.benefits.is_empty());
    }

    #[test]
    fn test_admin_aggregate_has_no_alerts() {
        let mut query = help_query();
        query.user.role = UserRole::Admin;
        let summary = EntitlementEngine::default().aggregate(&query);
        assert!(summary.is_valid);
        assert!(summary.alerts.is_empty());
        assert_eq!(summary.statistics.total_services, 2);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let engine = EntitlementEngine::default();
        let query = help_query();
        assert_eq!(engine.aggregate(&query), engine.aggregate(&query));
        assert_eq!(engine.alerts(&query.user), engine.alerts(&query.user));
    }
}
