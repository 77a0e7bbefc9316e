//! Validation gate
//!
//! Checks the shape of a limits panel input before anything is classified.
//! The gate fails closed: callers must not classify when `is_valid` is false.

use indexmap::IndexMap;
use rescate_core::{
    models::{EntitlementQuery, LimitsPayload, Plan, RawLimit, UserRole},
    EntitlementConfig,
};
use serde::Serialize;
use tracing::debug;
use validator::{Validate, ValidationErrors};

/// Limits panel input
#[derive(Debug, Clone, Default, Validate)]
pub struct LimitsValidationInput {
    #[validate(length(min = 3, message = "El título debe tener al menos 3 caracteres"))]
    pub title: String,

    pub limits: LimitsPayload,

    pub user_type: UserRole,

    pub plan_info: Option<Plan>,
}

impl LimitsValidationInput {
    /// Build the gate input from an aggregate query
    pub fn from_query(query: &EntitlementQuery) -> Self {
        Self {
            title: query.title.clone(),
            limits: query.limits_payload(),
            user_type: query.user_type(),
            plan_info: query.plan_info().cloned(),
        }
    }
}

/// Validation outcome
///
/// Errors are keyed by field path, in the order the checks run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: IndexMap<String, String>,
}

impl ValidationReport {
    fn from_errors(errors: IndexMap<String, String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// First reported error message
    pub fn first_error(&self) -> Option<&str> {
        self.errors.values().next().map(String::as_str)
    }
}

fn collect_field_errors(
    prefix: &str,
    result: Result<(), ValidationErrors>,
    errors: &mut IndexMap<String, String>,
) {
    let Err(validation_errors) = result else {
        return;
    };

    let mut fields: Vec<(String, String)> = validation_errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, field_errors)| {
            field_errors.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                (format!("{}{}", prefix, field), message)
            })
        })
        .collect();
    fields.sort();
    errors.extend(fields);
}

fn check_limit_entry(raw: &RawLimit, config: &EntitlementConfig) -> Result<(), String> {
    match raw {
        RawLimit::Tracked { .. } | RawLimit::Count(_) => Ok(()),
        RawLimit::Marker(marker) if config.is_unlimited_marker(marker) => Ok(()),
        RawLimit::Marker(marker) => Err(format!("Valor de límite no reconocido: {}", marker)),
        RawLimit::Malformed(_) => Err("Formato de límite inválido".to_string()),
    }
}

/// Validate a limits panel input
pub fn validate_limits_data(
    input: &LimitsValidationInput,
    config: &EntitlementConfig,
) -> ValidationReport {
    let mut errors = IndexMap::new();

    collect_field_errors("", input.validate(), &mut errors);

    if input.limits.is_empty() {
        errors.insert(
            "limits".to_string(),
            "Debe existir al menos un límite de servicio".to_string(),
        );
    }
    for (service_type, raw) in input.limits.entries() {
        if let Err(message) = check_limit_entry(raw, config) {
            errors.insert(format!("limits.{}", service_type), message);
        }
    }

    if !input.user_type.is_known() {
        errors.insert(
            "userType".to_string(),
            "Tipo de usuario inválido".to_string(),
        );
    }

    if let Some(plan) = &input.plan_info {
        collect_field_errors("planInfo.", plan.validate(), &mut errors);
    }

    let report = ValidationReport::from_errors(errors);
    if !report.is_valid {
        debug!(
            error_count = report.errors.len(),
            first_error = report.first_error().unwrap_or_default(),
            "Limits data rejected"
        );
    }
    report
}
