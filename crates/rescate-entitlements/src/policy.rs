//! Alert generator
//!
//! Maps a subscriber snapshot to a prioritized list of alerts. Dispatch is on
//! the (role, plan subtype) pair: each supported pair resolves to a
//! `PolicyKey`, and each key to one pure policy function. A pair with no key
//! is a policy gap and yields no alerts.

use rescate_core::{
    models::{
        Alert, AlertType, PlanSubtype, PooledUsage, ServiceType, ServiceUsage, SplitUsage,
        Subscriber, UsageEntry, UserRole,
    },
    EntitlementConfig,
};
use tracing::{debug, instrument};

use crate::catalog;

/// Policy function signature
pub type PolicyFn = fn(&Subscriber, &EntitlementConfig) -> Vec<Alert>;

/// Supported (role, subtype) combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKey {
    /// FAMILIAR on the HELP plan: one shared pool
    FamiliarPooled,
    /// FAMILIAR on any other plan: per-service tracked breakdown
    FamiliarTracked,
    /// CORPORATIVO: shared pool, expansion only through the company
    Corporate,
    /// EXTERNO / CASO_1: unlimited, billed directly to the company
    ExternalDirect,
    /// EXTERNO / CASO_2: individual quota with overage billing
    ExternalQuota,
}

impl PolicyKey {
    /// Resolve the policy for a role and plan subtype
    pub fn resolve(role: UserRole, subtype: Option<PlanSubtype>) -> Option<Self> {
        match (role, subtype) {
            (UserRole::Familiar, Some(PlanSubtype::Help)) => Some(PolicyKey::FamiliarPooled),
            (UserRole::Familiar, Some(_)) => Some(PolicyKey::FamiliarTracked),
            (UserRole::Corporativo, _) => Some(PolicyKey::Corporate),
            (UserRole::Externo, Some(PlanSubtype::Caso1)) => Some(PolicyKey::ExternalDirect),
            (UserRole::Externo, Some(PlanSubtype::Caso2)) => Some(PolicyKey::ExternalQuota),
            _ => None,
        }
    }

    /// Policy function for this key
    pub fn policy(self) -> PolicyFn {
        match self {
            PolicyKey::FamiliarPooled => familiar_pooled,
            PolicyKey::FamiliarTracked => familiar_tracked,
            PolicyKey::Corporate => corporate,
            PolicyKey::ExternalDirect => external_direct,
            PolicyKey::ExternalQuota => external_quota,
        }
    }
}

/// Generate the ordered alert list for a subscriber
///
/// Urgent alerts come first; among equal urgency, generation order is kept.
#[instrument(skip(subscriber, config), fields(subscriber = subscriber.id, role = %subscriber.role))]
pub fn generate_alerts(subscriber: &Subscriber, config: &EntitlementConfig) -> Vec<Alert> {
    let subtype = subscriber.plan.as_ref().map(|plan| plan.subtype);

    let Some(key) = PolicyKey::resolve(subscriber.role, subtype) else {
        debug!(?subtype, "No alert policy for role and subtype");
        return Vec::new();
    };

    let mut alerts = (key.policy())(subscriber, config);
    alerts.sort_by_key(|alert| !alert.urgent);

    debug!(?key, count = alerts.len(), "Alerts generated");
    alerts
}

fn pooled_usage<'a>(subscriber: &'a Subscriber, key: PolicyKey) -> Option<&'a PooledUsage> {
    match &subscriber.service_usage {
        Some(ServiceUsage::Pooled(pool)) => Some(pool),
        other => {
            debug!(
                ?key,
                shape = other.as_ref().map(ServiceUsage::shape),
                "Usage shape does not match policy"
            );
            None
        }
    }
}

fn plural(count: u32, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

fn familiar_pooled(subscriber: &Subscriber, config: &EntitlementConfig) -> Vec<Alert> {
    let Some(pool) = pooled_usage(subscriber, PolicyKey::FamiliarPooled) else {
        return Vec::new();
    };
    let total = subscriber.plan.as_ref().and_then(|plan| plan.total_services);
    let remaining = pool.remaining(total);

    if remaining == 0 {
        vec![Alert::purchase(
            ServiceType::General,
            "Servicios agotados",
            "Ha utilizado todos los servicios de su plan Help. Puede adquirir servicios adicionales.",
            config.policy.help_additional_cost,
            pool.used_services,
        )]
    } else if remaining <= config.policy.pooled_warning_threshold {
        vec![Alert::contact(
            AlertType::Warning,
            ServiceType::General,
            "Pocos servicios disponibles",
            format!(
                "Le quedan {} en su plan Help.",
                plural(remaining, "servicio", "servicios")
            ),
            false,
        )]
    } else {
        Vec::new()
    }
}

fn familiar_tracked(subscriber: &Subscriber, config: &EntitlementConfig) -> Vec<Alert> {
    let Some(ServiceUsage::Breakdown { breakdown }) = &subscriber.service_usage else {
        debug!("Tracked policy without a usage breakdown");
        return Vec::new();
    };

    let mut alerts = Vec::new();
    for (service_type, entry) in breakdown {
        let UsageEntry::Tracked { used, limit } = *entry else {
            continue;
        };
        let name = catalog::describe(service_type).name;

        if used >= limit {
            alerts.push(Alert::purchase(
                service_type.clone(),
                format!("{}: límite alcanzado", name),
                format!(
                    "Ha utilizado los {} incluidos en su plan. Puede adquirir un servicio adicional.",
                    plural(limit, "servicio", "servicios")
                ),
                config.policy.service_costs.cost_for(service_type),
                used,
            ));
        } else if used + 1 >= limit {
            alerts.push(Alert::contact(
                AlertType::Warning,
                service_type.clone(),
                format!("{}: último servicio disponible", name),
                format!("Ha utilizado {} de {} servicios incluidos.", used, limit),
                false,
            ));
        }
    }
    alerts
}

fn corporate(subscriber: &Subscriber, config: &EntitlementConfig) -> Vec<Alert> {
    let Some(pool) = pooled_usage(subscriber, PolicyKey::Corporate) else {
        return Vec::new();
    };
    let total = subscriber.plan.as_ref().and_then(|plan| plan.total_services);
    let remaining = pool.remaining(total);

    if remaining == 0 {
        vec![Alert::contact(
            AlertType::Error,
            ServiceType::General,
            "Servicios corporativos agotados",
            "Su empresa ha utilizado todos los servicios del convenio. Solicite una ampliación.",
            true,
        )]
    } else if remaining <= config.policy.corporate_warning_threshold {
        vec![Alert::contact(
            AlertType::Warning,
            ServiceType::General,
            "Servicios corporativos por agotarse",
            format!(
                "Quedan {} en el convenio de su empresa.",
                plural(remaining, "servicio", "servicios")
            ),
            false,
        )]
    } else {
        Vec::new()
    }
}

fn external_direct(_subscriber: &Subscriber, _config: &EntitlementConfig) -> Vec<Alert> {
    Vec::new()
}

fn external_quota(subscriber: &Subscriber, config: &EntitlementConfig) -> Vec<Alert> {
    let Some(ServiceUsage::Split(SplitUsage {
        individual_remaining,
        company,
        additional_services_billed,
    })) = &subscriber.service_usage
    else {
        debug!("Quota policy without individual/company usage");
        return Vec::new();
    };

    let mut alerts = Vec::new();

    if *individual_remaining == 0 {
        let cost = subscriber
            .plan
            .as_ref()
            .and_then(|plan| plan.cost_per_additional_service())
            .unwrap_or(config.policy.default_external_additional_cost);
        alerts.push(Alert::purchase(
            ServiceType::General,
            "Cupo individual agotado",
            "Ha utilizado su cupo anual. Los servicios adicionales se facturan por separado.",
            cost,
            *additional_services_billed,
        ));
    } else if *individual_remaining == 1 {
        alerts.push(Alert::contact(
            AlertType::Warning,
            ServiceType::General,
            "Último servicio de su cupo",
            "Le queda 1 servicio en su cupo anual individual.",
            false,
        ));
    }

    let general_remaining = company.general_services_remaining;
    if general_remaining <= config.policy.company_pool_warning_threshold {
        alerts.push(Alert::contact(
            AlertType::Warning,
            ServiceType::General,
            "Bolsa de la empresa por agotarse",
            format!(
                "Quedan {} en la bolsa general de su empresa.",
                plural(general_remaining, "servicio", "servicios")
            ),
            general_remaining <= config.policy.company_pool_urgent_threshold,
        ));
    }

    alerts
}
