//! End-to-end behaviour of the entitlement engine over JSON snapshots

use rescate_core::{
    models::{
        AlertAction, AlertType, EntitlementQuery, Handoff, Plan, ServiceType, Subscriber,
    },
    EntitlementConfig,
};
use rescate_entitlements::{
    action_label, alert_style, calculate_flexible_limit_status, calculate_limit_status,
    status_colors_for, status_label, validate_limits_data, ConsumptionStatus, EntitlementEngine,
    LimitDetail, LimitsValidationInput, StatusKey,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn query(value: Value) -> EntitlementQuery {
    serde_json::from_value(value).expect("valid query fixture")
}

fn subscriber(value: Value) -> Subscriber {
    serde_json::from_value(value).expect("valid subscriber fixture")
}

#[test]
fn limit_status_thresholds() {
    let config = EntitlementConfig::default();

    let normal = calculate_limit_status(5, 10, &config);
    assert_eq!((normal.percentage, normal.status), (50, ConsumptionStatus::Normal));

    let warning = calculate_limit_status(9, 10, &config);
    assert_eq!(warning.percentage, 90);
    assert_eq!(warning.status, ConsumptionStatus::Warning);
    assert!(warning.is_near_limit);
    assert!(!warning.is_at_limit);

    let exhausted = calculate_limit_status(10, 10, &config);
    assert_eq!(exhausted.percentage, 100);
    assert_eq!(exhausted.status, ConsumptionStatus::Exhausted);
    assert!(exhausted.is_at_limit);
}

#[test]
fn flexible_status_from_plan_total() {
    let plan: Plan =
        serde_json::from_value(json!({ "name": "Plan Help", "total_services": 12 })).unwrap();
    let status = calculate_flexible_limit_status(8, Some(&plan), &EntitlementConfig::default());
    assert_eq!(status.used, 4);
    assert_eq!(status.percentage, 33);
}

#[test]
fn help_exhausted_offers_purchase() {
    let user = subscriber(json!({
        "id": 1,
        "role": "FAMILIAR",
        "plan": { "subtype": "HELP", "name": "Plan Help", "total_services": 12 },
        "service_usage": { "remaining_services": 0, "used_services": 12 }
    }));

    let alerts = EntitlementEngine::default().alerts(&user);
    assert_eq!(alerts[0].alert_type, AlertType::Error);
    assert_eq!(alerts[0].action, AlertAction::Purchase);
    assert_eq!(alerts[0].cost, Some(dec!(85000)));
    assert!(alerts[0].urgent);

    match alerts[0].handoff().unwrap() {
        Handoff::Purchase(confirmation) => {
            assert_eq!(confirmation.service_type, ServiceType::General);
            assert_eq!(confirmation.cost_applied, dec!(85000));
            assert_eq!(confirmation.offer_version, 12);
        }
        other => panic!("unexpected handoff: {:?}", other),
    }
}

#[test]
fn ui_tables_render_aggregate_output() {
    let summary = EntitlementEngine::default().aggregate(&query(json!({
        "title": "Mis servicios",
        "user": {
            "id": 1,
            "role": "FAMILIAR",
            "plan": { "subtype": "HELP", "name": "Plan Help", "total_services": 12 },
            "service_usage": { "remaining_services": 0, "used_services": 12 }
        },
        "limits": { "general": { "GENERAL": 0, "ZONA_PROTEGIDA": "ILIMITADO" } }
    })));
    let wire = serde_json::to_value(&summary).unwrap();

    let labels: Vec<&str> = wire["limits"]
        .as_array()
        .unwrap()
        .iter()
        .zip(&summary.limits)
        .map(|(rendered, limit)| {
            let raw = rendered["status"]
                .as_str()
                .or_else(|| rendered["type"].as_str())
                .unwrap();
            assert_eq!(status_colors_for(raw), limit.colors);
            status_label(StatusKey::parse(raw))
        })
        .collect();
    assert_eq!(labels, vec!["Agotado", "Ilimitado"]);

    let alert = &wire["alerts"][0];
    assert_eq!(alert["type"], "error");
    assert_eq!(
        alert_style(summary.alerts[0].alert_type).button,
        "bg-red-600 hover:bg-red-700 text-white"
    );
    assert_eq!(alert["action"], "purchase");
    assert_eq!(action_label(summary.alerts[0].action), "Comprar servicio adicional");
}

#[test]
fn corporate_with_three_remaining_warns_once() {
    let user = subscriber(json!({
        "id": 2,
        "role": "CORPORATIVO",
        "plan": { "subtype": "OTHER", "name": "Convenio", "total_services": 50 },
        "service_usage": { "remaining_services": 3, "used_services": 47 }
    }));

    let alerts = EntitlementEngine::default().alerts(&user);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].alert_type, AlertType::Warning);
    assert!(!alerts[0].urgent);
    assert!(matches!(alerts[0].handoff().unwrap(), Handoff::Contact(_)));
}

#[test]
fn caso_1_never_alerts() {
    let engine = EntitlementEngine::default();
    for usage in [
        json!({ "individual_remaining": 0, "company": { "general_services_remaining": 0 } }),
        json!({ "individual_remaining": 1, "company": { "general_services_remaining": 4 } }),
        json!({ "remaining_services": 0, "used_services": 30 }),
    ] {
        let user = subscriber(json!({
            "id": 3,
            "role": "EXTERNO",
            "plan": { "subtype": "CASO_1", "name": "Empresa directa" },
            "service_usage": usage
        }));
        assert!(engine.alerts(&user).is_empty());
    }
}

#[test]
fn urgent_alert_sorted_first() {
    let user = subscriber(json!({
        "id": 4,
        "role": "EXTERNO",
        "plan": {
            "subtype": "CASO_2",
            "name": "Cupo individual",
            "billing_info": { "cost_per_additional_service": "92000" }
        },
        "service_usage": {
            "individual_remaining": 1,
            "company": { "general_services_remaining": 3 }
        }
    }));

    let alerts = EntitlementEngine::default().alerts(&user);
    assert_eq!(alerts.len(), 2);
    assert!(alerts[0].urgent);
    assert!(!alerts[1].urgent);
}

#[test]
fn caso_2_exhausted_uses_plan_price() {
    let user = subscriber(json!({
        "id": 5,
        "role": "EXTERNO",
        "plan": {
            "subtype": "CASO_2",
            "name": "Cupo individual",
            "billing_info": { "cost_per_additional_service": "92000" }
        },
        "service_usage": {
            "individual_remaining": 0,
            "company": { "general_services_remaining": 40 }
        }
    }));

    let alerts = EntitlementEngine::default().alerts(&user);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].cost, Some(dec!(92000)));
}

#[test]
fn empty_input_is_rejected() {
    let report = validate_limits_data(
        &LimitsValidationInput::default(),
        &EntitlementConfig::default(),
    );
    assert!(!report.is_valid);
    assert!(report.errors.contains_key("limits"));
}

#[test]
fn unknown_service_type_is_renderable() {
    let summary = EntitlementEngine::default().aggregate(&query(json!({
        "title": "Mis servicios",
        "user": {
            "id": 6,
            "role": "FAMILIAR",
            "plan": { "subtype": "OTHER", "name": "Plan Familiar" },
            "service_usage": { "breakdown": { "ODONTOLOGIA": { "used": 0, "limit": 2 } } }
        },
        "legacy_limits": { "ODONTOLOGIA": { "used": 0, "limit": 2 } }
    })));

    assert!(summary.is_valid);
    let entry = &summary.limits[0];
    assert_eq!(entry.icon, "fas fa-medical-cross");
    assert_eq!(entry.name, "ODONTOLOGIA");
    assert_eq!(entry.description, "Servicio médico");
    assert!(matches!(entry.detail, LimitDetail::Tracked(_)));
}

#[test]
fn wrapped_limits_win_over_legacy() {
    let summary = EntitlementEngine::default().aggregate(&query(json!({
        "title": "Mis servicios",
        "user": {
            "id": 8,
            "role": "FAMILIAR",
            "plan": { "subtype": "OTHER", "name": "Plan Familiar" },
            "service_usage": { "breakdown": {} }
        },
        "limits": { "general": { "URGENCIA": { "used": 3, "limit": 3 } } },
        "legacy_limits": { "GENERAL": 5, "ZONA_PROTEGIDA": "ILIMITADO" }
    })));

    assert!(summary.is_valid);
    assert_eq!(summary.statistics.total_services, 1);
    assert_eq!(summary.limits[0].status_key(), StatusKey::Exhausted);
}

#[test]
fn tracked_plan_aggregate_wire_shape() {
    let summary = EntitlementEngine::default().aggregate(&query(json!({
        "title": "Mis servicios",
        "user": {
            "id": 9,
            "name": "Lucía",
            "role": "FAMILIAR",
            "plan": { "subtype": "OTHER", "name": "Plan Familiar" },
            "service_usage": {
                "breakdown": {
                    "URGENCIA": { "used": 4, "limit": 4 },
                    "MEDICO_DOMICILIO": { "used": 1, "limit": 2 },
                    "ZONA_PROTEGIDA": "ILIMITADO"
                }
            }
        },
        "limits": {
            "general": {
                "URGENCIA": { "used": 4, "limit": 4 },
                "MEDICO_DOMICILIO": { "used": 1, "limit": 2 },
                "ZONA_PROTEGIDA": "ILIMITADO"
            }
        }
    })));

    let value = serde_json::to_value(&summary).unwrap();
    assert_eq!(value["isValid"], true);
    assert_eq!(value["statistics"]["totalServices"], 3);
    assert_eq!(value["statistics"]["exhaustedServices"], 1);
    assert_eq!(value["statistics"]["unlimitedServices"], 1);
    assert_eq!(value["limits"][0]["type"], "tracked");
    assert_eq!(value["limits"][2]["type"], "unlimited");
    assert_eq!(value["alerts"][0]["type"], "error");
    assert_eq!(value["alerts"][0]["action"], "purchase");
    assert_eq!(value["alerts"][0]["serviceType"], "URGENCIA");
    assert_eq!(value["alerts"][1]["action"], "contact");
    assert!(value["alerts"][1].get("cost").is_none());
    assert_eq!(value["benefits"], json!([]));
}

#[test]
fn classify_and_alerts_are_idempotent() {
    let engine = EntitlementEngine::default();
    let query = query(json!({
        "title": "Panel",
        "user": {
            "id": 10,
            "role": "CORPORATIVO",
            "plan": { "subtype": "OTHER", "name": "Convenio", "total_services": 20 },
            "service_usage": { "remaining_services": 0, "used_services": 20 }
        },
        "limits": { "general": { "GENERAL": 0 } }
    }));

    assert_eq!(engine.classify(&query), engine.classify(&query));
    assert_eq!(engine.alerts(&query.user), engine.alerts(&query.user));
}
