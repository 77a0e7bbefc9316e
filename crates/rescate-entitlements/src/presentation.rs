//! Presentation lookup tables
//!
//! Status and alert styling is pure data so it can be tested and localized
//! without touching policy code.

use rescate_core::models::{AlertAction, AlertType};
use serde::Serialize;

/// Presentation status of a classified limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKey {
    Exhausted,
    Warning,
    Normal,
    Unlimited,
}

impl StatusKey {
    /// Parse a status string; anything unrecognized maps to `Normal`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "exhausted" => StatusKey::Exhausted,
            "warning" => StatusKey::Warning,
            "unlimited" => StatusKey::Unlimited,
            _ => StatusKey::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKey::Exhausted => "exhausted",
            StatusKey::Warning => "warning",
            StatusKey::Normal => "normal",
            StatusKey::Unlimited => "unlimited",
        }
    }
}

/// CSS classes for one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusColors {
    pub bg: &'static str,
    pub text: &'static str,
    pub badge: &'static str,
    pub progress: &'static str,
}

static STATUS_PALETTE: [(StatusKey, StatusColors, &str); 4] = [
    (
        StatusKey::Exhausted,
        StatusColors {
            bg: "bg-red-50 border-red-200",
            text: "text-red-700",
            badge: "bg-red-100 text-red-800",
            progress: "bg-red-500",
        },
        "Agotado",
    ),
    (
        StatusKey::Warning,
        StatusColors {
            bg: "bg-yellow-50 border-yellow-200",
            text: "text-yellow-700",
            badge: "bg-yellow-100 text-yellow-800",
            progress: "bg-yellow-500",
        },
        "Por agotarse",
    ),
    (
        StatusKey::Normal,
        StatusColors {
            bg: "bg-green-50 border-green-200",
            text: "text-green-700",
            badge: "bg-green-100 text-green-800",
            progress: "bg-green-500",
        },
        "Disponible",
    ),
    (
        StatusKey::Unlimited,
        StatusColors {
            bg: "bg-blue-50 border-blue-200",
            text: "text-blue-700",
            badge: "bg-blue-100 text-blue-800",
            progress: "bg-blue-500",
        },
        "Ilimitado",
    ),
];

fn palette_entry(key: StatusKey) -> &'static (StatusKey, StatusColors, &'static str) {
    STATUS_PALETTE
        .iter()
        .find(|(k, _, _)| *k == key)
        .unwrap_or(&STATUS_PALETTE[2])
}

/// Colors for a status
pub fn status_colors(key: StatusKey) -> StatusColors {
    palette_entry(key).1
}

/// Colors for a raw status string, falling back to the normal palette
pub fn status_colors_for(raw: &str) -> StatusColors {
    status_colors(StatusKey::parse(raw))
}

/// Badge label for a status
pub fn status_label(key: StatusKey) -> &'static str {
    palette_entry(key).2
}

/// CSS classes for an alert banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertStyle {
    pub container: &'static str,
    pub icon: &'static str,
    pub button: &'static str,
}

pub fn alert_style(alert_type: AlertType) -> AlertStyle {
    match alert_type {
        AlertType::Error => AlertStyle {
            container: "bg-red-50 border-l-4 border-red-500",
            icon: "fas fa-exclamation-circle text-red-500",
            button: "bg-red-600 hover:bg-red-700 text-white",
        },
        AlertType::Warning => AlertStyle {
            container: "bg-yellow-50 border-l-4 border-yellow-500",
            icon: "fas fa-exclamation-triangle text-yellow-500",
            button: "bg-yellow-600 hover:bg-yellow-700 text-white",
        },
        AlertType::Info => AlertStyle {
            container: "bg-blue-50 border-l-4 border-blue-500",
            icon: "fas fa-info-circle text-blue-500",
            button: "bg-blue-600 hover:bg-blue-700 text-white",
        },
    }
}

/// Button label for an alert action
///
/// `Upgrade` has a label even though no policy emits it yet.
pub fn action_label(action: AlertAction) -> &'static str {
    match action {
        AlertAction::Purchase => "Comprar servicio adicional",
        AlertAction::Upgrade => "Mejorar plan",
        AlertAction::Contact => "Solicitar ampliación",
    }
}
