//! Alert model
//!
//! Alerts are produced by the policy engine and handed to the UI. Each alert
//! resolves to exactly one collaborator call: a purchase confirmation or an
//! expansion request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use super::ServiceType;
use crate::error::AppError;
use crate::AppResult;

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Error,
    Warning,
    Info,
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertType::Error => write!(f, "error"),
            AlertType::Warning => write!(f, "warning"),
            AlertType::Info => write!(f, "info"),
        }
    }
}

/// Action offered by an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertAction {
    /// Buy an additional service; always carries a cost
    Purchase,
    /// Plan upgrade. Reserved: no policy emits it yet.
    Upgrade,
    /// Request a service expansion; never carries a cost
    Contact,
}

impl fmt::Display for AlertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertAction::Purchase => write!(f, "purchase"),
            AlertAction::Upgrade => write!(f, "upgrade"),
            AlertAction::Contact => write!(f, "contact"),
        }
    }
}

/// Entitlement alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub action: AlertAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    pub urgent: bool,
    pub service_type: ServiceType,

    /// Usage counter the purchase offer was computed against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_version: Option<u32>,
}

impl Alert {
    /// Error alert offering the purchase of one additional service
    ///
    /// `offer_version` is the usage counter the offer was computed against
    /// (see `ServiceUsage::purchase_counter`).
    pub fn purchase(
        service_type: ServiceType,
        title: impl Into<String>,
        message: impl Into<String>,
        cost: Decimal,
        offer_version: u32,
    ) -> Self {
        Self {
            alert_type: AlertType::Error,
            title: title.into(),
            message: message.into(),
            action: AlertAction::Purchase,
            cost: Some(cost),
            urgent: true,
            service_type,
            offer_version: Some(offer_version),
        }
    }

    /// Alert routing the user to an expansion request
    pub fn contact(
        alert_type: AlertType,
        service_type: ServiceType,
        title: impl Into<String>,
        message: impl Into<String>,
        urgent: bool,
    ) -> Self {
        Self {
            alert_type,
            title: title.into(),
            message: message.into(),
            action: AlertAction::Contact,
            cost: None,
            urgent,
            service_type,
            offer_version: None,
        }
    }

    /// Resolve the collaborator call this alert hands off to
    pub fn handoff(&self) -> AppResult<Handoff> {
        match (self.action, self.cost, self.offer_version) {
            (AlertAction::Purchase, Some(cost), Some(offer_version)) => {
                Ok(Handoff::Purchase(PurchaseConfirmation {
                    service_type: self.service_type.clone(),
                    cost_applied: cost,
                    offer_version,
                }))
            }
            (AlertAction::Purchase, None, _) => Err(AppError::MissingField(format!(
                "cost for purchase alert on {}",
                self.service_type
            ))),
            (AlertAction::Purchase, Some(_), None) => Err(AppError::MissingField(format!(
                "offer version for purchase alert on {}",
                self.service_type
            ))),
            (AlertAction::Contact, _, _) => Ok(Handoff::Contact(ExpansionDraft {
                selected_service: self.service_type.clone(),
            })),
            (AlertAction::Upgrade, _, _) => {
                Err(AppError::UnsupportedAction(self.action.to_string()))
            }
        }
    }
}

/// Collaborator call resolved from an alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handoff {
    Purchase(PurchaseConfirmation),
    Contact(ExpansionDraft),
}

/// Payload for the usage-mutation collaborator on purchase confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseConfirmation {
    pub service_type: ServiceType,
    pub cost_applied: Decimal,
    /// Usage counter of the offer being confirmed
    pub offer_version: u32,
}

/// Pre-filled expansion request, completed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionDraft {
    pub selected_service: ServiceType,
}

impl ExpansionDraft {
    /// Complete the draft with the user's answers
    pub fn complete(
        self,
        reason: impl Into<String>,
        urgency: Urgency,
        contact_phone: Option<String>,
        contact_email: Option<String>,
    ) -> ExpansionRequest {
        ExpansionRequest {
            selected_service: self.selected_service,
            reason: reason.into(),
            urgency,
            contact_phone,
            contact_email,
        }
    }
}

/// Expansion request urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Baja,
    #[default]
    Media,
    Alta,
}

/// Service expansion request submitted on a `contact` alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_contact_channel"))]
pub struct ExpansionRequest {
    pub selected_service: ServiceType,

    #[validate(length(min = 10, message = "El motivo debe tener al menos 10 caracteres"))]
    pub reason: String,

    pub urgency: Urgency,

    #[serde(default)]
    #[validate(length(min = 7, max = 20, message = "Teléfono de contacto inválido"))]
    pub contact_phone: Option<String>,

    #[serde(default)]
    #[validate(email(message = "Correo de contacto inválido"))]
    pub contact_email: Option<String>,
}

fn validate_contact_channel(request: &ExpansionRequest) -> Result<(), ValidationError> {
    let has_phone = request
        .contact_phone
        .as_deref()
        .is_some_and(|phone| !phone.trim().is_empty());
    let has_email = request
        .contact_email
        .as_deref()
        .is_some_and(|email| !email.trim().is_empty());

    if has_phone || has_email {
        Ok(())
    } else {
        let mut err = ValidationError::new("contact_required");
        err.message = Some("Indique un teléfono o correo de contacto".into());
        Err(err)
    }
}
