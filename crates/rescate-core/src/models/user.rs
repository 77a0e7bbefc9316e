//! Subscriber model
//!
//! Represents the user snapshot handed to the entitlement engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Plan, ServiceUsage};

/// User role enumeration
///
/// Unrecognized role strings deserialize to `Unknown` instead of failing, so
/// the validation gate can report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Family plan holder
    Familiar,
    /// Corporate plan member
    Corporativo,
    /// External affiliate billed to a company
    Externo,
    /// Portal administrator
    Admin,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Familiar => write!(f, "FAMILIAR"),
            UserRole::Corporativo => write!(f, "CORPORATIVO"),
            UserRole::Externo => write!(f, "EXTERNO"),
            UserRole::Admin => write!(f, "ADMIN"),
            UserRole::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl UserRole {
    /// Whether the role is one the portal recognizes
    pub fn is_known(&self) -> bool {
        !matches!(self, UserRole::Unknown)
    }
}

/// Subscriber snapshot
///
/// A point-in-time view of a user, their plan and their current-period usage.
/// The engine never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Subscriber {
    /// Unique identifier
    #[serde(default)]
    pub id: i32,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Subscriber role
    #[serde(default)]
    pub role: UserRole,

    /// Contracted plan
    #[serde(default)]
    pub plan: Option<Plan>,

    /// Usage for the current period
    #[serde(default)]
    pub service_usage: Option<ServiceUsage>,
}

impl Subscriber {
    /// Get display name, falling back to the identifier
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("#{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_role_deserializes() {
        let role: UserRole = serde_json::from_str("\"SUPERVISOR\"").unwrap();
        assert_eq!(role, UserRole::Unknown);
        assert!(!role.is_known());

        let role: UserRole = serde_json::from_str("\"EXTERNO\"").unwrap();
        assert_eq!(role, UserRole::Externo);
    }

    #[test]
    fn test_display_name() {
        let subscriber = Subscriber {
            id: 42,
            name: Some("Ana Rojas".to_string()),
            ..Default::default()
        };
        assert_eq!(subscriber.display_name(), "Ana Rojas");

        let anonymous = Subscriber {
            id: 42,
            ..Default::default()
        };
        assert_eq!(anonymous.display_name(), "#42");
    }
}
