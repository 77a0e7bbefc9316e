//! Limits payload model
//!
//! The limits panel receives a map of service type to raw limit value. Two
//! input shapes exist (wrapped in `general`, or a legacy bare map); both are
//! normalized through explicit constructors into one canonical payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Plan, ServiceType, Subscriber, UserRole};

/// Raw limit value as received from the service layer
///
/// Values that match none of the accepted shapes are kept as `Malformed` so
/// the validation gate can report them instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLimit {
    /// `{used, limit}` pair
    Tracked { used: u32, limit: u32 },
    /// Remaining services of a shared pool
    Count(u32),
    /// Marker string (e.g. "ILIMITADO")
    Marker(String),
    /// Anything else
    Malformed(serde_json::Value),
}

/// Wrapped limits shape: `{ "general": { ... } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WrappedLimits {
    #[serde(default)]
    pub general: IndexMap<ServiceType, RawLimit>,
}

/// Canonical limits payload
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LimitsPayload {
    general: IndexMap<ServiceType, RawLimit>,
}

impl LimitsPayload {
    /// Normalize the `{general: map}` input shape
    pub fn from_wrapped(wrapped: WrappedLimits) -> Self {
        Self {
            general: wrapped.general,
        }
    }

    /// Normalize the legacy bare-map input shape
    pub fn from_bare(entries: IndexMap<ServiceType, RawLimit>) -> Self {
        Self { general: entries }
    }

    /// Entries in input order
    pub fn entries(&self) -> impl Iterator<Item = (&ServiceType, &RawLimit)> {
        self.general.iter()
    }

    pub fn get(&self, service_type: &ServiceType) -> Option<&RawLimit> {
        self.general.get(service_type)
    }

    pub fn len(&self) -> usize {
        self.general.len()
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_empty()
    }
}

impl FromIterator<(ServiceType, RawLimit)> for LimitsPayload {
    fn from_iter<I: IntoIterator<Item = (ServiceType, RawLimit)>>(iter: I) -> Self {
        Self {
            general: iter.into_iter().collect(),
        }
    }
}

/// Aggregate read request for one subscriber
///
/// `limits` carries the wrapped shape and `legacy_limits` the bare map; when
/// both are present the wrapped one wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitlementQuery {
    /// Panel title
    #[serde(default)]
    pub title: String,

    /// Subscriber snapshot
    #[serde(default)]
    pub user: Subscriber,

    /// Limits in the `{general: map}` shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<WrappedLimits>,

    /// Limits in the legacy bare-map shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_limits: Option<IndexMap<ServiceType, RawLimit>>,
}

impl EntitlementQuery {
    /// Canonical limits payload of this query
    pub fn limits_payload(&self) -> LimitsPayload {
        match (&self.limits, &self.legacy_limits) {
            (Some(wrapped), _) => LimitsPayload::from_wrapped(wrapped.clone()),
            (None, Some(bare)) => LimitsPayload::from_bare(bare.clone()),
            (None, None) => LimitsPayload::default(),
        }
    }

    pub fn user_type(&self) -> UserRole {
        self.user.role
    }

    pub fn plan_info(&self) -> Option<&Plan> {
        self.user.plan.as_ref()
    }
}
