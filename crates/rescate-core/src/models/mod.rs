//! Domain models for Rescate
//!
//! This module contains the snapshot types the entitlement engine reads and
//! the alert types it produces.

pub mod alert;
pub mod limits;
pub mod plan;
pub mod usage;
pub mod user;

pub use alert::{
    Alert, AlertAction, AlertType, ExpansionDraft, ExpansionRequest, Handoff,
    PurchaseConfirmation, Urgency,
};
pub use limits::{EntitlementQuery, LimitsPayload, RawLimit, WrappedLimits};
pub use plan::{BillingInfo, Plan, PlanSubtype};
pub use usage::{CompanyUsage, PooledUsage, ServiceType, ServiceUsage, SplitUsage, UsageEntry};
pub use user::{Subscriber, UserRole};
