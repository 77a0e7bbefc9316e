//! In-process collaborators for Rescate
//!
//! The entitlement engine is pure; the services in this crate are the
//! stateful side it hands off to when a user acts on an alert.
//!
//! # Services
//!
//! - `InMemoryUsageLedger` - Per-subscriber usage store. Consumption and
//!   purchase confirmation are applied and re-evaluated under one lock.
//! - `ExpansionRequestQueue` - Validates and stamps service expansion requests

pub mod expansion;
pub mod ledger;

pub use expansion::{ExpansionRequestQueue, SubmittedExpansion};
pub use ledger::{InMemoryUsageLedger, UsageUpdate};
