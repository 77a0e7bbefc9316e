//! Collaborator traits
//!
//! The entitlement engine itself is pure. These traits describe the services
//! it hands off to when the user acts on an alert, plus the read side that
//! supplies snapshots.

use crate::error::AppError;
use crate::models::{ExpansionRequest, PurchaseConfirmation, ServiceType, Subscriber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Snapshot source for subscribers
#[async_trait]
pub trait SubscriberSource: Send + Sync {
    /// Point-in-time snapshot of a subscriber
    async fn snapshot(&self, subscriber_id: i32) -> Result<Subscriber, AppError>;
}

/// Usage mutation service
///
/// Implementations must serialize mutations per subscriber: the check, the
/// mutation and any re-classification form one atomic unit, so two concurrent
/// confirmations can never both observe spare allowance.
#[async_trait]
pub trait UsageMutationService: SubscriberSource {
    /// Consume one service within the current allowance
    async fn consume(
        &self,
        subscriber_id: i32,
        service_type: &ServiceType,
    ) -> Result<Subscriber, AppError>;

    /// Apply a confirmed purchase of one additional service
    async fn confirm_purchase(
        &self,
        subscriber_id: i32,
        confirmation: &PurchaseConfirmation,
    ) -> Result<Subscriber, AppError>;
}

/// Receipt for a submitted expansion request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionReceipt {
    pub request_id: Uuid,
    pub subscriber_id: i32,
    pub submitted_at: DateTime<Utc>,
}

/// Expansion request submission service
#[async_trait]
pub trait ExpansionRequestService: Send + Sync {
    /// Validate and submit a service expansion request
    async fn submit(
        &self,
        subscriber_id: i32,
        request: &ExpansionRequest,
    ) -> Result<ExpansionReceipt, AppError>;
}
