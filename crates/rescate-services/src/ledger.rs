//! Usage ledger
//!
//! Holds the current-period usage of each subscriber and applies the two
//! mutations the engine hands off to: consuming a service and confirming the
//! purchase of an additional one.
//!
//! Each mutation checks the allowance, mutates and re-evaluates alerts while
//! holding the ledger lock, so concurrent confirmations for the same
//! subscriber are serialized and `used <= limit` / `remaining >= 0` hold
//! after every call.

use async_trait::async_trait;
use parking_lot::Mutex;
use rescate_core::{
    models::{Alert, AlertAction, PurchaseConfirmation, ServiceType, ServiceUsage, Subscriber},
    traits::{SubscriberSource, UsageMutationService},
    AppError, AppResult,
};
use rescate_entitlements::EntitlementEngine;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Result of a ledger mutation
#[derive(Debug, Clone)]
pub struct UsageUpdate {
    /// Subscriber snapshot after the mutation
    pub subscriber: Subscriber,
    /// Alerts re-evaluated against the new snapshot
    pub alerts: Vec<Alert>,
}

/// In-memory usage ledger
pub struct InMemoryUsageLedger {
    engine: EntitlementEngine,
    subscribers: Mutex<HashMap<i32, Subscriber>>,
}

impl InMemoryUsageLedger {
    /// Create an empty ledger
    pub fn new(engine: EntitlementEngine) -> Self {
        Self {
            engine,
            subscribers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a ledger seeded with subscriber snapshots
    pub fn with_subscribers(
        engine: EntitlementEngine,
        subscribers: impl IntoIterator<Item = Subscriber>,
    ) -> Self {
        let ledger = Self::new(engine);
        for subscriber in subscribers {
            ledger.upsert(subscriber);
        }
        ledger
    }

    /// Insert or replace a subscriber snapshot
    pub fn upsert(&self, subscriber: Subscriber) {
        debug!(subscriber = subscriber.id, "Subscriber stored in ledger");
        self.subscribers.lock().insert(subscriber.id, subscriber);
    }

    /// Number of subscribers held
    pub fn len(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().is_empty()
    }

    /// Current alerts for a subscriber
    pub fn alerts(&self, subscriber_id: i32) -> AppResult<Vec<Alert>> {
        let subscribers = self.subscribers.lock();
        let subscriber = subscribers
            .get(&subscriber_id)
            .ok_or_else(|| AppError::SubscriberNotFound(subscriber_id.to_string()))?;
        Ok(self.engine.alerts(subscriber))
    }

    /// Apply a mutation and re-evaluate alerts as one unit
    ///
    /// The mutation works on a copy; the stored snapshot is only replaced when
    /// it succeeds.
    fn apply<F>(&self, subscriber_id: i32, mutation: F) -> AppResult<UsageUpdate>
    where
        F: FnOnce(&mut Subscriber, &[Alert]) -> AppResult<()>,
    {
        let mut subscribers = self.subscribers.lock();
        let stored = subscribers
            .get_mut(&subscriber_id)
            .ok_or_else(|| AppError::SubscriberNotFound(subscriber_id.to_string()))?;

        let current_alerts = self.engine.alerts(stored);
        let mut working = stored.clone();
        mutation(&mut working, &current_alerts)?;

        let alerts = self.engine.alerts(&working);
        *stored = working;

        Ok(UsageUpdate {
            subscriber: stored.clone(),
            alerts,
        })
    }

    /// Consume one service and return the re-evaluated snapshot
    #[instrument(skip(self))]
    pub fn record_consumption(
        &self,
        subscriber_id: i32,
        service_type: &ServiceType,
    ) -> AppResult<UsageUpdate> {
        let update = self.apply(subscriber_id, |subscriber, _| {
            let pool_total = subscriber.plan.as_ref().and_then(|plan| plan.total_services);
            usage_mut(subscriber)?.consume(service_type, pool_total)
        });

        match &update {
            Ok(update) => info!(
                subscriber = %update.subscriber.display_name(),
                service_type = %service_type,
                alerts = update.alerts.len(),
                "Service consumed"
            ),
            Err(e) => warn!(
                subscriber = subscriber_id,
                service_type = %service_type,
                error = %e,
                "Consumption refused"
            ),
        }
        update
    }

    /// Apply a confirmed purchase and return the re-evaluated snapshot
    ///
    /// The purchase must match a purchase alert currently offered to the
    /// subscriber: service type, cost and offer version. Applying a purchase
    /// advances the usage counter the offer was computed against, so a second
    /// confirmation of the same offer is refused as stale.
    #[instrument(skip(self, confirmation), fields(service_type = %confirmation.service_type))]
    pub fn record_purchase(
        &self,
        subscriber_id: i32,
        confirmation: &PurchaseConfirmation,
    ) -> AppResult<UsageUpdate> {
        let update = self.apply(subscriber_id, |subscriber, alerts| {
            let offered = alerts.iter().find(|alert| {
                alert.action == AlertAction::Purchase
                    && alert.service_type == confirmation.service_type
            });

            let Some((cost, offer_version)) =
                offered.and_then(|alert| alert.cost.zip(alert.offer_version))
            else {
                return Err(AppError::InvalidInput(format!(
                    "no purchase offered for {}",
                    confirmation.service_type
                )));
            };
            if offer_version != confirmation.offer_version {
                return Err(AppError::InvalidInput(format!(
                    "purchase offer {} for {} is stale, current offer is {}",
                    confirmation.offer_version, confirmation.service_type, offer_version
                )));
            }
            if cost != confirmation.cost_applied {
                return Err(AppError::InvalidInput(format!(
                    "cost {} does not match offered cost {}",
                    confirmation.cost_applied, cost
                )));
            }

            let pooled = matches!(subscriber.service_usage, Some(ServiceUsage::Pooled(_)));
            usage_mut(subscriber)?.record_purchase(&confirmation.service_type)?;

            // A pooled plan with a declared size grows with each purchase
            if pooled {
                if let Some(total) = subscriber
                    .plan
                    .as_mut()
                    .and_then(|plan| plan.total_services.as_mut())
                {
                    *total = total.checked_add(1).ok_or_else(|| {
                        AppError::InvalidInput("pool size overflow".to_string())
                    })?;
                }
            }
            Ok(())
        });

        match &update {
            Ok(update) => info!(
                subscriber = %update.subscriber.display_name(),
                cost = %confirmation.cost_applied,
                "Additional service purchased"
            ),
            Err(e) => warn!(subscriber = subscriber_id, error = %e, "Purchase refused"),
        }
        update
    }
}

fn usage_mut(subscriber: &mut Subscriber) -> AppResult<&mut ServiceUsage> {
    let id = subscriber.id;
    subscriber
        .service_usage
        .as_mut()
        .ok_or_else(|| AppError::UsageShapeMismatch(format!("subscriber {} has no usage", id)))
}

#[async_trait]
impl SubscriberSource for InMemoryUsageLedger {
    async fn snapshot(&self, subscriber_id: i32) -> Result<Subscriber, AppError> {
        self.subscribers
            .lock()
            .get(&subscriber_id)
            .cloned()
            .ok_or_else(|| AppError::SubscriberNotFound(subscriber_id.to_string()))
    }
}

#[async_trait]
impl UsageMutationService for InMemoryUsageLedger {
    async fn consume(
        &self,
        subscriber_id: i32,
        service_type: &ServiceType,
    ) -> Result<Subscriber, AppError> {
        self.record_consumption(subscriber_id, service_type)
            .map(|update| update.subscriber)
    }

    async fn confirm_purchase(
        &self,
        subscriber_id: i32,
        confirmation: &PurchaseConfirmation,
    ) -> Result<Subscriber, AppError> {
        self.record_purchase(subscriber_id, confirmation)
            .map(|update| update.subscriber)
    }
}
