//! Expansion request intake
//!
//! Accepts service expansion requests raised from `contact` alerts. Requests
//! are validated, checked against a known subscriber and stamped with an id
//! and submission time.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rescate_core::{
    models::ExpansionRequest,
    traits::{ExpansionReceipt, ExpansionRequestService, SubscriberSource},
    AppError,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Accepted expansion request
#[derive(Debug, Clone)]
pub struct SubmittedExpansion {
    pub receipt: ExpansionReceipt,
    pub request: ExpansionRequest,
}

/// In-memory expansion request queue
pub struct ExpansionRequestQueue<S: SubscriberSource> {
    subscribers: Arc<S>,
    pending: Mutex<Vec<SubmittedExpansion>>,
}

impl<S: SubscriberSource> ExpansionRequestQueue<S> {
    pub fn new(subscribers: Arc<S>) -> Self {
        Self {
            subscribers,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Requests accepted so far, oldest first
    pub fn pending(&self) -> Vec<SubmittedExpansion> {
        self.pending.lock().clone()
    }

    /// Remove and return every pending request
    pub fn drain(&self) -> Vec<SubmittedExpansion> {
        std::mem::take(&mut *self.pending.lock())
    }
}

#[async_trait]
impl<S: SubscriberSource> ExpansionRequestService for ExpansionRequestQueue<S> {
    #[instrument(skip(self, request), fields(service_type = %request.selected_service))]
    async fn submit(
        &self,
        subscriber_id: i32,
        request: &ExpansionRequest,
    ) -> Result<ExpansionReceipt, AppError> {
        if let Err(e) = request.validate() {
            warn!(subscriber = subscriber_id, "Expansion request rejected: {}", e);
            return Err(e.into());
        }

        self.subscribers.snapshot(subscriber_id).await?;

        let receipt = ExpansionReceipt {
            request_id: Uuid::new_v4(),
            subscriber_id,
            submitted_at: Utc::now(),
        };

        self.pending.lock().push(SubmittedExpansion {
            receipt: receipt.clone(),
            request: request.clone(),
        });

        info!(
            subscriber = subscriber_id,
            request_id = %receipt.request_id,
            urgency = ?request.urgency,
            "Expansion request submitted"
        );

        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryUsageLedger;
    use rescate_core::models::{Alert, AlertType, Handoff, ServiceType, Subscriber, Urgency};
    use rescate_entitlements::EntitlementEngine;

    fn queue() -> ExpansionRequestQueue<InMemoryUsageLedger> {
        let subscriber = Subscriber {
            id: 3,
            ..Default::default()
        };
        let ledger =
            InMemoryUsageLedger::with_subscribers(EntitlementEngine::default(), vec![subscriber]);
        ExpansionRequestQueue::new(Arc::new(ledger))
    }

    fn draft_request(phone: Option<&str>, email: Option<&str>) -> ExpansionRequest {
        let alert = Alert::contact(
            AlertType::Warning,
            ServiceType::General,
            "Servicios corporativos por agotarse",
            "Quedan 3 servicios",
            false,
        );
        let Ok(Handoff::Contact(draft)) = alert.handoff() else {
            panic!("expected a contact handoff");
        };
        draft.complete(
            "Necesitamos ampliar la bolsa para el trimestre",
            Urgency::Alta,
            phone.map(str::to_string),
            email.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_submit_stamps_and_queues() {
        let queue = queue();
        let receipt = queue
            .submit(3, &draft_request(None, Some("rrhh@empresa.cl")))
            .await
            .unwrap();

        assert_eq!(receipt.subscriber_id, 3);
        let pending = queue.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].receipt.request_id, receipt.request_id);
        assert_eq!(pending[0].request.selected_service, ServiceType::General);

        assert_eq!(queue.drain().len(), 1);
        assert!(queue.pending().is_empty());
    }

    #[tokio::test]
    async fn test_submit_requires_contact_channel() {
        let queue = queue();
        let err = queue.submit(3, &draft_request(None, None)).await.unwrap_err();
        assert_eq!(err.error_code(), "validation_error");
        assert!(queue.pending().is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_short_reason() {
        let mut request = draft_request(Some("+56912345678"), None);
        request.reason = "urgente".to_string();
        let err = queue().submit(3, &request).await.unwrap_err();
        assert_eq!(err.error_code(), "validation_error");
    }

    #[tokio::test]
    async fn test_submit_unknown_subscriber() {
        let err = queue()
            .submit(42, &draft_request(Some("+56912345678"), None))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "subscriber_not_found");
    }
}
