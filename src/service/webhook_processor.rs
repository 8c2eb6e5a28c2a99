use crate::domain::platform::{Subscription, SubscriptionStatus, WebhookEvent};
use crate::host::{OrderStore, RecurringHistoryEntry};
use crate::manager::QualpayManager;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-qualpay-webhook-signature";

pub const EVENT_SUBSCRIPTION_PAYMENT_SUCCESS: &str = "subscription_payment_success";
pub const EVENT_SUBSCRIPTION_PAYMENT_FAILURE: &str = "subscription_payment_failure";
pub const EVENT_SUBSCRIPTION_SUSPENDED: &str = "subscription_suspended";
pub const EVENT_SUBSCRIPTION_COMPLETE: &str = "subscription_complete";
pub const EVENT_VALIDATE_URL: &str = "validate_url";

/// Pure signature check: base64(HMAC-SHA256(secret, raw body)) must exactly
/// match one of the header values. A header may carry several signatures,
/// comma-separated. The raw bytes are signed, so callers must never
/// re-serialize the payload before verifying.
pub fn signature_matches(raw_body: &[u8], secret: &str, header_values: &[String]) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    let expected = BASE64.encode(mac.finalize().into_bytes());

    header_values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|signature| signature == expected)
}

/// Handles inbound gateway notifications. Whatever happens inside, the HTTP
/// layer answers 200: a non-success reply would only provoke redelivery of a
/// request we already know we cannot process.
pub struct WebhookProcessor {
    pub secret: String,
    pub manager: QualpayManager,
    pub store: Arc<dyn OrderStore>,
}

impl WebhookProcessor {
    /// Verifies the signature and decodes the typed payload. `None` means
    /// the request must be ignored; the reason is logged here, once.
    pub fn verify(&self, raw_body: &[u8], signatures: &[String]) -> Option<WebhookEvent<Subscription>> {
        if self.secret.is_empty() {
            tracing::warn!("webhook received but no webhook secret is configured");
            return None;
        }
        if signatures.is_empty() {
            tracing::warn!("webhook request carried no signature header");
            return None;
        }
        if !signature_matches(raw_body, &self.secret, signatures) {
            tracing::warn!("webhook signature did not match; dropping request");
            return None;
        }
        match WebhookEvent::from_body(raw_body) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(error = %e, "webhook payload failed to decode");
                None
            }
        }
    }

    pub async fn handle(&self, raw_body: &[u8], signatures: Vec<String>) {
        let Some(event) = self.verify(raw_body, &signatures) else {
            return;
        };
        tracing::info!(event = %event.event, "webhook accepted");

        if event.event.eq_ignore_ascii_case(EVENT_VALIDATE_URL) {
            return;
        }
        let Some(subscription) = event.data else {
            return;
        };

        if let Err(reason) = self.advance_recurring(&event.event, subscription).await {
            tracing::warn!(event = %event.event, reason, "webhook processed without effect");
        }
    }

    /// Correlates a subscription event back to the originating order and
    /// advances the local recurring record. Idempotent: a transaction id
    /// that is already recorded is a no-op, so duplicate and out-of-order
    /// deliveries are safe.
    async fn advance_recurring(
        &self,
        event_name: &str,
        subscription: Subscription,
    ) -> Result<(), &'static str> {
        let order_id = subscription
            .plan_description
            .as_deref()
            .and_then(|desc| Uuid::parse_str(desc.trim()).ok())
            .ok_or("plan description does not name an order")?;
        let record = self
            .store
            .recurring_by_initial_order(order_id)
            .ok_or("no recurring payment is linked to the order")?;

        match event_name.to_ascii_lowercase().as_str() {
            EVENT_SUBSCRIPTION_PAYMENT_FAILURE => {
                self.store.append_recurring_history(
                    order_id,
                    RecurringHistoryEntry {
                        transaction_id: None,
                        succeeded: false,
                        detail: "recurring payment failed".to_string(),
                        recorded_at: chrono::Utc::now(),
                    },
                );
                Ok(())
            }
            EVENT_SUBSCRIPTION_PAYMENT_SUCCESS => {
                let subscription_id = subscription
                    .subscription_id
                    .unwrap_or(record.subscription_id);
                let transactions = self
                    .manager
                    .get_subscription_transactions(subscription_id)
                    .await
                    .map_err(|e| {
                        tracing::warn!(error = %e, "failed to fetch subscription transactions");
                        "subscription transactions unavailable"
                    })?;
                let transaction = transactions
                    .into_iter()
                    .next()
                    .ok_or("subscription has no transactions yet")?;
                let transaction_id = transaction
                    .transaction_id
                    .ok_or("latest transaction carries no id")?;

                let already_recorded = self
                    .store
                    .recorded_transaction_ids(order_id)
                    .iter()
                    .any(|recorded| recorded.eq_ignore_ascii_case(&transaction_id));
                if already_recorded {
                    tracing::debug!(%transaction_id, "transaction already recorded; skipping");
                    return Ok(());
                }

                let succeeded = transaction
                    .status
                    .map(|status| status.is_successful())
                    .unwrap_or(false);
                self.store.append_recurring_history(
                    order_id,
                    RecurringHistoryEntry {
                        transaction_id: Some(transaction_id),
                        succeeded,
                        detail: match transaction.status {
                            Some(status) => format!("transaction is {status:?}"),
                            None => "transaction status unknown".to_string(),
                        },
                        recorded_at: chrono::Utc::now(),
                    },
                );
                Ok(())
            }
            EVENT_SUBSCRIPTION_SUSPENDED => {
                self.store
                    .set_recurring_status(order_id, SubscriptionStatus::Suspended);
                Ok(())
            }
            EVENT_SUBSCRIPTION_COMPLETE => {
                self.store
                    .set_recurring_status(order_id, SubscriptionStatus::Complete);
                Ok(())
            }
            _ => Err("event is not one this integration consumes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(body: &[u8], secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        BASE64.encode(mac.finalize().into_bytes())
    }

    #[test]
    fn matching_signature_is_accepted() {
        let body = br#"{"event":"subscription_payment_success"}"#;
        let signature = sign(body, "secret-1");
        assert!(signature_matches(body, "secret-1", &[signature]));
    }

    #[test]
    fn single_byte_change_invalidates_the_signature() {
        let body = br#"{"event":"subscription_payment_success"}"#.to_vec();
        let signature = sign(&body, "secret-1");
        let mut tampered = body.clone();
        tampered[10] ^= 1;
        assert!(signature_matches(&body, "secret-1", std::slice::from_ref(&signature)));
        assert!(!signature_matches(&tampered, "secret-1", &[signature]));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let body = b"payload";
        let signature = sign(body, "secret-1");
        assert!(!signature_matches(body, "secret-2", &[signature]));
    }

    #[test]
    fn any_of_multiple_comma_separated_signatures_may_match() {
        let body = b"payload";
        let good = sign(body, "secret-1");
        let header = format!("bogus-one, {good}");
        assert!(signature_matches(body, "secret-1", &[header]));
    }

    #[test]
    fn verification_is_deterministic() {
        let body = b"payload";
        let signature = sign(body, "secret-1");
        for _ in 0..3 {
            assert!(signature_matches(body, "secret-1", std::slice::from_ref(&signature)));
        }
    }
}
