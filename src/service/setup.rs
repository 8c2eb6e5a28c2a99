//! Gateway-side setup performed when the merchant saves configuration.

use crate::config::QualpaySettings;
use crate::domain::platform::{EmbeddedKey, Webhook, WebhookStatus};
use crate::manager::{QualpayError, QualpayManager};
use crate::service::webhook_processor::{
    EVENT_SUBSCRIPTION_COMPLETE, EVENT_SUBSCRIPTION_PAYMENT_FAILURE,
    EVENT_SUBSCRIPTION_PAYMENT_SUCCESS, EVENT_SUBSCRIPTION_SUSPENDED, EVENT_VALIDATE_URL,
};

pub const WEBHOOK_LABEL: &str = "storefront-plugin-webhook";

/// Returns the registered webhook, creating one when no id is configured
/// yet. The reply carries the per-merchant secret that must be persisted for
/// signature verification.
pub async fn ensure_webhook(
    manager: &QualpayManager,
    settings: &QualpaySettings,
    notification_url: &str,
) -> Result<Webhook, QualpayError> {
    if let Some(id) = settings
        .webhook_id
        .as_deref()
        .and_then(|id| id.parse::<i64>().ok())
    {
        if let Some(existing) = manager.get_webhook(id).await? {
            return Ok(existing);
        }
    }

    manager
        .create_webhook(Webhook {
            label: Some(WEBHOOK_LABEL.to_string()),
            notification_url: Some(notification_url.to_string()),
            status: Some(WebhookStatus::Active),
            events: vec![
                EVENT_VALIDATE_URL.to_string(),
                EVENT_SUBSCRIPTION_PAYMENT_SUCCESS.to_string(),
                EVENT_SUBSCRIPTION_PAYMENT_FAILURE.to_string(),
                EVENT_SUBSCRIPTION_SUSPENDED.to_string(),
                EVENT_SUBSCRIPTION_COMPLETE.to_string(),
            ],
            ..Default::default()
        })
        .await
}

/// Short-lived key for the embedded-fields hosted form shown at checkout.
pub async fn embedded_transient_key(
    manager: &QualpayManager,
    settings: &QualpaySettings,
) -> Result<EmbeddedKey, QualpayError> {
    if !settings.use_embedded_fields {
        return Err(QualpayError::Config(
            "embedded fields are not enabled".to_string(),
        ));
    }
    manager
        .get_transient_key()
        .await?
        .ok_or_else(|| QualpayError::Config("gateway returned no transient key".to_string()))
}
