//! Webhook payload parsing.
//!
//! The signature is checked by `lms_core::billing::verify_signature` before
//! anything here runs. [`parse_action`] then maps the event onto the one
//! change it implies for our `subscriptions` table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lms_core::billing::SubscriptionStatus;
use lms_core::error::CoreError;
use lms_core::types::DbId;
use lms_db::models::subscription::{ActivateSubscription, SyncSubscription};
use serde::Deserialize;

pub const EVENT_CHECKOUT_COMPLETED: &str = "checkout.session.completed";
pub const EVENT_SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
pub const EVENT_SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";

/// Envelope shared by every webhook event.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    customer: Option<String>,
    subscription: Option<String>,
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionObject {
    id: String,
    status: String,
    current_period_end: Option<i64>,
    #[serde(default)]
    cancel_at_period_end: bool,
}

/// What a webhook event asks us to do.
#[derive(Debug)]
pub enum WebhookAction {
    Activate(ActivateSubscription),
    Sync(SyncSubscription),
    /// Event type we do not handle, one missing our metadata, or a
    /// subscription status we cannot map.
    Ignore(String),
}

fn metadata_id(metadata: &HashMap<String, String>, key: &str) -> Option<DbId> {
    metadata.get(key).and_then(|v| v.parse().ok())
}

/// Map a parsed event onto a [`WebhookAction`].
///
/// Returns `Validation` only when a handled event type has an object that
/// does not deserialize.
pub fn parse_action(event: &WebhookEvent) -> Result<WebhookAction, CoreError> {
    match event.event_type.as_str() {
        EVENT_CHECKOUT_COMPLETED => {
            let session: CheckoutSessionObject = serde_json::from_value(event.data.object.clone())
                .map_err(|e| CoreError::Validation(format!("Malformed checkout session: {e}")))?;

            let user_id = metadata_id(&session.metadata, "user_id").or_else(|| {
                session
                    .client_reference_id
                    .as_deref()
                    .and_then(|v| v.parse().ok())
            });
            let (Some(tenant_id), Some(user_id)) =
                (metadata_id(&session.metadata, "tenant_id"), user_id)
            else {
                return Ok(WebhookAction::Ignore(
                    "checkout session without tenant/user metadata".into(),
                ));
            };

            Ok(WebhookAction::Activate(ActivateSubscription {
                tenant_id,
                user_id,
                product_id: metadata_id(&session.metadata, "product_id"),
                stripe_customer_id: session.customer,
                stripe_subscription_id: session.subscription,
                status: SubscriptionStatus::Active.as_str().to_string(),
            }))
        }
        EVENT_SUBSCRIPTION_UPDATED | EVENT_SUBSCRIPTION_DELETED => {
            let sub: SubscriptionObject = serde_json::from_value(event.data.object.clone())
                .map_err(|e| CoreError::Validation(format!("Malformed subscription: {e}")))?;

            let status = if event.event_type == EVENT_SUBSCRIPTION_DELETED {
                SubscriptionStatus::Canceled
            } else {
                match SubscriptionStatus::from_provider(&sub.status) {
                    Ok(status) => status,
                    Err(_) => {
                        tracing::warn!(
                            event_id = %event.id,
                            status = %sub.status,
                            "Subscription status has no local mapping"
                        );
                        return Ok(WebhookAction::Ignore(format!(
                            "unmapped subscription status {}",
                            sub.status
                        )));
                    }
                }
            };

            Ok(WebhookAction::Sync(SyncSubscription {
                stripe_subscription_id: sub.id,
                status: status.as_str().to_string(),
                current_period_end: sub
                    .current_period_end
                    .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
                cancel_at_period_end: sub.cancel_at_period_end,
            }))
        }
        other => Ok(WebhookAction::Ignore(format!("unhandled event type {other}"))),
    }
}
