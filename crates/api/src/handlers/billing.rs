//! Handlers for checkout, the billing portal, subscriptions and webhooks.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use lms_core::billing::{
    checkout_mode, status_grants_access, verify_signature, SIGNATURE_TOLERANCE_SECS,
};
use lms_core::error::CoreError;
use lms_core::types::DbId;
use lms_db::models::subscription::Subscription;
use lms_db::models::tenant::Tenant;
use lms_db::repositories::{ProductRepo, SubscriptionRepo, TenantRepo, UserRepo};
use lms_events::{event_types, PlatformEvent};
use serde::{Deserialize, Serialize};

use super::products::product_not_found;
use crate::billing::webhook::{parse_action, WebhookAction, WebhookEvent};
use crate::billing::{CheckoutRequest, CheckoutSession, PortalSession};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::TenantUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub product_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Base URL of the learner app for this tenant.
///
/// Tenants with a custom domain redirect there; others use the platform URL.
fn app_base_url(config: &ServerConfig, tenant: &Tenant) -> String {
    match &tenant.domain {
        Some(domain) => format!("https://{domain}"),
        None => config.public_app_url.trim_end_matches('/').to_string(),
    }
}

/// GET /api/lms/billing/subscription
///
/// `data` is `null` when the caller never subscribed.
pub async fn subscription(
    State(state): State<AppState>,
    user: TenantUser,
) -> AppResult<Json<DataResponse<Option<Subscription>>>> {
    let sub = SubscriptionRepo::find_for_user(&state.pool, user.tenant_id(), user.user_id).await?;
    Ok(Json(DataResponse { data: sub }))
}

/// POST /api/stripe/create-tenant-checkout-session
pub async fn create_checkout_session(
    State(state): State<AppState>,
    user: TenantUser,
    Json(input): Json<CheckoutBody>,
) -> AppResult<Json<CheckoutSession>> {
    let product = ProductRepo::find_in_tenant(&state.pool, user.tenant_id(), input.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| product_not_found(input.product_id))?;

    let existing =
        SubscriptionRepo::find_for_user(&state.pool, user.tenant_id(), user.user_id).await?;
    if existing
        .as_ref()
        .is_some_and(|s| status_grants_access(&s.status))
    {
        return Err(AppError::Core(CoreError::Conflict(
            "You already have an active subscription".into(),
        )));
    }

    let email = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .map(|u| u.email);
    let base = app_base_url(&state.config, &user.tenant);

    let request = CheckoutRequest {
        price_id: product.stripe_price_id.clone(),
        mode: checkout_mode(&product.billing_interval),
        success_url: format!("{base}/billing/success?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{base}/pricing"),
        client_reference_id: user.user_id.to_string(),
        customer_id: existing.and_then(|s| s.stripe_customer_id),
        customer_email: email,
        metadata: vec![
            ("tenant_id".into(), user.tenant_id().to_string()),
            ("user_id".into(), user.user_id.to_string()),
            ("product_id".into(), product.id.to_string()),
        ],
        connected_account: user.tenant.stripe_account_id.clone(),
    };

    let session = state.payments.create_checkout_session(&request).await?;
    tracing::info!(
        tenant_id = user.tenant_id(),
        user_id = user.user_id,
        product_id = product.id,
        session_id = %session.id,
        "Checkout session created"
    );
    Ok(Json(session))
}

/// POST /api/stripe/create-portal-session
pub async fn create_portal_session(
    State(state): State<AppState>,
    user: TenantUser,
) -> AppResult<Json<PortalSession>> {
    let customer_id = SubscriptionRepo::find_for_user(&state.pool, user.tenant_id(), user.user_id)
        .await?
        .and_then(|s| s.stripe_customer_id)
        .ok_or_else(|| AppError::NotFound("No billing account for this user".into()))?;

    let return_url = format!("{}/account/billing", app_base_url(&state.config, &user.tenant));
    let session = state
        .payments
        .create_portal_session(
            &customer_id,
            &return_url,
            user.tenant.stripe_account_id.as_deref(),
        )
        .await?;
    Ok(Json(session))
}

/// POST /api/stripe/webhook
///
/// Verifies the signature over the raw body, then applies the event.
/// Events we do not handle are acknowledged so the processor stops retrying.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let secret = state.config.stripe.webhook_secret.as_deref().ok_or_else(|| {
        tracing::error!("Webhook received but STRIPE_WEBHOOK_SECRET is not set");
        AppError::InternalError("Webhook signing secret is not configured".into())
    })?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;

    verify_signature(
        signature,
        &body,
        secret,
        Utc::now().timestamp(),
        SIGNATURE_TOLERANCE_SECS,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook signature");
        AppError::Core(e)
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    match parse_action(&event)? {
        WebhookAction::Activate(input) => {
            let tenant_ok = TenantRepo::find_by_id(&state.pool, input.tenant_id)
                .await?
                .is_some();
            let user_ok = UserRepo::find_in_tenant(&state.pool, input.tenant_id, input.user_id)
                .await?
                .is_some();
            if !(tenant_ok && user_ok) {
                tracing::warn!(
                    event_id = %event.id,
                    tenant_id = input.tenant_id,
                    user_id = input.user_id,
                    "Checkout metadata does not match a tenant user, ignoring"
                );
                return Ok(Json(WebhookAck { received: true }));
            }

            let sub = SubscriptionRepo::activate(&state.pool, &input).await?;
            tracing::info!(
                event_id = %event.id,
                tenant_id = sub.tenant_id,
                user_id = sub.user_id,
                "Subscription activated"
            );
            state.event_bus.publish(
                PlatformEvent::new(event_types::SUBSCRIPTION_ACTIVATED, sub.tenant_id)
                    .with_source("subscription", sub.id)
                    .with_payload(serde_json::json!({
                        "user_id": sub.user_id,
                        "product_id": sub.product_id,
                    })),
            );
        }
        WebhookAction::Sync(input) => {
            match SubscriptionRepo::sync(&state.pool, &input).await? {
                Some(sub) => {
                    tracing::info!(
                        event_id = %event.id,
                        subscription_id = sub.id,
                        status = %sub.status,
                        "Subscription synced"
                    );
                    state.event_bus.publish(
                        PlatformEvent::new(event_types::SUBSCRIPTION_UPDATED, sub.tenant_id)
                            .with_source("subscription", sub.id)
                            .with_payload(serde_json::json!({
                                "user_id": sub.user_id,
                                "status": sub.status,
                            })),
                    );
                }
                None => tracing::warn!(
                    event_id = %event.id,
                    stripe_subscription_id = %input.stripe_subscription_id,
                    "Subscription update for unknown subscription"
                ),
            }
        }
        WebhookAction::Ignore(reason) => {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, %reason, "Webhook ignored");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}
