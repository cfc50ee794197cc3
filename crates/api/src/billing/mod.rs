//! Payment processor integration.
//!
//! Handlers talk to the processor through the [`PaymentProvider`] trait so
//! the HTTP client can be swapped out in tests. [`stripe`] holds the real
//! client and [`webhook`] turns verified webhook payloads into actions on
//! the `subscriptions` table.

pub mod stripe;
pub mod webhook;

use async_trait::async_trait;
use serde::Serialize;

/// Errors from the payment processor layer.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The processor returned a non-2xx status code.
    #[error("Payment API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// No API key is configured for this deployment.
    #[error("Payment provider is not configured")]
    NotConfigured,
}

/// Parameters for a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub price_id: String,
    /// `"subscription"` or `"payment"`.
    pub mode: &'static str,
    pub success_url: String,
    pub cancel_url: String,
    /// Our user id, echoed back on `checkout.session.completed`.
    pub client_reference_id: String,
    /// Existing processor customer to reuse, if the user has one.
    pub customer_id: Option<String>,
    /// Prefills the checkout form when there is no customer yet.
    pub customer_email: Option<String>,
    pub metadata: Vec<(String, String)>,
    /// Connected account the session is created on behalf of.
    pub connected_account: Option<String>,
}

/// A created checkout session: redirect the browser to `url`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// A created billing portal session.
#[derive(Debug, Clone, Serialize)]
pub struct PortalSession {
    pub url: String,
}

/// Hosted checkout and billing portal operations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
        connected_account: Option<&str>,
    ) -> Result<PortalSession, PaymentError>;
}
