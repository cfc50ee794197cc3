//! REST client for the Stripe checkout and billing portal endpoints.
//!
//! Requests are form-encoded and authenticated with the secret key. When a
//! tenant has a connected account the `Stripe-Account` header makes the
//! call on that account's behalf.

use async_trait::async_trait;
use serde::Deserialize;

use super::{CheckoutRequest, CheckoutSession, PaymentError, PaymentProvider, PortalSession};
use crate::config::non_empty_env;

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Stripe credentials and endpoint.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key. Unset disables checkout and the billing portal.
    pub secret_key: Option<String>,
    /// Signing secret for `POST /api/stripe/webhook`. Unset rejects all webhooks.
    pub webhook_secret: Option<String>,
    pub api_base: String,
}

impl StripeConfig {
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `STRIPE_SECRET_KEY`     | unset                    |
    /// | `STRIPE_WEBHOOK_SECRET` | unset                    |
    /// | `STRIPE_API_BASE`       | `https://api.stripe.com` |
    pub fn from_env() -> Self {
        Self {
            secret_key: non_empty_env("STRIPE_SECRET_KEY"),
            webhook_secret: non_empty_env("STRIPE_WEBHOOK_SECRET"),
            api_base: non_empty_env("STRIPE_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

/// HTTP client for the Stripe API.
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: Option<String>,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PortalResponse {
    url: String,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(client: reqwest::Client, config: &StripeConfig) -> Self {
        if config.secret_key.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY is not set; checkout and portal are disabled");
        }
        Self {
            client,
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.clone(),
        }
    }

    /// Form fields for `POST /v1/checkout/sessions`.
    pub fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), request.mode.into()),
            ("line_items[0][price]".into(), request.price_id.clone()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("client_reference_id".into(), request.client_reference_id.clone()),
        ];

        match (&request.customer_id, &request.customer_email) {
            (Some(customer), _) => form.push(("customer".into(), customer.clone())),
            (None, Some(email)) => form.push(("customer_email".into(), email.clone())),
            (None, None) => {}
        }

        for (key, value) in &request.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
            // Subscription events only carry the subscription's own metadata.
            if request.mode == "subscription" {
                form.push((format!("subscription_data[metadata][{key}]"), value.clone()));
            }
        }
        form
    }

    fn authorized(
        &self,
        builder: reqwest::RequestBuilder,
        connected_account: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, PaymentError> {
        let key = self.secret_key.as_deref().ok_or(PaymentError::NotConfigured)?;
        let builder = builder.bearer_auth(key);
        Ok(match connected_account {
            Some(account) => builder.header("Stripe-Account", account),
            None => builder,
        })
    }

    /// Return the response on 2xx, otherwise an [`PaymentError::Api`] with
    /// the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let builder = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .form(&Self::checkout_form(request));

        let response = self
            .authorized(builder, request.connected_account.as_deref())?
            .send()
            .await?;
        let session: SessionResponse = Self::ensure_success(response).await?.json().await?;

        Ok(CheckoutSession {
            url: session.url.unwrap_or_default(),
            id: session.id,
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
        connected_account: Option<&str>,
    ) -> Result<PortalSession, PaymentError> {
        let builder = self
            .client
            .post(format!("{}/v1/billing_portal/sessions", self.api_base))
            .form(&[("customer", customer_id), ("return_url", return_url)]);

        let response = self.authorized(builder, connected_account)?.send().await?;
        let portal: PortalResponse = Self::ensure_success(response).await?.json().await?;

        Ok(PortalSession { url: portal.url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: &'static str) -> CheckoutRequest {
        CheckoutRequest {
            price_id: "price_123".into(),
            mode,
            success_url: "https://app.test/billing?success=1".into(),
            cancel_url: "https://app.test/pricing".into(),
            client_reference_id: "42".into(),
            customer_id: None,
            customer_email: Some("sam@example.com".into()),
            metadata: vec![("tenant_id".into(), "7".into())],
            connected_account: None,
        }
    }

    fn value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn subscription_checkout_copies_metadata_to_subscription() {
        let form = StripeClient::checkout_form(&request("subscription"));
        assert_eq!(value(&form, "mode"), Some("subscription"));
        assert_eq!(value(&form, "line_items[0][price]"), Some("price_123"));
        assert_eq!(value(&form, "metadata[tenant_id]"), Some("7"));
        assert_eq!(value(&form, "subscription_data[metadata][tenant_id]"), Some("7"));
        assert_eq!(value(&form, "customer_email"), Some("sam@example.com"));
    }

    #[test]
    fn payment_checkout_prefers_existing_customer() {
        let mut req = request("payment");
        req.customer_id = Some("cus_9".into());
        let form = StripeClient::checkout_form(&req);
        assert_eq!(value(&form, "customer"), Some("cus_9"));
        assert_eq!(value(&form, "customer_email"), None);
        assert_eq!(value(&form, "subscription_data[metadata][tenant_id]"), None);
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let client = StripeClient::new(&StripeConfig {
            secret_key: None,
            webhook_secret: None,
            api_base: DEFAULT_API_BASE.into(),
        });
        let err = client
            .create_portal_session("cus_1", "https://app.test", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotConfigured));
    }
}
