//! Billing rules: subscription statuses, price intervals, price labels, and
//! payment webhook signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Subscription status
// ---------------------------------------------------------------------------

/// Subscription lifecycle status, mirroring the payment processor's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
    Unpaid,
}

impl SubscriptionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::Unpaid => "unpaid",
        }
    }

    /// Map a processor status string onto the stored status.
    ///
    /// `incomplete_expired` folds into `canceled` and `paused` into `unpaid`.
    pub fn from_provider(value: &str) -> Result<Self, CoreError> {
        match value {
            "active" => Ok(Self::Active),
            "trialing" => Ok(Self::Trialing),
            "past_due" => Ok(Self::PastDue),
            "canceled" | "incomplete_expired" => Ok(Self::Canceled),
            "incomplete" => Ok(Self::Incomplete),
            "unpaid" | "paused" => Ok(Self::Unpaid),
            other => Err(CoreError::Validation(format!(
                "Unknown subscription status '{other}'"
            ))),
        }
    }

    /// Whether this status unlocks subscriber-only content.
    pub fn grants_access(self) -> bool {
        matches!(self, Self::Active | Self::Trialing)
    }
}

/// Convenience for stored status strings.
pub fn status_grants_access(status: &str) -> bool {
    SubscriptionStatus::from_provider(status).is_ok_and(SubscriptionStatus::grants_access)
}

// ---------------------------------------------------------------------------
// Billing interval
// ---------------------------------------------------------------------------

pub const INTERVAL_MONTH: &str = "month";
pub const INTERVAL_YEAR: &str = "year";
pub const INTERVAL_ONE_TIME: &str = "one_time";

pub const VALID_INTERVALS: &[&str] = &[INTERVAL_MONTH, INTERVAL_YEAR, INTERVAL_ONE_TIME];

pub fn validate_interval(interval: &str) -> Result<(), CoreError> {
    if VALID_INTERVALS.contains(&interval) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid billing interval '{interval}'. Must be one of: {VALID_INTERVALS:?}"
        )))
    }
}

/// Checkout mode for an interval: recurring prices open a subscription.
pub fn checkout_mode(interval: &str) -> &'static str {
    if interval == INTERVAL_ONE_TIME {
        "payment"
    } else {
        "subscription"
    }
}

/// Validate a product price.
pub fn validate_price(price_cents: i64, currency: &str) -> Result<(), CoreError> {
    if price_cents < 0 {
        return Err(CoreError::Validation("price_cents must not be negative".into()));
    }
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(CoreError::Validation(
            "currency must be a 3-letter ISO code".into(),
        ));
    }
    Ok(())
}

/// Human-readable price, e.g. `$19.00 / month` or `€49.00`.
pub fn price_label(price_cents: i64, currency: &str, interval: &str) -> String {
    let code = currency.to_ascii_uppercase();
    let amount = format!("{}.{:02}", price_cents / 100, price_cents % 100);
    let money = match code.as_str() {
        "USD" | "CAD" | "AUD" => format!("${amount}"),
        "EUR" => format!("€{amount}"),
        "GBP" => format!("£{amount}"),
        _ => format!("{amount} {code}"),
    };
    match interval {
        INTERVAL_MONTH | INTERVAL_YEAR => format!("{money} / {interval}"),
        _ => money,
    }
}

// ---------------------------------------------------------------------------
// Webhook signatures
// ---------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

/// Default tolerance between the signed timestamp and now.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Compute the `v1` signature for a payload signed at `timestamp`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a `Stripe-Signature` style header (`t=<unix>,v1=<hex>[,v1=...]`).
///
/// Passes when any `v1` entry matches and the timestamp is within
/// `tolerance_secs` of `now`. Comparison is constant time.
pub fn verify_signature(
    header: &str,
    payload: &[u8],
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), CoreError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<Vec<u8>> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| CoreError::Validation("Signature header is missing a timestamp".into()))?;
    if signatures.is_empty() {
        return Err(CoreError::Validation(
            "Signature header has no v1 signature".into(),
        ));
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(CoreError::Validation(
            "Signature timestamp outside tolerance".into(),
        ));
    }

    let matched = signatures.iter().any(|sig| {
        let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => return false,
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(sig).is_ok()
    });

    if matched {
        Ok(())
    } else {
        Err(CoreError::Validation("Signature mismatch".into()))
    }
}
