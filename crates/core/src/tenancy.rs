//! Tenant resolution order.
//!
//! A request is mapped to a tenant by trying, in order: an exact custom
//! domain match, a subdomain of the platform base domain, the `tenant`
//! cookie, and finally the configured default slug. This module only
//! computes the ordered list of lookups; the API layer runs them against
//! the database.

/// Name of the cookie carrying an explicit tenant slug.
pub const TENANT_COOKIE: &str = "tenant";

/// Maximum slug length (one DNS label).
pub const MAX_SLUG_LEN: usize = 63;

/// A single way of looking up a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantLookup {
    /// Match `tenants.domain` exactly.
    Domain(String),
    /// Match `tenants.slug` exactly.
    Slug(String),
}

/// Normalize a `Host` header value for domain matching.
///
/// Lowercases, strips the port, a trailing dot, and a leading `www.`.
/// Returns `None` for an empty host.
pub fn normalize_host(host: &str) -> Option<String> {
    let host = host.trim().to_ascii_lowercase();
    // IPv6 literals keep their brackets; only strip a port after them.
    let without_port = if let Some(rest) = host.strip_prefix('[') {
        match rest.find(']') {
            Some(end) => &host[..end + 2],
            None => host.as_str(),
        }
    } else {
        host.split(':').next().unwrap_or_default()
    };
    let trimmed = without_port.trim_end_matches('.');
    let trimmed = trimmed.strip_prefix("www.").unwrap_or(trimmed);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Returns `true` if `slug` is 1-63 chars of `[a-z0-9-]` and does not start
/// or end with a hyphen.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Extract the single-label subdomain of `base_domain` from a normalized host.
///
/// `acme.lms.example` with base `lms.example` yields `acme`; nested labels
/// (`a.b.lms.example`) and the bare base domain yield `None`.
pub fn subdomain_slug(host: &str, base_domain: &str) -> Option<String> {
    let base = base_domain.trim().trim_matches('.').to_ascii_lowercase();
    if base.is_empty() {
        return None;
    }
    let prefix = host.strip_suffix(&base)?.strip_suffix('.')?;
    if prefix.contains('.') || !is_valid_slug(prefix) {
        return None;
    }
    Some(prefix.to_string())
}

/// Read a single cookie value from a raw `Cookie` header.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"'))
    })
}

/// Compute the ordered, de-duplicated list of tenant lookups for a request.
pub fn resolution_candidates(
    host: Option<&str>,
    cookie_slug: Option<&str>,
    base_domain: Option<&str>,
    default_slug: Option<&str>,
) -> Vec<TenantLookup> {
    let mut candidates = Vec::with_capacity(4);

    if let Some(host) = host.and_then(normalize_host) {
        let sub = base_domain.and_then(|base| subdomain_slug(&host, base));
        candidates.push(TenantLookup::Domain(host));
        if let Some(sub) = sub {
            candidates.push(TenantLookup::Slug(sub));
        }
    }

    for slug in [cookie_slug, default_slug].into_iter().flatten() {
        let slug = slug.trim().to_ascii_lowercase();
        if is_valid_slug(&slug) {
            candidates.push(TenantLookup::Slug(slug));
        }
    }

    let mut seen = Vec::with_capacity(candidates.len());
    candidates.retain(|c| {
        if seen.contains(c) {
            false
        } else {
            seen.push(c.clone());
            true
        }
    });
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_port_www_and_case() {
        assert_eq!(
            normalize_host("WWW.Academy.Example.com:8443").as_deref(),
            Some("academy.example.com")
        );
        assert_eq!(normalize_host("example.com.").as_deref(), Some("example.com"));
        assert_eq!(normalize_host("  "), None);
    }

    #[test]
    fn normalize_keeps_ipv6_literal() {
        assert_eq!(normalize_host("[::1]:3000").as_deref(), Some("[::1]"));
    }

    #[test]
    fn slug_rules() {
        assert!(is_valid_slug("acme"));
        assert!(is_valid_slug("acme-2"));
        assert!(!is_valid_slug("-acme"));
        assert!(!is_valid_slug("acme-"));
        assert!(!is_valid_slug("Acme"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(&"a".repeat(64)));
    }

    #[test]
    fn subdomain_requires_single_label() {
        assert_eq!(
            subdomain_slug("acme.lms.example", "lms.example").as_deref(),
            Some("acme")
        );
        assert_eq!(subdomain_slug("a.b.lms.example", "lms.example"), None);
        assert_eq!(subdomain_slug("lms.example", "lms.example"), None);
        assert_eq!(subdomain_slug("acmelms.example", "lms.example"), None);
    }

    #[test]
    fn cookie_lookup() {
        let header = "theme=dark; tenant=acme ; other=1";
        assert_eq!(cookie_value(header, "tenant"), Some("acme"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn candidates_follow_precedence() {
        let got = resolution_candidates(
            Some("acme.lms.example:443"),
            Some("beta"),
            Some("lms.example"),
            Some("main"),
        );
        assert_eq!(
            got,
            vec![
                TenantLookup::Domain("acme.lms.example".into()),
                TenantLookup::Slug("acme".into()),
                TenantLookup::Slug("beta".into()),
                TenantLookup::Slug("main".into()),
            ]
        );
    }

    #[test]
    fn candidates_skip_invalid_cookie_and_dedupe() {
        let got = resolution_candidates(
            Some("school.org"),
            Some("../etc"),
            None,
            Some("school"),
        );
        assert_eq!(
            got,
            vec![
                TenantLookup::Domain("school.org".into()),
                TenantLookup::Slug("school".into()),
            ]
        );

        let got = resolution_candidates(None, Some("main"), None, Some("main"));
        assert_eq!(got, vec![TenantLookup::Slug("main".into())]);
    }

    #[test]
    fn no_inputs_yield_no_candidates() {
        assert!(resolution_candidates(None, None, None, None).is_empty());
    }
}
