//! Listing and search helpers shared by catalog endpoints.

use crate::error::CoreError;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: i64 = 24;
/// Hard upper bound on page size.
pub const MAX_LIMIT: i64 = 100;
/// Maximum length of a free-text search term.
pub const MAX_SEARCH_TERM_LEN: usize = 100;

/// Clamp a user-provided limit to `[1, max]`, defaulting when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Turn a search term into an `ILIKE` pattern, escaping `%`, `_` and `\`.
///
/// Blank terms yield `None` (no filter).
pub fn like_pattern(term: Option<&str>) -> Result<Option<String>, CoreError> {
    let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    if term.chars().count() > MAX_SEARCH_TERM_LEN {
        return Err(CoreError::Validation(format!(
            "Search term must be at most {MAX_SEARCH_TERM_LEN} characters"
        )));
    }
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Ok(Some(escaped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
    }

    #[test]
    fn clamp_limit_respects_bounds() {
        assert_eq!(clamp_limit(Some(200), 20, 100), 100);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(Some(-4)), 0);
        assert_eq!(clamp_offset(None), 0);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(
            like_pattern(Some(" 100%_off ")).unwrap().as_deref(),
            Some("%100\\%\\_off%")
        );
        assert_eq!(like_pattern(Some("   ")).unwrap(), None);
        assert!(like_pattern(Some(&"x".repeat(101))).is_err());
    }
}
