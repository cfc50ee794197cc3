//! Catalog content rules: titles, slugs, comment bodies, and lesson lists.

use crate::error::CoreError;
use crate::tenancy::is_valid_slug;
use crate::types::DbId;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_COMMENT_LEN: usize = 2000;
pub const MAX_LESSONS_PER_PROGRAM: usize = 500;

/// Validate a title: non-blank and at most [`MAX_TITLE_LEN`] characters.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Derive a URL slug from a title: lowercase ASCII alphanumerics joined by
/// single hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug.truncate(crate::tenancy::MAX_SLUG_LEN);
    slug.trim_end_matches('-').to_string()
}

/// Use the explicit slug when given (it must be valid), otherwise derive one.
pub fn resolve_slug(explicit: Option<&str>, title: &str) -> Result<String, CoreError> {
    let slug = match explicit {
        Some(s) => s.trim().to_string(),
        None => slugify(title),
    };
    if !is_valid_slug(&slug) {
        return Err(CoreError::Validation(format!(
            "Invalid slug '{slug}'. Use lowercase letters, digits and hyphens"
        )));
    }
    Ok(slug)
}

/// Trim and validate a comment body, returning the stored text.
pub fn normalize_comment(body: &str) -> Result<String, CoreError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Comment must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_COMMENT_LEN {
        return Err(CoreError::Validation(format!(
            "Comment must be at most {MAX_COMMENT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate an ordered lesson list: no duplicates, bounded length.
pub fn validate_lesson_order(video_ids: &[DbId]) -> Result<(), CoreError> {
    if video_ids.len() > MAX_LESSONS_PER_PROGRAM {
        return Err(CoreError::Validation(format!(
            "A program may contain at most {MAX_LESSONS_PER_PROGRAM} lessons"
        )));
    }
    let mut seen = std::collections::HashSet::with_capacity(video_ids.len());
    for id in video_ids {
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!(
                "Video {id} appears more than once in the lesson list"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Intro to Rust: Part 1!  "), "intro-to-rust-part-1");
        assert_eq!(slugify("Été 2026"), "t-2026");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn resolve_slug_prefers_explicit() {
        assert_eq!(resolve_slug(Some("custom"), "Title").unwrap(), "custom");
        assert_eq!(resolve_slug(None, "Yoga Basics").unwrap(), "yoga-basics");
        assert!(resolve_slug(Some("Bad Slug"), "x").is_err());
        assert!(resolve_slug(None, "!!!").is_err());
    }

    #[test]
    fn titles() {
        assert!(validate_title("Warmup").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"t".repeat(201)).is_err());
    }

    #[test]
    fn comment_bodies_are_trimmed() {
        assert_eq!(normalize_comment("  great video \n").unwrap(), "great video");
        assert!(normalize_comment(" \n ").is_err());
        assert!(normalize_comment(&"c".repeat(2001)).is_err());
    }

    #[test]
    fn lesson_order_rejects_duplicates() {
        assert!(validate_lesson_order(&[3, 1, 2]).is_ok());
        assert!(validate_lesson_order(&[1, 2, 1]).is_err());
        assert!(validate_lesson_order(&[]).is_ok());
    }
}
