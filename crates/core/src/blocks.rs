//! Dashboard content blocks.
//!
//! A tenant's dashboard is an ordered list of editable blocks. Each block has
//! a type and a JSON `content` object whose required keys depend on the type.

use serde_json::Value;

use crate::error::CoreError;

pub const BLOCK_HERO: &str = "hero";
pub const BLOCK_RICH_TEXT: &str = "rich_text";
pub const BLOCK_VIDEO_ROW: &str = "video_row";
pub const BLOCK_PROGRAM_GRID: &str = "program_grid";
pub const BLOCK_ANNOUNCEMENT: &str = "announcement";
pub const BLOCK_CALL_TO_ACTION: &str = "call_to_action";

pub const VALID_BLOCK_TYPES: &[&str] = &[
    BLOCK_HERO,
    BLOCK_RICH_TEXT,
    BLOCK_VIDEO_ROW,
    BLOCK_PROGRAM_GRID,
    BLOCK_ANNOUNCEMENT,
    BLOCK_CALL_TO_ACTION,
];

/// Maximum serialized size of a block's content.
pub const MAX_CONTENT_BYTES: usize = 64 * 1024;

pub fn validate_block_type(block_type: &str) -> Result<(), CoreError> {
    if VALID_BLOCK_TYPES.contains(&block_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid block type '{block_type}'. Must be one of: {VALID_BLOCK_TYPES:?}"
        )))
    }
}

fn require_string(content: &Value, key: &str, block_type: &str) -> Result<(), CoreError> {
    match content.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "{block_type} block requires a non-empty string '{key}'"
        ))),
    }
}

fn require_id_array(
    content: &Value,
    key: &str,
    block_type: &str,
    non_empty: bool,
) -> Result<(), CoreError> {
    let Some(items) = content.get(key).and_then(Value::as_array) else {
        return Err(CoreError::Validation(format!(
            "{block_type} block requires an array '{key}'"
        )));
    };
    if non_empty && items.is_empty() {
        return Err(CoreError::Validation(format!(
            "{block_type} block requires at least one entry in '{key}'"
        )));
    }
    if !items.iter().all(|v| v.as_i64().is_some_and(|id| id > 0)) {
        return Err(CoreError::Validation(format!(
            "'{key}' must contain positive integer ids"
        )));
    }
    Ok(())
}

/// Validate a block's content object against its type.
pub fn validate_content(block_type: &str, content: &Value) -> Result<(), CoreError> {
    validate_block_type(block_type)?;

    if !content.is_object() {
        return Err(CoreError::Validation(
            "Block content must be a JSON object".into(),
        ));
    }
    if content.to_string().len() > MAX_CONTENT_BYTES {
        return Err(CoreError::Validation(format!(
            "Block content exceeds {MAX_CONTENT_BYTES} bytes"
        )));
    }

    match block_type {
        BLOCK_HERO => require_string(content, "heading", block_type),
        BLOCK_RICH_TEXT => require_string(content, "html", block_type),
        BLOCK_VIDEO_ROW => require_id_array(content, "video_ids", block_type, true),
        BLOCK_PROGRAM_GRID => require_id_array(content, "program_ids", block_type, false),
        BLOCK_ANNOUNCEMENT => require_string(content, "message", block_type),
        BLOCK_CALL_TO_ACTION => {
            require_string(content, "label", block_type)?;
            require_string(content, "href", block_type)
        }
        _ => Ok(()),
    }
}

/// Validate that a reorder request lists every existing block exactly once.
pub fn validate_reorder(existing: &[i64], requested: &[i64]) -> Result<(), CoreError> {
    let mut a = existing.to_vec();
    let mut b = requested.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    if a != b {
        return Err(CoreError::Validation(
            "Reorder must list every dashboard block exactly once".into(),
        ));
    }
    Ok(())
}
