//! Video and program progress math.

use crate::error::CoreError;

/// A video counts as completed once this share of it has been watched.
pub const COMPLETION_THRESHOLD_PERCENT: f64 = 90.0;

/// Upper bound on reported playback positions (24 hours).
pub const MAX_POSITION_SECS: f64 = 86_400.0;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole` as a percentage with one decimal, `0.0` when `whole` is 0.
pub fn percentage(part: i64, whole: i64) -> f64 {
    if whole <= 0 {
        return 0.0;
    }
    round1((part as f64 / whole as f64 * 100.0).clamp(0.0, 100.0))
}

/// Validate a progress report from the player.
pub fn validate_report(position_secs: f64, duration_secs: f64) -> Result<(), CoreError> {
    if !position_secs.is_finite() || position_secs < 0.0 || position_secs > MAX_POSITION_SECS {
        return Err(CoreError::Validation(format!(
            "position_secs must be between 0 and {MAX_POSITION_SECS}"
        )));
    }
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(CoreError::Validation(
            "duration_secs must be greater than 0".into(),
        ));
    }
    Ok(())
}

/// Percent watched for a playback position, clamped to `[0, 100]`.
pub fn percent_watched(position_secs: f64, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    round1((position_secs / duration_secs * 100.0).clamp(0.0, 100.0))
}

/// Whether a percent value reaches the completion threshold.
pub fn is_complete(percent: f64) -> bool {
    percent >= COMPLETION_THRESHOLD_PERCENT
}

/// Stored state of one user's progress on one video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    pub position_secs: f64,
    pub percent_complete: f64,
    pub completed: bool,
}

/// Outcome of merging a report into the stored state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub state: ProgressState,
    /// `true` only on the report that first crosses the threshold.
    pub newly_completed: bool,
}

/// Merge a new report into the previous state.
///
/// The furthest position wins so scrubbing backwards never loses progress,
/// and completion is sticky.
pub fn merge(previous: Option<ProgressState>, position_secs: f64, duration_secs: f64) -> ProgressUpdate {
    let reported_percent = percent_watched(position_secs, duration_secs);
    let was_completed = previous.is_some_and(|p| p.completed);

    let (position_secs, percent_complete) = match previous {
        Some(prev) if prev.position_secs >= position_secs => {
            (prev.position_secs, prev.percent_complete.max(reported_percent))
        }
        _ => (position_secs, reported_percent),
    };

    let completed = was_completed || is_complete(percent_complete);

    ProgressUpdate {
        state: ProgressState {
            position_secs,
            percent_complete,
            completed,
        },
        newly_completed: completed && !was_completed,
    }
}
