//! Validity window arithmetic.
//!
//! A story is valid while `now < expires_at`. Remaining time is never
//! negative, and the human-readable label has minute granularity so that a
//! list re-rendered every frame does not flicker.

use chrono::{DateTime, Duration, Utc};

use crate::story::Story;

/// Label shown once no time remains.
pub const EXPIRED_LABEL: &str = "Expired";

/// Returns `true` while the story is inside its validity window.
#[must_use]
pub fn is_valid(story: &Story, now: DateTime<Utc>) -> bool {
    now < story.expires_at
}

/// Time left until the story expires, clamped at zero.
#[must_use]
pub fn remaining(story: &Story, now: DateTime<Utc>) -> Duration {
    (story.expires_at - now).max(Duration::zero())
}

/// Formats a remaining duration as `"Hh Mm"`, `"Mm"` or [`EXPIRED_LABEL`].
///
/// Seconds are floored away. A story with under a minute left that is still
/// valid renders as `"0m"`; only a zero duration renders as expired.
#[must_use]
pub fn format(remaining: Duration) -> String {
    if remaining <= Duration::zero() {
        return EXPIRED_LABEL.to_owned();
    }
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;
    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Convenience wrapper: the label for a story at `now`.
#[must_use]
pub fn label(story: &Story, now: DateTime<Utc>) -> String {
    format(remaining(story, now))
}
