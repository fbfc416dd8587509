//! Playback arithmetic.
//!
//! Progress is always derived from elapsed wall-clock time, never
//! accumulated per tick, so a late or skipped tick cannot make playback
//! drift.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyfeed_core::story::Story;
use storyfeed_core::time_window;

/// Whether the viewer's timer is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// The timer runs and progress advances.
    Playing,
    /// The timer is stopped; progress is frozen.
    Paused,
}

/// Percentage of `duration` covered by `elapsed`, capped at 100.
///
/// A zero duration is complete immediately.
#[must_use]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64() * 100.0).min(100.0)
}

/// Elapsed time between `started_at` and `now`, clamped at zero.
#[must_use]
pub fn elapsed_since(started_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - started_at).to_std().unwrap_or(Duration::ZERO)
}

/// Slide boundaries of one story.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryTimeline {
    slide_ends: Vec<Duration>,
    total: Duration,
}

impl StoryTimeline {
    /// Lays out `story` at `now`.
    ///
    /// Each slide plays for its explicit duration or `default_slide`. The
    /// total is capped by the story's remaining validity, so a story close
    /// to expiry finishes before it disappears. A story without slides
    /// gets one default slot.
    #[must_use]
    pub fn for_story(story: &Story, now: DateTime<Utc>, default_slide: Duration) -> Self {
        let mut slide_ends = Vec::with_capacity(story.slides.len().max(1));
        let mut end = Duration::ZERO;
        for slide in &story.slides {
            end += slide
                .duration_secs
                .map_or(default_slide, |secs| Duration::from_secs(u64::from(secs)));
            slide_ends.push(end);
        }
        if slide_ends.is_empty() {
            end = default_slide;
            slide_ends.push(end);
        }
        let ttl = time_window::remaining(story, now)
            .to_std()
            .unwrap_or(Duration::ZERO);
        Self {
            slide_ends,
            total: end.min(ttl),
        }
    }

    /// Total playback time.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Index of the slide playing after `elapsed`.
    #[must_use]
    pub fn slide_at(&self, elapsed: Duration) -> usize {
        self.slide_ends
            .iter()
            .position(|end| elapsed < *end)
            .unwrap_or(self.slide_ends.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use storyfeed_core::story::{Slide, StoryContent};
    use storyfeed_test_support::{StoryFixture, fixed_now};

    use super::*;

    const DEFAULT_SLIDE: Duration = Duration::from_secs(5);

    fn text(label: &str) -> StoryContent {
        StoryContent::Text {
            content: label.to_owned(),
            background_color: "#000000".to_owned(),
            text_color: "#ffffff".to_owned(),
            font_size: 24,
        }
    }

    #[test]
    fn test_progress_is_proportional_and_capped() {
        let duration = Duration::from_millis(5_000);

        assert!((progress(Duration::from_millis(2_500), duration) - 50.0).abs() < f64::EPSILON);
        assert!((progress(Duration::from_secs(9), duration) - 100.0).abs() < f64::EPSILON);
        assert!((progress(Duration::ZERO, Duration::ZERO) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_elapsed_since_clamps_future_start() {
        let now = fixed_now();

        assert_eq!(
            elapsed_since(now + ChronoDuration::seconds(1), now),
            Duration::ZERO
        );
    }

    #[test]
    fn test_timeline_sums_explicit_and_default_durations() {
        // Arrange
        let story = StoryFixture::aged(ChronoDuration::hours(1))
            .slides(vec![
                Slide {
                    content: text("one"),
                    duration_secs: Some(3),
                },
                Slide::new(text("two")),
            ])
            .build();

        // Act
        let timeline = StoryTimeline::for_story(&story, fixed_now(), DEFAULT_SLIDE);

        // Assert
        assert_eq!(timeline.total(), Duration::from_secs(8));
        assert_eq!(timeline.slide_at(Duration::from_millis(2_999)), 0);
        assert_eq!(timeline.slide_at(Duration::from_secs(3)), 1);
        assert_eq!(timeline.slide_at(Duration::from_secs(30)), 1);
    }

    #[test]
    fn test_timeline_is_capped_by_remaining_validity() {
        let story = StoryFixture::aged(ChronoDuration::hours(24) - ChronoDuration::seconds(2))
            .build();

        let timeline = StoryTimeline::for_story(&story, fixed_now(), DEFAULT_SLIDE);

        assert_eq!(timeline.total(), Duration::from_secs(2));
    }

    #[test]
    fn test_story_without_slides_gets_default_slot() {
        let story = StoryFixture::aged(ChronoDuration::hours(1))
            .slides(Vec::new())
            .build();

        let timeline = StoryTimeline::for_story(&story, fixed_now(), DEFAULT_SLIDE);

        assert_eq!(timeline.total(), DEFAULT_SLIDE);
        assert_eq!(timeline.slide_at(Duration::ZERO), 0);
    }
}
