//! Local expiration sweep.
//!
//! Re-applies the validity check to an already aggregated working set. This
//! never talks to the backend; server-side purging happens independently.

use chrono::{DateTime, Utc};
use storyfeed_core::time_window;

use super::aggregation::AggregatedStories;

/// Drops expired stories and emptied groups. Returns how many stories were
/// removed.
pub fn sweep(working_set: &mut AggregatedStories, now: DateTime<Utc>) -> usize {
    let before = working_set.stories.len();
    working_set
        .stories
        .retain(|story| time_window::is_valid(story, now));
    for group in &mut working_set.groups {
        group
            .stories
            .retain(|story| time_window::is_valid(story, now));
    }
    working_set.groups.retain(|group| !group.stories.is_empty());
    before - working_set.stories.len()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use storyfeed_test_support::{StoryFixture, fixed_now};
    use uuid::Uuid;

    use super::*;
    use crate::domain::aggregation::aggregate;

    #[test]
    fn test_sweep_removes_stories_that_expired_since_aggregation() {
        // Arrange
        let seller_id = Some(Uuid::new_v4());
        let almost_expired = StoryFixture::aged(Duration::hours(23) + Duration::minutes(59))
            .seller(seller_id, "fay")
            .build();
        let fresh = StoryFixture::aged(Duration::hours(1))
            .seller(seller_id, "fay")
            .build();
        let lone = StoryFixture::aged(Duration::hours(23) + Duration::minutes(30))
            .seller(Some(Uuid::new_v4()), "gus")
            .build();
        let mut working_set = aggregate(
            vec![almost_expired.clone(), fresh.clone(), lone],
            Vec::new(),
            fixed_now(),
        );

        // Act
        let removed = sweep(&mut working_set, fixed_now() + Duration::hours(1));

        // Assert
        assert_eq!(removed, 2);
        assert_eq!(working_set.stories.len(), 1);
        assert_eq!(working_set.stories[0].id, fresh.id);
        assert_eq!(working_set.groups.len(), 1);
        assert!(
            working_set.groups[0]
                .stories
                .iter()
                .all(|s| s.id != almost_expired.id)
        );
    }

    #[test]
    fn test_sweep_without_expiry_removes_nothing() {
        let mut working_set = aggregate(
            vec![StoryFixture::aged(Duration::hours(1)).build()],
            Vec::new(),
            fixed_now(),
        );
        let before = working_set.clone();

        let removed = sweep(&mut working_set, fixed_now());

        assert_eq!(removed, 0);
        assert_eq!(working_set, before);
    }
}
