//! Story aggregation.
//!
//! Followed-seller stories and the user's own stories are filtered by
//! validity, deduplicated by id, grouped by seller and ordered. Own stories
//! always count as viewed.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyfeed_core::story::{SellerInfo, Story};
use storyfeed_core::time_window;
use uuid::Uuid;

/// Grouping key for a seller.
///
/// The seller id when present; otherwise `unknown-<username>`, so malformed
/// rows still group deterministically without colliding with real ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SellerKey(String);

impl SellerKey {
    /// Derives the key for a story.
    #[must_use]
    pub fn for_story(story: &Story) -> Self {
        match story.seller_id {
            Some(seller_id) => Self(seller_id.to_string()),
            None => Self(format!("unknown-{}", story.seller.username)),
        }
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SellerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// All valid stories of one seller, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerGroup {
    /// Grouping key.
    pub key: SellerKey,
    /// Seller id, when known.
    pub seller_id: Option<Uuid>,
    /// Seller display data, taken from the first story seen.
    pub seller: SellerInfo,
    /// Stories in playback order.
    pub stories: Vec<Story>,
}

impl SellerGroup {
    /// Returns `true` if any story in the group is unviewed.
    #[must_use]
    pub fn has_unviewed(&self) -> bool {
        self.stories.iter().any(|s| !s.is_viewed)
    }

    /// Index of the first unviewed story, or 0 when all are viewed.
    #[must_use]
    pub fn first_unviewed_index(&self) -> usize {
        self.stories.iter().position(|s| !s.is_viewed).unwrap_or(0)
    }

    /// The most recently created story.
    #[must_use]
    pub fn latest(&self) -> Option<&Story> {
        self.stories.iter().max_by_key(|s| s.created_at)
    }
}

/// Result of aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedStories {
    /// Every valid story once, newest first.
    pub stories: Vec<Story>,
    /// Seller groups in construction order (followed sources first).
    pub groups: Vec<SellerGroup>,
}

impl AggregatedStories {
    /// Total number of stories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stories.len()
    }

    /// Returns `true` when there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    /// Looks up a group by key.
    #[must_use]
    pub fn group(&self, key: &SellerKey) -> Option<&SellerGroup> {
        self.groups.iter().find(|g| &g.key == key)
    }
}

/// Aggregates the two story sources at `now`.
#[must_use]
pub fn aggregate(
    followed: Vec<Story>,
    own: Vec<Story>,
    now: DateTime<Utc>,
) -> AggregatedStories {
    let own = own.into_iter().map(|mut story| {
        story.is_viewed = true;
        story
    });

    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut stories: Vec<Story> = Vec::new();
    let mut groups: Vec<SellerGroup> = Vec::new();
    let mut group_index: HashMap<SellerKey, usize> = HashMap::new();

    for story in followed.into_iter().chain(own) {
        if !time_window::is_valid(&story, now) {
            continue;
        }
        if !seen.insert(story.id) {
            continue;
        }

        let key = SellerKey::for_story(&story);
        let index = *group_index.entry(key.clone()).or_insert_with(|| {
            groups.push(SellerGroup {
                key,
                seller_id: story.seller_id,
                seller: story.seller.clone(),
                stories: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].stories.push(story.clone());
        stories.push(story);
    }

    for group in &mut groups {
        group.stories.sort_by_key(|s| s.created_at);
    }
    stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    AggregatedStories { stories, groups }
}
