//! Story bar layout.
//!
//! The bar always starts with the "create" affordance. Seller groups with
//! anything unviewed come next, then fully viewed groups; construction order
//! is kept inside each partition.

use chrono::{DateTime, Utc};
use serde::Serialize;
use storyfeed_core::story::Story;
use storyfeed_core::time_window;

use super::aggregation::{SellerGroup, SellerKey};

/// A seller avatar in the bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerTile {
    /// Grouping key, used to select the tile.
    pub key: SellerKey,
    /// Seller username.
    pub username: String,
    /// Seller avatar URL.
    pub avatar_url: Option<String>,
    /// Number of valid stories.
    pub story_count: usize,
    /// Whether to draw the "unseen" ring.
    pub has_unviewed: bool,
    /// Remaining-time label of the newest story.
    pub expires_label: String,
}

/// One entry of the bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarItem {
    /// The "add story" button.
    Create,
    /// A seller's stories.
    Seller(SellerTile),
}

/// What the viewer should play after a tile is selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerLaunch {
    /// All stories in bar order.
    pub stories: Vec<Story>,
    /// Where playback starts.
    pub start_index: usize,
}

/// Groups in bar order: unviewed first, stable otherwise.
#[must_use]
pub fn ordered_groups(groups: &[SellerGroup]) -> Vec<&SellerGroup> {
    let (unviewed, viewed): (Vec<&SellerGroup>, Vec<&SellerGroup>) =
        groups.iter().partition(|g| g.has_unviewed());
    unviewed.into_iter().chain(viewed).collect()
}

/// Builds the bar at `now`.
#[must_use]
pub fn bar_items(groups: &[SellerGroup], now: DateTime<Utc>) -> Vec<BarItem> {
    std::iter::once(BarItem::Create)
        .chain(ordered_groups(groups).into_iter().map(|group| {
            BarItem::Seller(SellerTile {
                key: group.key.clone(),
                username: group.seller.username.clone(),
                avatar_url: group.seller.avatar_url.clone(),
                story_count: group.stories.len(),
                has_unviewed: group.has_unviewed(),
                expires_label: group
                    .latest()
                    .map_or_else(String::new, |s| time_window::label(s, now)),
            })
        }))
        .collect()
}

/// Playlist for the tile with `key`: every story in bar order, starting at
/// the selected group's first unviewed story.
#[must_use]
pub fn launch_for(groups: &[SellerGroup], key: &SellerKey) -> Option<ViewerLaunch> {
    let mut stories = Vec::new();
    let mut start_index = None;
    for group in ordered_groups(groups) {
        if &group.key == key {
            start_index = Some(stories.len() + group.first_unviewed_index());
        }
        stories.extend(group.stories.iter().cloned());
    }
    start_index.map(|start_index| ViewerLaunch {
        stories,
        start_index,
    })
}
