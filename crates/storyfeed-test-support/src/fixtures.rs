//! Story fixtures.

use chrono::{DateTime, Duration, TimeZone, Utc};
use storyfeed_core::story::{ProductSummary, SellerInfo, Slide, Story, StoryContent};
use uuid::Uuid;

/// Fixed timestamp shared across tests.
///
/// # Panics
///
/// Never; the literal date is valid.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Builder for test stories. Defaults to a single image slide from a random
/// seller, created one hour before [`fixed_now`], not yet viewed.
#[derive(Debug, Clone)]
pub struct StoryFixture {
    story: Story,
}

impl StoryFixture {
    /// Start a fixture created at `created_at`.
    #[must_use]
    pub fn created_at(created_at: DateTime<Utc>) -> Self {
        Self {
            story: Story {
                id: Uuid::new_v4(),
                seller_id: Some(Uuid::new_v4()),
                product_id: Uuid::new_v4(),
                seller: SellerInfo {
                    username: "seller".to_owned(),
                    avatar_url: Some("https://cdn.test/avatar.png".to_owned()),
                },
                product: ProductSummary {
                    name: "Desk lamp".to_owned(),
                    image_url: None,
                    price_cents: 4_500,
                },
                slides: vec![Slide::new(StoryContent::Image {
                    media_url: "https://cdn.test/story.jpg".to_owned(),
                })],
                caption: None,
                created_at,
                expires_at: Story::expiry_for(created_at),
                views_count: 0,
                interactions_count: 0,
                is_viewed: false,
            },
        }
    }

    /// Start a fixture created `ago` before [`fixed_now`].
    #[must_use]
    pub fn aged(ago: Duration) -> Self {
        Self::created_at(fixed_now() - ago)
    }

    /// Set the story id.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.story.id = id;
        self
    }

    /// Set the seller id and username.
    #[must_use]
    pub fn seller(mut self, seller_id: Option<Uuid>, username: &str) -> Self {
        self.story.seller_id = seller_id;
        self.story.seller.username = username.to_owned();
        self
    }

    /// Set the product id.
    #[must_use]
    pub fn product(mut self, product_id: Uuid) -> Self {
        self.story.product_id = product_id;
        self
    }

    /// Mark as viewed.
    #[must_use]
    pub fn viewed(mut self, is_viewed: bool) -> Self {
        self.story.is_viewed = is_viewed;
        self
    }

    /// Replace the slides.
    #[must_use]
    pub fn slides(mut self, slides: Vec<Slide>) -> Self {
        self.story.slides = slides;
        self
    }

    /// Set one slide with an explicit duration.
    #[must_use]
    pub fn single_slide(mut self, content: StoryContent, duration_secs: Option<u32>) -> Self {
        self.story.slides = vec![Slide {
            content,
            duration_secs,
        }];
        self
    }

    /// Set the caption.
    #[must_use]
    pub fn caption(mut self, caption: &str) -> Self {
        self.story.caption = Some(caption.to_owned());
        self
    }

    /// Finish the fixture.
    #[must_use]
    pub fn build(self) -> Story {
        self.story
    }
}
