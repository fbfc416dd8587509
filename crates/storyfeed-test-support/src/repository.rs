//! Test repositories — mock `StoryRepository` implementations for tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use storyfeed_core::error::DomainError;
use storyfeed_core::repository::{NewStory, StoryRepository};
use storyfeed_core::story::{Interaction, ProductSummary, SellerInfo, Slide, Story};
use uuid::Uuid;

use crate::fixtures::fixed_now;

/// An in-memory story repository that records every mutation.
///
/// `owner_id` is the single user whose own stories and products the
/// repository knows about. Creating a story for a product not registered with
/// [`RecordingStoryRepository::with_owned_product`], or deleting a story that
/// is not one of the owner's, fails with `DomainError::Ownership`.
#[derive(Debug)]
pub struct RecordingStoryRepository {
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    followed: Mutex<Vec<Story>>,
    own: Mutex<Vec<Story>>,
    owned_products: Mutex<HashSet<Uuid>>,
    failing_creates: AtomicUsize,
    fetches: AtomicUsize,
    viewed: Mutex<Vec<(Uuid, Uuid)>>,
    interactions: Mutex<Vec<(Uuid, Uuid, Interaction)>>,
    created: Mutex<Vec<NewStory>>,
    deleted: Mutex<Vec<Uuid>>,
}

impl RecordingStoryRepository {
    /// Create an empty repository for `owner_id`.
    #[must_use]
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            created_at: fixed_now(),
            followed: Mutex::new(Vec::new()),
            own: Mutex::new(Vec::new()),
            owned_products: Mutex::new(HashSet::new()),
            failing_creates: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
            viewed: Mutex::new(Vec::new()),
            interactions: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    /// Stories returned by `fetch_followed_stories`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_followed(self, stories: Vec<Story>) -> Self {
        *self.followed.lock().unwrap() = stories;
        self
    }

    /// Stories returned by `fetch_own_stories` for the owner.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_own(self, stories: Vec<Story>) -> Self {
        *self.own.lock().unwrap() = stories;
        self
    }

    /// Register a product as owned by the owner.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_owned_product(self, product_id: Uuid) -> Self {
        self.owned_products.lock().unwrap().insert(product_id);
        self
    }

    /// Fail the next `count` `create_story` calls with an infrastructure error.
    #[must_use]
    pub fn with_failing_creates(self, count: usize) -> Self {
        self.failing_creates.store(count, Ordering::SeqCst);
        self
    }

    /// Replace the followed stories between fetches.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set_followed(&self, stories: Vec<Story>) {
        *self.followed.lock().unwrap() = stories;
    }

    /// Number of `fetch_followed_stories` calls.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Recorded `(story_id, user_id)` view marks.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn viewed(&self) -> Vec<(Uuid, Uuid)> {
        self.viewed.lock().unwrap().clone()
    }

    /// Recorded `(story_id, user_id, interaction)` events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn interactions(&self) -> Vec<(Uuid, Uuid, Interaction)> {
        self.interactions.lock().unwrap().clone()
    }

    /// Payloads of successful `create_story` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn created(&self) -> Vec<NewStory> {
        self.created.lock().unwrap().clone()
    }

    /// Ids of deleted stories.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn deleted(&self) -> Vec<Uuid> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryRepository for RecordingStoryRepository {
    async fn fetch_followed_stories(&self, _user_id: Uuid) -> Result<Vec<Story>, DomainError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.followed.lock().unwrap().clone())
    }

    async fn fetch_own_stories(&self, user_id: Uuid) -> Result<Vec<Story>, DomainError> {
        if user_id != self.owner_id {
            return Ok(Vec::new());
        }
        Ok(self.own.lock().unwrap().clone())
    }

    async fn create_story(
        &self,
        user_id: Uuid,
        new_story: NewStory,
    ) -> Result<Story, DomainError> {
        let owns_product = user_id == self.owner_id
            && self
                .owned_products
                .lock()
                .unwrap()
                .contains(&new_story.product_id);
        if !owns_product {
            return Err(DomainError::Ownership {
                user_id,
                resource_id: new_story.product_id,
            });
        }
        if self
            .failing_creates
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(DomainError::Infrastructure("connection reset".into()));
        }

        let story = Story {
            id: Uuid::new_v4(),
            seller_id: Some(user_id),
            product_id: new_story.product_id,
            seller: SellerInfo {
                username: "me".to_owned(),
                avatar_url: None,
            },
            product: ProductSummary {
                name: "My product".to_owned(),
                image_url: None,
                price_cents: 0,
            },
            slides: vec![Slide {
                content: new_story.content.clone(),
                duration_secs: Some(new_story.duration_secs),
            }],
            caption: new_story.caption.clone(),
            created_at: self.created_at,
            expires_at: Story::expiry_for(self.created_at),
            views_count: 0,
            interactions_count: 0,
            is_viewed: true,
        };
        self.created.lock().unwrap().push(new_story);
        self.own.lock().unwrap().push(story.clone());
        Ok(story)
    }

    async fn mark_viewed(&self, story_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        self.viewed.lock().unwrap().push((story_id, user_id));
        Ok(())
    }

    async fn record_interaction(
        &self,
        story_id: Uuid,
        user_id: Uuid,
        interaction: Interaction,
    ) -> Result<(), DomainError> {
        self.interactions
            .lock()
            .unwrap()
            .push((story_id, user_id, interaction));
        Ok(())
    }

    async fn delete_story(&self, story_id: Uuid, user_id: Uuid) -> Result<(), DomainError> {
        let mut own = self.own.lock().unwrap();
        let Some(position) = own.iter().position(|s| s.id == story_id) else {
            if self.followed.lock().unwrap().iter().any(|s| s.id == story_id) {
                return Err(DomainError::Ownership {
                    user_id,
                    resource_id: story_id,
                });
            }
            return Err(DomainError::NotFound(story_id));
        };
        if user_id != self.owner_id {
            return Err(DomainError::Ownership {
                user_id,
                resource_id: story_id,
            });
        }
        own.remove(position);
        self.deleted.lock().unwrap().push(story_id);
        Ok(())
    }
}

/// A story repository that always returns an infrastructure error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingStoryRepository;

#[async_trait]
impl StoryRepository for FailingStoryRepository {
    async fn fetch_followed_stories(&self, _user_id: Uuid) -> Result<Vec<Story>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn fetch_own_stories(&self, _user_id: Uuid) -> Result<Vec<Story>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn create_story(
        &self,
        _user_id: Uuid,
        _new_story: NewStory,
    ) -> Result<Story, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn mark_viewed(&self, _story_id: Uuid, _user_id: Uuid) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn record_interaction(
        &self,
        _story_id: Uuid,
        _user_id: Uuid,
        _interaction: Interaction,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn delete_story(&self, _story_id: Uuid, _user_id: Uuid) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
