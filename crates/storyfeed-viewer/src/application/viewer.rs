//! Full-screen story viewer.
//!
//! Plays a list of stories one after another. Only the current story has a
//! running timer; every transition cancels the previous timer before the
//! next one starts, and each timer carries the generation it was started
//! in so a tick that races a transition is ignored. Engagement calls are
//! fire-and-forget and never block or interrupt playback.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use storyfeed_core::clock::Clock;
use storyfeed_core::error::DomainError;
use storyfeed_core::platform::{SharePayload, ShareSheet};
use storyfeed_core::repository::StoryRepository;
use storyfeed_core::scheduler::Scheduler;
use storyfeed_core::story::{Interaction, Story, StoryContent};
use storyfeed_core::time_window;
use tokio::sync::watch;
use uuid::Uuid;

use super::engagement::dispatch;
use super::timer::{PlaybackTimer, Tick};
use crate::config::ViewerConfig;
use crate::domain::playback::{PlaybackState, StoryTimeline, progress};
use crate::domain::slides::{SlideView, option_count, render_slide};

/// Called after the backend accepted a view.
pub type ViewedObserver = Arc<dyn Fn(Uuid) + Send + Sync>;

/// Collaborators of a viewer.
#[derive(Clone)]
pub struct ViewerContext {
    /// The signed-in viewer.
    pub user_id: Uuid,
    /// Where views and interactions are recorded.
    pub repo: Arc<dyn StoryRepository>,
    /// Time source for progress.
    pub clock: Arc<dyn Clock>,
    /// Timer source for ticks.
    pub scheduler: Arc<dyn Scheduler>,
    /// Native share and clipboard.
    pub share_sheet: Arc<dyn ShareSheet>,
    /// Playback tunables.
    pub config: ViewerConfig,
    /// Notified once per confirmed view.
    pub on_viewed: Option<ViewedObserver>,
}

/// What the viewer shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerSnapshot {
    /// `false` once closed.
    pub open: bool,
    /// Position in the playlist.
    pub current_story_index: usize,
    /// Playlist length.
    pub story_count: usize,
    /// Slide playing within the current story.
    pub current_slide_index: usize,
    /// Progress of the current story, `0..=100`.
    pub progress: f64,
    /// Timer state.
    pub state: PlaybackState,
    /// The current story.
    pub story: Option<Story>,
    /// The current slide, rendered.
    pub slide: Option<SlideView>,
    /// Remaining-time label of the current story.
    pub expires_label: Option<String>,
    /// Whether the viewer liked the current story.
    pub liked: bool,
}

/// Result of sharing the current story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// The native share sheet took the payload.
    Shared,
    /// Sharing was unavailable; the deep link was copied instead.
    LinkCopied {
        /// The copied link.
        url: String,
    },
    /// Neither sharing nor copying worked.
    Failed,
}

struct ViewerState {
    stories: Vec<Story>,
    index: usize,
    open: bool,
    playback: PlaybackState,
    timeline: StoryTimeline,
    elapsed: std::time::Duration,
    generation: u64,
    timer: Option<PlaybackTimer>,
    liked: HashSet<Uuid>,
    picks: HashMap<(Uuid, usize), usize>,
}

impl ViewerState {
    fn current(&self) -> Option<&Story> {
        self.stories.get(self.index).filter(|_| self.open)
    }

    fn slide_index(&self) -> usize {
        self.timeline.slide_at(self.elapsed)
    }
}

struct Shared {
    ctx: ViewerContext,
    state: Mutex<ViewerState>,
    updates: watch::Sender<ViewerSnapshot>,
}

/// A running viewer. Dropping it stops playback.
pub struct StoryViewer {
    shared: Arc<Shared>,
}

struct Pick {
    story_id: Uuid,
    chosen: usize,
    is_new: bool,
    answer_index: Option<usize>,
}

impl StoryViewer {
    /// Opens the viewer on the first story at or after `start_index` that
    /// has not expired and starts playing.
    ///
    /// An empty playlist, or one whose remaining stories have all expired,
    /// yields a viewer that is already closed. An out-of-range `start_index`
    /// starts at the last story.
    #[must_use]
    pub fn open(ctx: ViewerContext, stories: Vec<Story>, start_index: usize) -> Self {
        let open = !stories.is_empty();
        let index = start_index.min(stories.len().saturating_sub(1));
        let state = ViewerState {
            stories,
            index,
            open,
            playback: PlaybackState::Playing,
            timeline: StoryTimeline::default(),
            elapsed: std::time::Duration::ZERO,
            generation: 0,
            timer: None,
            liked: HashSet::new(),
            picks: HashMap::new(),
        };
        let (updates, _) = watch::channel(snapshot_of(&state, &ctx));
        let shared = Arc::new(Shared {
            ctx,
            state: Mutex::new(state),
            updates,
        });
        {
            let mut state = shared.lock();
            if state.open {
                tracing::debug!(stories = state.stories.len(), index, "story viewer opened");
                shared.enter(&mut state);
                shared.publish(&state);
            }
        }
        Self { shared }
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewerSnapshot> {
        self.shared.updates.subscribe()
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ViewerSnapshot {
        self.shared.updates.borrow().clone()
    }

    /// Returns `true` until closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.shared.lock().open
    }

    /// Freezes progress and stops the timer.
    pub fn pause(&self) {
        let mut state = self.shared.lock();
        if !state.open || state.playback == PlaybackState::Paused {
            return;
        }
        if let Some(timer) = state.timer.take() {
            state.elapsed = timer
                .elapsed_at(self.shared.ctx.clock.now())
                .min(state.timeline.total());
        }
        state.playback = PlaybackState::Paused;
        state.generation += 1;
        self.shared.publish(&state);
    }

    /// Continues from the frozen progress.
    pub fn resume(&self) {
        let mut state = self.shared.lock();
        if !state.open || state.playback == PlaybackState::Playing {
            return;
        }
        state.playback = PlaybackState::Playing;
        self.shared.start_timer(&mut state);
        self.shared.publish(&state);
    }

    /// Pauses when playing, resumes when paused.
    pub fn toggle_pause(&self) {
        let paused = self.shared.lock().playback == PlaybackState::Paused;
        if paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Skips to the next story, closing after the last.
    pub fn next(&self) {
        let mut state = self.shared.lock();
        if state.open {
            self.shared.advance(&mut state);
        }
    }

    /// Goes back to the closest earlier story that has not expired. Does
    /// nothing when there is none.
    pub fn prev(&self) {
        let mut state = self.shared.lock();
        if !state.open {
            return;
        }
        let now = self.shared.ctx.clock.now();
        let earlier = state
            .stories
            .get(..state.index)
            .unwrap_or_default()
            .iter()
            .rposition(|s| time_window::is_valid(s, now));
        let Some(index) = earlier else {
            return;
        };
        state.index = index;
        self.shared.enter(&mut state);
        self.shared.publish(&state);
    }

    /// Closes the viewer and stops its timer.
    pub fn close(&self) {
        self.shared.close(&mut self.shared.lock());
    }

    /// A click outside the story card closes the viewer.
    pub fn handle_outside_click(&self) {
        self.close();
    }

    /// Toggles the like on the current story and returns the new state.
    /// Only a transition to liked is recorded. The local state is never
    /// rolled back if recording fails.
    pub fn like(&self) -> bool {
        let (story_id, liked) = {
            let mut state = self.shared.lock();
            let Some(story_id) = state.current().map(|s| s.id) else {
                return false;
            };
            let liked = if state.liked.remove(&story_id) {
                false
            } else {
                state.liked.insert(story_id);
                true
            };
            self.shared.publish(&state);
            (story_id, liked)
        };
        if liked {
            self.shared.record(story_id, Interaction::Like);
        }
        liked
    }

    /// Shares the current story's product link, falling back to copying the
    /// link when native sharing is unavailable or fails.
    pub fn share(&self) -> ShareOutcome {
        let Some(story) = self.shared.lock().current().cloned() else {
            return ShareOutcome::Failed;
        };
        let ctx = &self.shared.ctx;
        let url = ctx.config.product_link(story.product_id);
        let payload = SharePayload {
            title: story.product.name.clone(),
            text: story.caption.clone().unwrap_or_else(|| {
                format!("{} from @{}", story.product.name, story.seller.username)
            }),
            url: url.clone(),
        };
        let outcome = match ctx.share_sheet.share(&payload) {
            Ok(()) => ShareOutcome::Shared,
            Err(error) => {
                tracing::debug!(%error, "native share failed, copying link");
                match ctx.share_sheet.copy_to_clipboard(&url) {
                    Ok(()) => ShareOutcome::LinkCopied { url },
                    Err(error) => {
                        tracing::warn!(%error, story_id = %story.id, "story link could not be shared");
                        ShareOutcome::Failed
                    }
                }
            }
        };
        if outcome != ShareOutcome::Failed {
            self.shared.record(story.id, Interaction::Share);
        }
        outcome
    }

    /// Records a product click and closes the viewer. Returns the product
    /// to navigate to.
    pub fn product_click(&self) -> Option<Uuid> {
        let (story_id, product_id) = {
            let mut state = self.shared.lock();
            let current = state.current().map(|s| (s.id, s.product_id))?;
            self.shared.close(&mut state);
            current
        };
        self.shared.record(story_id, Interaction::ProductClick);
        Some(product_id)
    }

    /// Votes in the poll on the current slide. A second vote on the same
    /// poll is ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the viewer is closed, the
    /// current slide is not a poll, or the option does not exist.
    pub fn vote_poll(&self, option_index: usize) -> Result<(), DomainError> {
        let pick = self.pick("poll", option_index)?;
        if pick.is_new {
            self.shared
                .record(pick.story_id, Interaction::PollVote { option_index });
        }
        Ok(())
    }

    /// Answers the quiz on the current slide and returns whether the
    /// recorded answer is correct. Only the first answer counts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the viewer is closed, the
    /// current slide is not a quiz, or the option does not exist.
    pub fn answer_quiz(&self, option_index: usize) -> Result<bool, DomainError> {
        let pick = self.pick("quiz", option_index)?;
        if pick.is_new {
            self.shared
                .record(pick.story_id, Interaction::QuizAnswer { option_index });
        }
        Ok(pick.answer_index == Some(pick.chosen))
    }

    fn pick(&self, kind: &'static str, option_index: usize) -> Result<Pick, DomainError> {
        let mut state = self.shared.lock();
        let slide_index = state.slide_index();
        let (story_id, options, answer_index) = {
            let story = state
                .current()
                .ok_or_else(|| DomainError::Validation("story viewer is closed".to_owned()))?;
            let slide = story
                .slides
                .get(slide_index)
                .filter(|slide| slide.content.type_name() == kind)
                .ok_or_else(|| DomainError::Validation(format!("current slide is not a {kind}")))?;
            let answer_index = match &slide.content {
                StoryContent::Quiz { answer_index, .. } => Some(*answer_index),
                _ => None,
            };
            (story.id, option_count(slide).unwrap_or(0), answer_index)
        };
        if option_index >= options {
            return Err(DomainError::Validation(format!(
                "{kind} has no option {option_index}"
            )));
        }
        let key = (story_id, slide_index);
        let (chosen, is_new) = match state.picks.get(&key) {
            Some(previous) => (*previous, false),
            None => {
                state.picks.insert(key, option_index);
                (option_index, true)
            }
        };
        if is_new {
            self.shared.publish(&state);
        }
        Ok(Pick {
            story_id,
            chosen,
            is_new,
            answer_index,
        })
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ViewerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ViewerState) {
        self.updates.send_replace(snapshot_of(state, &self.ctx));
    }

    /// Makes the first valid story at or after `state.index` current:
    /// resets progress, marks the story viewed and, while playing, starts a
    /// fresh timer. Closes when every remaining story has expired.
    fn enter(self: &Arc<Self>, state: &mut ViewerState) {
        state.timer = None;
        state.generation += 1;
        state.elapsed = std::time::Duration::ZERO;
        let now = self.ctx.clock.now();
        let skipped = state
            .stories
            .get(state.index..)
            .and_then(|rest| rest.iter().position(|s| time_window::is_valid(s, now)));
        let Some(skipped) = skipped else {
            tracing::debug!(index = state.index, "no valid story left to play");
            self.close(state);
            return;
        };
        if skipped > 0 {
            tracing::debug!(skipped, "skipped expired stories");
            state.index += skipped;
        }
        let Some(story) = state.stories.get(state.index) else {
            return;
        };
        state.timeline =
            StoryTimeline::for_story(story, now, self.ctx.config.default_slide_duration());
        let story_id = story.id;
        if !story.is_viewed {
            self.mark_viewed(story_id);
        }
        tracing::debug!(%story_id, index = state.index, "story entered");
        if state.playback == PlaybackState::Playing {
            self.start_timer(state);
        }
    }

    fn start_timer(self: &Arc<Self>, state: &mut ViewerState) {
        state.timer = None;
        let generation = state.generation;
        let ticking = Arc::downgrade(self);
        let completing = Arc::downgrade(self);
        state.timer = Some(PlaybackTimer::start(
            self.ctx.scheduler.as_ref(),
            Arc::clone(&self.ctx.clock),
            self.ctx.config.tick_interval(),
            state.timeline.total(),
            state.elapsed,
            move |tick| {
                if let Some(shared) = ticking.upgrade() {
                    shared.on_tick(generation, tick);
                }
            },
            move || {
                if let Some(shared) = completing.upgrade() {
                    shared.on_complete(generation);
                }
            },
        ));
    }

    fn on_tick(&self, generation: u64, tick: Tick) {
        let mut state = self.lock();
        if state.generation != generation
            || !state.open
            || state.playback != PlaybackState::Playing
        {
            return;
        }
        state.elapsed = tick.elapsed.min(state.timeline.total());
        self.publish(&state);
    }

    fn on_complete(self: &Arc<Self>, generation: u64) {
        let mut state = self.lock();
        if state.generation == generation && state.open {
            self.advance(&mut state);
        }
    }

    fn advance(self: &Arc<Self>, state: &mut ViewerState) {
        if state.index + 1 < state.stories.len() {
            state.index += 1;
            self.enter(state);
            self.publish(state);
        } else {
            self.close(state);
        }
    }

    fn close(&self, state: &mut ViewerState) {
        if !state.open {
            return;
        }
        state.open = false;
        state.timer = None;
        state.generation += 1;
        tracing::debug!(index = state.index, "story viewer closed");
        self.publish(state);
    }

    fn mark_viewed(self: &Arc<Self>, story_id: Uuid) {
        let repo = Arc::clone(&self.ctx.repo);
        let user_id = self.ctx.user_id;
        let shared = Arc::downgrade(self);
        dispatch("mark_viewed", story_id, async move {
            repo.mark_viewed(story_id, user_id).await?;
            if let Some(shared) = shared.upgrade() {
                shared.view_confirmed(story_id);
            }
            Ok(())
        });
    }

    fn view_confirmed(&self, story_id: Uuid) {
        {
            let mut state = self.lock();
            for story in state.stories.iter_mut().filter(|s| s.id == story_id) {
                story.is_viewed = true;
            }
            self.publish(&state);
        }
        if let Some(observer) = &self.ctx.on_viewed {
            observer(story_id);
        }
    }

    fn record(&self, story_id: Uuid, interaction: Interaction) {
        let repo = Arc::clone(&self.ctx.repo);
        let user_id = self.ctx.user_id;
        dispatch(interaction.kind(), story_id, async move {
            repo.record_interaction(story_id, user_id, interaction)
                .await
        });
    }
}

fn snapshot_of(state: &ViewerState, ctx: &ViewerContext) -> ViewerSnapshot {
    let slide_index = state.slide_index();
    let story = state.current();
    ViewerSnapshot {
        open: state.open,
        current_story_index: state.index,
        story_count: state.stories.len(),
        current_slide_index: slide_index,
        progress: progress(state.elapsed, state.timeline.total()),
        state: state.playback,
        slide: story.and_then(|s| {
            s.slides
                .get(slide_index)
                .map(|slide| render_slide(slide, state.picks.get(&(s.id, slide_index)).copied()))
        }),
        expires_label: story.map(|s| time_window::label(s, ctx.clock.now())),
        liked: story.is_some_and(|s| state.liked.contains(&s.id)),
        story: story.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Duration as ChronoDuration;
    use storyfeed_core::story::{PollOption, QuizOption, Slide};
    use storyfeed_test_support::{
        FailingStoryRepository, ManualClock, ManualScheduler, RecordingShareSheet,
        RecordingStoryRepository, StoryFixture, fixed_now, settle,
    };

    use super::*;

    struct Harness {
        user_id: Uuid,
        clock: Arc<ManualClock>,
        scheduler: Arc<ManualScheduler>,
        repo: Arc<RecordingStoryRepository>,
        share_sheet: Arc<RecordingShareSheet>,
        viewed: Arc<Mutex<Vec<Uuid>>>,
    }

    impl Harness {
        fn new(share_available: bool) -> Self {
            let user_id = Uuid::new_v4();
            Self {
                user_id,
                clock: Arc::new(ManualClock::new(fixed_now())),
                scheduler: Arc::new(ManualScheduler::new()),
                repo: Arc::new(RecordingStoryRepository::new(user_id)),
                share_sheet: Arc::new(RecordingShareSheet::new(share_available)),
                viewed: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn context(&self, repo: Arc<dyn StoryRepository>) -> ViewerContext {
            let viewed = Arc::clone(&self.viewed);
            ViewerContext {
                user_id: self.user_id,
                repo,
                clock: Arc::clone(&self.clock) as Arc<dyn Clock>,
                scheduler: Arc::clone(&self.scheduler) as Arc<dyn Scheduler>,
                share_sheet: Arc::clone(&self.share_sheet) as Arc<dyn ShareSheet>,
                config: ViewerConfig::default(),
                on_viewed: Some(Arc::new(move |id| viewed.lock().unwrap().push(id))),
            }
        }

        fn open(&self, stories: Vec<Story>, start_index: usize) -> StoryViewer {
            let repo = Arc::clone(&self.repo) as Arc<dyn StoryRepository>;
            StoryViewer::open(self.context(repo), stories, start_index)
        }

        fn advance_ms(&self, millis: u64) {
            self.scheduler
                .advance(&self.clock, Duration::from_millis(millis));
        }
    }

    fn stories(count: usize) -> Vec<Story> {
        (0..count)
            .map(|_| StoryFixture::aged(ChronoDuration::hours(1)).build())
            .collect()
    }

    fn poll_story() -> Story {
        StoryFixture::aged(ChronoDuration::hours(1))
            .single_slide(
                StoryContent::Poll {
                    question: "Which finish?".to_owned(),
                    options: vec![
                        PollOption {
                            label: "Matte".to_owned(),
                            votes: 1,
                        },
                        PollOption {
                            label: "Gloss".to_owned(),
                            votes: 0,
                        },
                    ],
                },
                None,
            )
            .build()
    }

    #[tokio::test]
    async fn test_progress_reaches_half_then_advances_at_duration() {
        // Arrange
        let harness = Harness::new(true);
        let viewer = harness.open(stories(2), 0);

        // Act
        harness.advance_ms(2_500);
        let halfway = viewer.snapshot();
        harness.advance_ms(2_400);
        let just_before = viewer.snapshot();
        harness.advance_ms(100);
        let after = viewer.snapshot();

        // Assert
        assert!((halfway.progress - 50.0).abs() < 2.0);
        assert_eq!(halfway.current_story_index, 0);
        assert_eq!(just_before.current_story_index, 0);
        assert_eq!(after.current_story_index, 1);
        assert!(after.progress.abs() < f64::EPSILON);
        assert_eq!(harness.scheduler.active_timers(), 1);
    }

    #[tokio::test]
    async fn test_pause_at_forty_percent_resumes_remaining_sixty() {
        // Arrange
        let harness = Harness::new(true);
        let viewer = harness.open(stories(2), 0);
        harness.advance_ms(2_000);

        // Act
        viewer.pause();
        harness.advance_ms(10_000);
        let paused = viewer.snapshot();
        viewer.resume();
        harness.advance_ms(2_900);
        let almost = viewer.snapshot();
        harness.advance_ms(100);

        // Assert
        assert_eq!(paused.state, PlaybackState::Paused);
        assert!((paused.progress - 40.0).abs() < 1e-6);
        assert_eq!(paused.current_story_index, 0);
        assert_eq!(almost.current_story_index, 0);
        assert_eq!(viewer.snapshot().current_story_index, 1);
    }

    #[tokio::test]
    async fn test_paused_viewer_has_no_timer() {
        let harness = Harness::new(true);
        let viewer = harness.open(stories(1), 0);

        viewer.toggle_pause();
        let paused_timers = harness.scheduler.active_timers();
        viewer.toggle_pause();

        assert_eq!(paused_timers, 0);
        assert_eq!(harness.scheduler.active_timers(), 1);
        assert_eq!(viewer.snapshot().state, PlaybackState::Playing);
    }

    #[tokio::test]
    async fn test_finishing_last_story_closes_and_clears_timers() {
        let harness = Harness::new(true);
        let viewer = harness.open(stories(1), 0);

        harness.advance_ms(5_000);

        assert!(!viewer.is_open());
        assert!(viewer.snapshot().story.is_none());
        assert_eq!(harness.scheduler.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_next_and_prev_navigate_and_restart_progress() {
        // Arrange
        let harness = Harness::new(true);
        let viewer = harness.open(stories(3), 1);
        harness.advance_ms(4_000);

        // Act
        viewer.prev();
        let first = viewer.snapshot();
        viewer.prev();
        let still_first = viewer.snapshot();
        viewer.next();
        harness.advance_ms(1_000);
        let second = viewer.snapshot();

        // Assert
        assert_eq!(first.current_story_index, 0);
        assert!(first.progress.abs() < f64::EPSILON);
        assert_eq!(still_first.current_story_index, 0);
        assert_eq!(second.current_story_index, 1);
        assert!((second.progress - 20.0).abs() < 1e-6);
        assert_eq!(harness.scheduler.active_timers(), 1);
    }

    #[tokio::test]
    async fn test_next_past_last_story_closes() {
        let harness = Harness::new(true);
        let viewer = harness.open(stories(2), 1);

        viewer.next();

        assert!(!viewer.is_open());
        assert_eq!(harness.scheduler.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_outside_click_closes_and_stops_ticks() {
        let harness = Harness::new(true);
        let viewer = harness.open(stories(2), 0);
        let mut updates = viewer.subscribe();
        updates.borrow_and_update();

        viewer.handle_outside_click();
        harness.advance_ms(10_000);

        assert!(!viewer.is_open());
        assert!(!updates.borrow_and_update().open);
        assert_eq!(viewer.snapshot().current_story_index, 0);
        assert_eq!(harness.scheduler.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_empty_playlist_opens_closed() {
        let harness = Harness::new(true);

        let viewer = harness.open(Vec::new(), 3);

        assert!(!viewer.is_open());
        assert_eq!(harness.scheduler.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_entering_unviewed_story_marks_it_viewed() {
        // Arrange
        let harness = Harness::new(true);
        let unviewed = StoryFixture::aged(ChronoDuration::hours(1)).build();
        let seen = StoryFixture::aged(ChronoDuration::hours(1))
            .viewed(true)
            .build();
        let viewer = harness.open(vec![unviewed.clone(), seen], 0);

        // Act
        settle().await;
        viewer.next();
        settle().await;

        // Assert
        assert_eq!(harness.repo.viewed(), vec![(unviewed.id, harness.user_id)]);
        assert_eq!(*harness.viewed.lock().unwrap(), vec![unviewed.id]);
        viewer.prev();
        assert!(viewer.snapshot().story.unwrap().is_viewed);
    }

    #[tokio::test]
    async fn test_engagement_failure_keeps_local_state() {
        // Arrange
        let harness = Harness::new(true);
        let viewer = StoryViewer::open(
            harness.context(Arc::new(FailingStoryRepository)),
            stories(1),
            0,
        );

        // Act
        let liked = viewer.like();
        settle().await;

        // Assert
        assert!(liked);
        let snapshot = viewer.snapshot();
        assert!(snapshot.liked);
        assert!(snapshot.open);
        assert!(harness.viewed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_like_toggles_and_records_only_likes() {
        let harness = Harness::new(true);
        let viewer = harness.open(stories(1), 0);

        assert!(viewer.like());
        assert!(!viewer.like());
        settle().await;

        let likes: Vec<_> = harness
            .repo
            .interactions()
            .into_iter()
            .filter(|(_, _, i)| *i == Interaction::Like)
            .collect();
        assert_eq!(likes.len(), 1);
    }

    #[tokio::test]
    async fn test_share_falls_back_to_copying_deep_link() {
        // Arrange
        let harness = Harness::new(false);
        let story = StoryFixture::aged(ChronoDuration::hours(1)).build();
        let viewer = harness.open(vec![story.clone()], 0);

        // Act
        let outcome = viewer.share();
        settle().await;

        // Assert
        let url = format!("https://shop.example/products/{}", story.product_id);
        assert_eq!(outcome, ShareOutcome::LinkCopied { url: url.clone() });
        assert_eq!(harness.share_sheet.copied(), vec![url]);
        assert!(
            harness
                .repo
                .interactions()
                .contains(&(story.id, harness.user_id, Interaction::Share))
        );
    }

    #[tokio::test]
    async fn test_native_share_uses_caption() {
        let harness = Harness::new(true);
        let story = StoryFixture::aged(ChronoDuration::hours(1))
            .caption("New stock")
            .build();
        let viewer = harness.open(vec![story], 0);

        assert_eq!(viewer.share(), ShareOutcome::Shared);

        let shared = harness.share_sheet.shared();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].text, "New stock");
        assert!(harness.share_sheet.copied().is_empty());
    }

    #[tokio::test]
    async fn test_product_click_closes_and_returns_product() {
        let harness = Harness::new(true);
        let story = StoryFixture::aged(ChronoDuration::hours(1)).build();
        let viewer = harness.open(vec![story.clone()], 0);

        let product = viewer.product_click();
        settle().await;

        assert_eq!(product, Some(story.product_id));
        assert!(!viewer.is_open());
        assert!(
            harness
                .repo
                .interactions()
                .contains(&(story.id, harness.user_id, Interaction::ProductClick))
        );
    }

    #[tokio::test]
    async fn test_poll_vote_counts_once() {
        // Arrange
        let harness = Harness::new(true);
        let viewer = harness.open(vec![poll_story()], 0);

        // Act
        viewer.vote_poll(1).unwrap();
        viewer.vote_poll(0).unwrap();
        settle().await;

        // Assert
        match viewer.snapshot().slide {
            Some(SlideView::Poll { options, .. }) => {
                assert!(options[1].selected);
                assert!(!options[0].selected);
                assert_eq!(options[1].percentage, Some(50));
            }
            other => panic!("expected poll, got {other:?}"),
        }
        let votes = harness
            .repo
            .interactions()
            .into_iter()
            .filter(|(_, _, i)| matches!(i, Interaction::PollVote { .. }))
            .count();
        assert_eq!(votes, 1);
    }

    #[tokio::test]
    async fn test_vote_rejects_wrong_slide_and_unknown_option() {
        let harness = Harness::new(true);
        let viewer = harness.open(vec![poll_story()], 0);

        assert!(matches!(
            viewer.vote_poll(5),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            viewer.answer_quiz(0),
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_quiz_answer_reports_first_answer() {
        let harness = Harness::new(true);
        let story = StoryFixture::aged(ChronoDuration::hours(1))
            .slides(vec![Slide::new(StoryContent::Quiz {
                question: "Handmade?".to_owned(),
                options: vec![
                    QuizOption {
                        label: "Yes".to_owned(),
                        answers: 0,
                    },
                    QuizOption {
                        label: "No".to_owned(),
                        answers: 0,
                    },
                ],
                answer_index: 0,
            })])
            .build();
        let viewer = harness.open(vec![story], 0);

        assert!(!viewer.answer_quiz(1).unwrap());
        assert!(!viewer.answer_quiz(0).unwrap());
    }

    fn expiring_in(seconds: i64) -> Story {
        StoryFixture::aged(ChronoDuration::hours(24) - ChronoDuration::seconds(seconds)).build()
    }

    #[tokio::test]
    async fn test_auto_advance_skips_story_that_expired_during_playback() {
        // Arrange
        let harness = Harness::new(true);
        let expiring = expiring_in(3);
        let expiring_id = expiring.id;
        let mut playlist = stories(1);
        playlist.push(expiring);
        playlist.extend(stories(1));
        let last_id = playlist[2].id;
        let viewer = harness.open(playlist, 0);

        // Act
        harness.advance_ms(5_000);
        settle().await;

        // Assert
        let snapshot = viewer.snapshot();
        assert!(snapshot.open);
        assert_eq!(snapshot.current_story_index, 2);
        assert_eq!(snapshot.story.unwrap().id, last_id);
        assert_ne!(snapshot.expires_label.as_deref(), Some("Expired"));
        assert!(harness.repo.viewed().iter().all(|(id, _)| *id != expiring_id));
    }

    #[tokio::test]
    async fn test_advancing_onto_only_expired_stories_closes() {
        let harness = Harness::new(true);
        let mut playlist = stories(1);
        playlist.push(expiring_in(3));
        let viewer = harness.open(playlist, 0);

        harness.advance_ms(5_000);

        let snapshot = viewer.snapshot();
        assert!(!snapshot.open);
        assert!(snapshot.story.is_none());
        assert!(snapshot.slide.is_none());
        assert_eq!(harness.scheduler.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_open_starts_at_first_valid_story_after_start_index() {
        // Arrange
        let harness = Harness::new(true);
        let expired = StoryFixture::aged(ChronoDuration::hours(25)).build();
        let expired_id = expired.id;
        let mut playlist = vec![expired];
        playlist.extend(stories(1));
        let valid_id = playlist[1].id;

        // Act
        let viewer = harness.open(playlist, 0);
        settle().await;

        // Assert
        let snapshot = viewer.snapshot();
        assert_eq!(snapshot.current_story_index, 1);
        assert_eq!(snapshot.story.unwrap().id, valid_id);
        assert!(harness.repo.viewed().iter().all(|(id, _)| *id != expired_id));
    }

    #[tokio::test]
    async fn test_open_on_expired_last_story_is_closed() {
        let harness = Harness::new(true);
        let expired = StoryFixture::aged(ChronoDuration::hours(25)).build();

        let viewer = harness.open(vec![expired], 0);
        settle().await;

        assert!(!viewer.is_open());
        assert!(viewer.snapshot().expires_label.is_none());
        assert!(harness.repo.viewed().is_empty());
    }

    #[tokio::test]
    async fn test_prev_skips_story_that_expired_meanwhile() {
        // Arrange
        let harness = Harness::new(true);
        let mut playlist = stories(1);
        playlist.push(expiring_in(3));
        playlist.extend(stories(1));
        let first_id = playlist[0].id;
        let viewer = harness.open(playlist, 1);
        viewer.next();
        harness.advance_ms(3_000);

        // Act
        viewer.prev();

        // Assert
        let snapshot = viewer.snapshot();
        assert_eq!(snapshot.current_story_index, 0);
        assert_eq!(snapshot.story.unwrap().id, first_id);
    }
}
