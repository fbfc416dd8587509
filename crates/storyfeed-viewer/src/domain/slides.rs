//! Slide rendering.
//!
//! Maps a slide plus the viewer's local choice to what the screen shows.
//! Poll and quiz results are only revealed once the viewer has picked an
//! option, and the local pick is counted immediately.

use serde::Serialize;
use storyfeed_core::story::{Slide, StoryContent};

/// One option of a poll or quiz as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    /// Option label.
    pub label: String,
    /// Share of all votes, `0..=100`. `None` until the viewer picked.
    pub percentage: Option<u8>,
    /// Whether this is the viewer's pick.
    pub selected: bool,
}

/// What a slide renders to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlideView {
    /// Full-bleed image.
    Image {
        /// Media URL.
        url: String,
    },
    /// Full-bleed video.
    Video {
        /// Media URL.
        url: String,
    },
    /// Styled text.
    Text {
        /// Text body.
        content: String,
        /// Background colour.
        background_color: String,
        /// Text colour.
        text_color: String,
        /// Font size in points.
        font_size: u16,
    },
    /// Poll question and options.
    Poll {
        /// Question.
        question: String,
        /// Options.
        options: Vec<OptionView>,
    },
    /// Quiz question and options.
    Quiz {
        /// Question.
        question: String,
        /// Options.
        options: Vec<OptionView>,
        /// `Some(correct)` once the viewer answered.
        answered_correctly: Option<bool>,
    },
}

/// Renders `slide` given the viewer's pick on it, if any.
#[must_use]
pub fn render_slide(slide: &Slide, selection: Option<usize>) -> SlideView {
    match &slide.content {
        StoryContent::Image { media_url } => SlideView::Image {
            url: media_url.clone(),
        },
        StoryContent::Video { media_url } => SlideView::Video {
            url: media_url.clone(),
        },
        StoryContent::Text {
            content,
            background_color,
            text_color,
            font_size,
        } => SlideView::Text {
            content: content.clone(),
            background_color: background_color.clone(),
            text_color: text_color.clone(),
            font_size: *font_size,
        },
        StoryContent::Poll { question, options } => SlideView::Poll {
            question: question.clone(),
            options: option_views(
                options.iter().map(|o| (o.label.as_str(), o.votes)),
                selection,
            ),
        },
        StoryContent::Quiz {
            question,
            options,
            answer_index,
        } => SlideView::Quiz {
            question: question.clone(),
            options: option_views(
                options.iter().map(|o| (o.label.as_str(), o.answers)),
                selection,
            ),
            answered_correctly: selection.map(|picked| picked == *answer_index),
        },
    }
}

/// Number of selectable options on `slide`, or `None` for non-interactive
/// content.
#[must_use]
pub fn option_count(slide: &Slide) -> Option<usize> {
    match &slide.content {
        StoryContent::Poll { options, .. } => Some(options.len()),
        StoryContent::Quiz { options, .. } => Some(options.len()),
        StoryContent::Image { .. } | StoryContent::Video { .. } | StoryContent::Text { .. } => {
            None
        }
    }
}

fn option_views<'a>(
    counts: impl Iterator<Item = (&'a str, u64)> + Clone,
    selection: Option<usize>,
) -> Vec<OptionView> {
    let with_pick = |index: usize, count: u64| {
        if selection == Some(index) {
            count + 1
        } else {
            count
        }
    };
    let total: u64 = counts
        .clone()
        .enumerate()
        .map(|(index, (_, count))| with_pick(index, count))
        .sum();
    counts
        .enumerate()
        .map(|(index, (label, count))| OptionView {
            label: label.to_owned(),
            percentage: selection.map(|_| percentage_of(with_pick(index, count), total)),
            selected: selection == Some(index),
        })
        .collect()
}

fn percentage_of(part: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (u128::from(part) * 100 + u128::from(total) / 2) / u128::from(total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}
